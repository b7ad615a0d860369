//! Discovery of reader-tag declarations from filesystem and manifest sources.
//!
//! Each discovery unit (one declaration file, or one manifest entry) yields
//! one [`DeclarationMap`]. Maps are kept separate, in discovery order, so the
//! merge step can name both sides of a conflict; nothing is merged eagerly.

pub mod files;
pub mod manifest;

use std::fmt;
use std::path::PathBuf;

use crate::handler::HandlerRef;
use crate::tag::Tag;

/// Identity of one discovery unit, carried into every load-time error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceId {
    /// The built-in default readers seeded before any scan runs.
    Defaults,
    /// A declaration file on disk.
    File(PathBuf),
    /// An installed-package manifest entry, keyed by its display name.
    Manifest(String),
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceId::Defaults => f.write_str("built-in defaults"),
            SourceId::File(path) => write!(f, "{}", path.display()),
            SourceId::Manifest(name) => write!(f, "manifest entry {name}"),
        }
    }
}

/// The validated tag→handler declarations of one discovery unit.
#[derive(Debug, Clone)]
pub struct DeclarationMap {
    pub origin: SourceId,
    pub readers: Vec<(Tag, HandlerRef)>,
}

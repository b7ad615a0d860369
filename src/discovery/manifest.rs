//! Manifest scanner for reader tags declared by installed packages.
//!
//! Packages advertise reader tags through the host's package-manifest system
//! under the fixed group [`MANIFEST_GROUP`]; entries under any other group are
//! ignored. The whole scan is gated by the config toggle: when disabled, the
//! manifest lookup is not invoked at all, which tests observe with a spy.

use crate::config::ReaderConfig;
use crate::discovery::{DeclarationMap, SourceId};
use crate::errors::ExtensionError;
use crate::form::Symbol;
use crate::handler::HandlerRef;
use crate::tag::Tag;

/// The manifest group this scanner queries. Nothing else is consulted.
pub const MANIFEST_GROUP: &str = "sable.tag-readers";

/// One installed-package manifest entry: a display name (the tag spelling)
/// and the binding it resolves to.
#[derive(Debug, Clone)]
pub struct ManifestEntry {
    pub name: String,
    pub target: Symbol,
}

/// Capability supplied by the package-manifest resolution system.
pub trait ManifestIndex: Send + Sync {
    fn entries_for_group(&self, group: &str) -> Vec<ManifestEntry>;
}

/// A [`ManifestIndex`] with no entries, for standalone embedders.
pub struct EmptyManifest;

impl ManifestIndex for EmptyManifest {
    fn entries_for_group(&self, _group: &str) -> Vec<ManifestEntry> {
        Vec::new()
    }
}

/// Scan manifest entries into declaration maps, one entry per map.
///
/// Each entry's tag is derived from the entry's own name; its handler is a
/// late-binding reference to the entry's target.
#[tracing::instrument(skip_all, fields(enabled = config.use_manifest_readers))]
pub fn scan(
    config: &ReaderConfig,
    index: &dyn ManifestIndex,
) -> Result<Vec<DeclarationMap>, ExtensionError> {
    if !config.use_manifest_readers {
        return Ok(Vec::new());
    }

    let mut declarations = Vec::new();
    for entry in index.entries_for_group(MANIFEST_GROUP) {
        let origin = SourceId::Manifest(entry.name.clone());
        let Some(tag) = Tag::parse(&entry.name) else {
            return Err(ExtensionError::InvalidTag {
                text: entry.name,
                origin,
            });
        };
        tracing::debug!(%tag, target = %entry.target, "manifest reader entry");
        declarations.push(DeclarationMap {
            origin,
            readers: vec![(tag, HandlerRef::indirect(entry.target))],
        });
    }

    Ok(declarations)
}

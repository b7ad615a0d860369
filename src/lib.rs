#![forbid(unsafe_code)]
//! Tagged-literal reader extensions for the Sable reader.
//!
//! When the reader encounters `#tag form`, it parses `form` unevaluated and
//! asks this crate which handler the tag names; the handler's return value is
//! spliced back into the token stream in place of the literal. Handlers are
//! assembled at process start from three sources, in order: the built-in
//! defaults, `data_readers` declaration files found under the source roots,
//! and installed-package manifest entries (when enabled). The merged mapping
//! is validated, checked for cross-source conflicts, and cached for the
//! process lifetime; tests can force re-discovery with
//! [`TagReaders::reset_cache`].
//!
//! This crate is deliberately syntax-agnostic: tokenizing, literal syntax,
//! and the act of parsing the form after a tag belong to the surrounding
//! reader, which supplies the [`form::ReadForm`] capability. Source-root
//! enumeration and package-manifest lookup are likewise injected
//! ([`discovery::files::SourcePaths`], [`discovery::manifest::ManifestIndex`]).
//!
//! ## Examples
//! ```rust
//! use std::sync::Arc;
//! use sable_reader::config::ReaderConfig;
//! use sable_reader::discovery::files::FsSourcePaths;
//! use sable_reader::discovery::manifest::EmptyManifest;
//! use sable_reader::form::{Form, FormReadError, ReadForm};
//! use sable_reader::handler::{HandlerRef, NoBindings};
//! use sable_reader::registry::TagReaders;
//! use sable_reader::tag::Tag;
//!
//! // A host with no declaration sources; the real reader injects its own
//! // parser here.
//! struct HostParser;
//! impl ReadForm for HostParser {
//!     fn read_first(&self, _text: &str) -> Result<Form, FormReadError> {
//!         Err(FormReadError::new("not used in this example"))
//!     }
//! }
//!
//! let readers = TagReaders::new(
//!     ReaderConfig::from_env(),
//!     Arc::new(FsSourcePaths::new(vec![])),
//!     Arc::new(EmptyManifest),
//!     Arc::new(HostParser),
//!     Arc::new(NoBindings),
//! );
//!
//! let tag = Tag::parse("demo/point").unwrap();
//! readers.register(tag.clone(), HandlerRef::direct(|form| Ok(Form::Vector(vec![form]))))?;
//! let expanded = readers.dispatch(&tag, Form::Int(3))?;
//! assert_eq!(expanded, Form::Vector(vec![Form::Int(3)]));
//! # Ok::<(), sable_reader::errors::ExtensionError>(())
//! ```

pub mod config;
pub mod defaults;
pub mod discovery;
pub mod errors;
pub mod form;
pub mod handler;
mod loader;
pub mod registry;
pub mod tag;

pub use config::ReaderConfig;
pub use errors::ExtensionError;
pub use form::{Form, Symbol};
pub use handler::{HandlerFn, HandlerRef};
pub use registry::{FallbackGuard, OverrideGuard, TagReaders};
pub use tag::Tag;

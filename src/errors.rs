//! Error taxonomy for reader-extension loading and dispatch.
//!
//! Load-time errors (`InvalidDeclarationFormat`, `InvalidTag`,
//! `InvalidHandlerTarget`, `ConflictingDeclaration`, `MalformedDeclaration`,
//! `UnreadableDeclaration`) abort the whole discovery-and-merge pass; nothing
//! partial is ever installed and the caller may retry after fixing sources
//! and calling `reset_cache()`. Dispatch-time errors (`HandlerNotFound`,
//! `UnresolvableBinding`, `Handler`) are local to one parse operation and do
//! not invalidate the registry.

use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::discovery::SourceId;
use crate::form::Symbol;
use crate::tag::Tag;

#[derive(Debug, Error, Diagnostic)]
pub enum ExtensionError {
    /// A declaration unit's content parsed, but was not a mapping.
    #[error("reader declaration from {origin} is not a mapping")]
    #[diagnostic(code(sable::reader::invalid_declaration_format))]
    InvalidDeclarationFormat { origin: SourceId },

    /// A declared key is not a namespace-qualified symbol.
    #[error("invalid reader tag {text:?} declared by {origin}: tags must be namespace-qualified symbols")]
    #[diagnostic(code(sable::reader::invalid_tag))]
    InvalidTag { text: String, origin: SourceId },

    /// A declared value is not a symbol naming a handler binding.
    #[error("invalid handler target for tag {tag} declared by {origin}: expected a symbol naming a binding")]
    #[diagnostic(code(sable::reader::invalid_handler_target))]
    InvalidHandlerTarget { tag: Tag, origin: SourceId },

    /// Two discovery units declare the same tag with different handlers.
    #[error("reader tag {tag} is declared by both {first} and {second} with different handlers")]
    #[diagnostic(code(sable::reader::conflicting_declaration))]
    ConflictingDeclaration {
        tag: Tag,
        first: SourceId,
        second: SourceId,
    },

    /// The parser capability could not read the unit's text as one form.
    #[error("could not parse reader declaration from {origin}: {message}")]
    #[diagnostic(code(sable::reader::malformed_declaration))]
    MalformedDeclaration { origin: SourceId, message: String },

    /// A declaration file exists but could not be read.
    #[error("could not read reader declaration file {}", path.display())]
    #[diagnostic(code(sable::reader::unreadable_declaration))]
    UnreadableDeclaration {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Dispatch found no handler and no scoped fallback changed that.
    #[error("no reader function registered for tag {tag}")]
    #[diagnostic(code(sable::reader::handler_not_found))]
    HandlerNotFound { tag: Tag },

    /// An indirect handler names a binding the resolver cannot produce.
    #[error("reader function for tag {tag} names binding {binding}, which is not resolvable")]
    #[diagnostic(code(sable::reader::unresolvable_binding))]
    UnresolvableBinding { tag: Tag, binding: Symbol },

    /// A handler ran and failed.
    #[error("reader function for tag {tag} failed: {message}")]
    #[diagnostic(code(sable::reader::handler_failed))]
    Handler { tag: Tag, message: String },
}

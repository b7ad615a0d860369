//! One-time discovery, validation, and merge of reader declarations.
//!
//! The merge starts from the built-in defaults, then folds in filesystem
//! declarations, then manifest declarations. Defaults may be overridden
//! freely; two *scan* sources declaring the same tag with different targets
//! is a conflict that names both sides. Redeclaring a tag with an identical
//! target is accepted without diagnostic (the second write is a no-op).
//!
//! Any failure aborts the whole pass before anything is installed.

use std::collections::HashMap;

use crate::config::ReaderConfig;
use crate::discovery::files::{self, SourcePaths};
use crate::discovery::manifest::{self, ManifestIndex};
use crate::discovery::{DeclarationMap, SourceId};
use crate::errors::ExtensionError;
use crate::form::ReadForm;
use crate::handler::HandlerRef;
use crate::tag::Tag;

/// Run both scanners and merge their declarations over the defaults.
#[tracing::instrument(skip_all)]
pub(crate) fn load(
    defaults: &HashMap<Tag, HandlerRef>,
    config: &ReaderConfig,
    paths: &dyn SourcePaths,
    index: &dyn ManifestIndex,
    parser: &dyn ReadForm,
) -> Result<HashMap<Tag, HandlerRef>, ExtensionError> {
    let mut declarations = files::scan(paths, parser)?;
    declarations.extend(manifest::scan(config, index)?);
    tracing::debug!(unit_count = declarations.len(), "merging reader declarations");
    merge(defaults, declarations)
}

fn merge(
    defaults: &HashMap<Tag, HandlerRef>,
    declarations: Vec<DeclarationMap>,
) -> Result<HashMap<Tag, HandlerRef>, ExtensionError> {
    let mut merged = defaults.clone();
    // Which scan unit first declared each tag. Tags only present from the
    // defaults are absent here: scan sources may override those freely.
    let mut declared_by: HashMap<Tag, SourceId> = HashMap::new();

    for declaration in declarations {
        for (tag, handler) in declaration.readers {
            match declared_by.get(&tag) {
                None => {
                    merged.insert(tag.clone(), handler);
                    declared_by.insert(tag, declaration.origin.clone());
                }
                Some(first) => {
                    let existing = &merged[&tag];
                    if existing.same_target(&handler) {
                        tracing::debug!(
                            %tag,
                            origin = %declaration.origin,
                            "identical redeclaration accepted"
                        );
                    } else {
                        return Err(ExtensionError::ConflictingDeclaration {
                            tag,
                            first: first.clone(),
                            second: declaration.origin,
                        });
                    }
                }
            }
        }
    }

    Ok(merged)
}

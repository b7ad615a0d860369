//! Filesystem scanner for `data_readers` declaration files.
//!
//! For each source root the scanner probes the root itself and each of its
//! immediate child directories; grandchildren are never scanned. A location
//! may carry the declaration under more than one recognized extension, in
//! which case the preference table below selects exactly one file. The `.clj`
//! spelling belongs to an incompatible dialect and is never read, even when
//! it is the only candidate present.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::discovery::{DeclarationMap, SourceId};
use crate::errors::ExtensionError;
use crate::form::{Form, ReadForm};
use crate::handler::HandlerRef;
use crate::tag::Tag;

/// File stem every declaration file must carry.
pub const DECL_FILE_STEM: &str = "data_readers";

/// Recognized extensions, in preference order: the native spelling wins over
/// the portable cross-dialect spelling when both exist at one location.
pub const RECOGNIZED_EXTENSIONS: &[&str] = &["sable", "cljc"];

/// Extensions that are never read: same stem, incompatible dialect.
pub const EXCLUDED_EXTENSIONS: &[&str] = &["clj"];

/// Capability supplied by the module/source-root resolution system.
pub trait SourcePaths: Send + Sync {
    /// Top-level source roots, in a stable order.
    fn source_roots(&self) -> Vec<PathBuf>;

    /// Immediate child directories of `root` (one level only).
    fn immediate_children(&self, root: &Path) -> io::Result<Vec<PathBuf>>;

    /// Whether `path` exists as a readable file.
    fn exists(&self, path: &Path) -> bool;

    /// Read `path` as text.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// [`SourcePaths`] over the real filesystem, for a fixed set of roots.
pub struct FsSourcePaths {
    roots: Vec<PathBuf>,
}

impl FsSourcePaths {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }
}

impl SourcePaths for FsSourcePaths {
    fn source_roots(&self) -> Vec<PathBuf> {
        self.roots.clone()
    }

    fn immediate_children(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        let mut children = Vec::new();
        for entry in fs::read_dir(root)? {
            let path = entry?.path();
            if path.is_dir() {
                children.push(path);
            }
        }
        // read_dir order is platform-dependent; sort for stable discovery.
        children.sort();
        Ok(children)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

/// Scan all source roots for declaration files.
///
/// Returns one [`DeclarationMap`] per discovered file, in discovery order.
/// Unreadable files and invalid contents fail the whole scan.
#[tracing::instrument(skip_all)]
pub fn scan(
    paths: &dyn SourcePaths,
    parser: &dyn ReadForm,
) -> Result<Vec<DeclarationMap>, ExtensionError> {
    let mut declarations = Vec::new();
    let mut visited: HashSet<PathBuf> = HashSet::new();

    for root in paths.source_roots() {
        let mut locations = vec![root.clone()];
        locations.extend(paths.immediate_children(&root).map_err(|source| {
            ExtensionError::UnreadableDeclaration {
                path: root.clone(),
                source,
            }
        })?);

        for location in locations {
            let Some(file) = pick_declaration_file(paths, &location) else {
                continue;
            };
            // Roots may overlap; read each chosen file once.
            if !visited.insert(file.clone()) {
                continue;
            }
            tracing::debug!(file = %file.display(), "reading declaration file");
            declarations.push(read_declaration_file(paths, parser, &file)?);
        }
    }

    Ok(declarations)
}

/// Choose the declaration file for one location, honoring the preference
/// table. Returns `None` when no recognized spelling exists there.
fn pick_declaration_file(paths: &dyn SourcePaths, location: &Path) -> Option<PathBuf> {
    for ext in RECOGNIZED_EXTENSIONS {
        let candidate = location.join(format!("{DECL_FILE_STEM}.{ext}"));
        if paths.exists(&candidate) {
            return Some(candidate);
        }
    }
    for ext in EXCLUDED_EXTENSIONS {
        let candidate = location.join(format!("{DECL_FILE_STEM}.{ext}"));
        if paths.exists(&candidate) {
            tracing::debug!(
                file = %candidate.display(),
                "ignoring declaration file from incompatible dialect"
            );
        }
    }
    None
}

fn read_declaration_file(
    paths: &dyn SourcePaths,
    parser: &dyn ReadForm,
    file: &Path,
) -> Result<DeclarationMap, ExtensionError> {
    let origin = SourceId::File(file.to_path_buf());
    let text =
        paths
            .read_to_string(file)
            .map_err(|source| ExtensionError::UnreadableDeclaration {
                path: file.to_path_buf(),
                source,
            })?;
    let form = parser
        .read_first(&text)
        .map_err(|err| ExtensionError::MalformedDeclaration {
            origin: origin.clone(),
            message: err.message,
        })?;
    declaration_from_form(form, origin)
}

/// Validate one parsed declaration form: it must be a mapping from
/// namespace-qualified symbols to symbols naming handler bindings.
pub(crate) fn declaration_from_form(
    form: Form,
    origin: SourceId,
) -> Result<DeclarationMap, ExtensionError> {
    let Form::Map(entries) = form else {
        return Err(ExtensionError::InvalidDeclarationFormat { origin });
    };

    let mut readers = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        let tag = match &key {
            Form::Symbol(sym) => Tag::from_symbol(sym),
            _ => None,
        };
        let Some(tag) = tag else {
            return Err(ExtensionError::InvalidTag {
                text: key.to_string(),
                origin,
            });
        };
        let Form::Symbol(target) = value else {
            return Err(ExtensionError::InvalidHandlerTarget { tag, origin });
        };
        readers.push((tag, HandlerRef::indirect(target)));
    }

    Ok(DeclarationMap { origin, readers })
}

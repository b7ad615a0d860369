//! Integration tests for declaration-file discovery and the one-time load.
//!
//! These run the whole pipeline over on-disk fixtures under
//! `tests/fixtures/`, with a small fixture parser standing in for the
//! surrounding reader.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sable_reader::config::ReaderConfig;
use sable_reader::defaults;
use sable_reader::discovery::files::FsSourcePaths;
use sable_reader::discovery::manifest::EmptyManifest;
use sable_reader::errors::ExtensionError;
use sable_reader::form::{Form, FormReadError, ReadForm, Symbol};
use sable_reader::handler::{BindingResolver, HandlerFn};
use sable_reader::registry::TagReaders;
use sable_reader::tag::Tag;

/// Fixture parser: `{sym sym ...}` maps, `[sym ...]` vectors, bare symbols.
/// The real reader supplies its own full parser through the same seam.
struct FixtureParser;

impl ReadForm for FixtureParser {
    fn read_first(&self, text: &str) -> Result<Form, FormReadError> {
        let trimmed = text.trim();
        if let Some(inner) = trimmed
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
        {
            let mut entries = Vec::new();
            let mut words = inner.split_whitespace();
            while let Some(key) = words.next() {
                let value = words
                    .next()
                    .ok_or_else(|| FormReadError::new("map literal with odd entry count"))?;
                entries.push((parse_symbol(key)?, parse_symbol(value)?));
            }
            return Ok(Form::Map(entries));
        }
        if let Some(inner) = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            let items = inner
                .split_whitespace()
                .map(parse_symbol)
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Form::Vector(items));
        }
        parse_symbol(trimmed)
    }
}

fn parse_symbol(word: &str) -> Result<Form, FormReadError> {
    Symbol::parse(word)
        .map(Form::Symbol)
        .ok_or_else(|| FormReadError::new(format!("unreadable symbol: {word:?}")))
}

/// Binding table for the indirect handlers the fixtures name.
struct FixtureBindings {
    bindings: HashMap<Symbol, HandlerFn>,
}

impl FixtureBindings {
    fn new() -> Self {
        let mut bindings: HashMap<Symbol, HandlerFn> = HashMap::new();
        bindings.insert(
            Symbol::parse("demo.readers/point").unwrap(),
            Arc::new(|form| Ok(Form::Vector(vec![Form::Keyword("point".into()), form]))),
        );
        Self { bindings }
    }
}

impl BindingResolver for FixtureBindings {
    fn resolve_binding(&self, binding: &Symbol) -> Option<HandlerFn> {
        self.bindings.get(binding).cloned()
    }
}

fn fixture_roots(names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| Path::new("tests/fixtures").join(name))
        .collect()
}

fn readers_over(roots: &[&str]) -> TagReaders {
    TagReaders::new(
        ReaderConfig::default(),
        Arc::new(FsSourcePaths::new(fixture_roots(roots))),
        Arc::new(EmptyManifest),
        Arc::new(FixtureParser),
        Arc::new(FixtureBindings::new()),
    )
}

fn tag(text: &str) -> Tag {
    Tag::parse(text).unwrap()
}

#[test]
fn test_discovery_depth_and_extension_preference() {
    let readers = readers_over(&["roots/app", "roots/lib"]);

    // Root-level and one-level-deep declaration files are discovered.
    assert!(readers.resolve(&tag("demo/point")).unwrap().is_some());
    assert!(readers.resolve(&tag("demo/widget")).unwrap().is_some());

    // Two levels below a root is out of reach.
    assert!(readers.resolve(&tag("demo/deep")).unwrap().is_none());

    // lib/ carries .sable, .cljc, and .clj spellings; only .sable is read.
    // The .cljc file maps demo/color to a different target, which would be a
    // conflict if both were loaded.
    assert!(readers.resolve(&tag("demo/color")).unwrap().is_some());
    assert!(readers.resolve(&tag("demo/jvm")).unwrap().is_none());
}

#[test]
fn test_file_declared_tag_dispatches_through_binding() {
    let readers = readers_over(&["roots/app"]);
    let expanded = readers
        .dispatch(&tag("demo/point"), Form::Int(3))
        .unwrap();
    assert_eq!(
        expanded,
        Form::Vector(vec![Form::Keyword("point".into()), Form::Int(3)])
    );
}

#[test]
fn test_defaults_survive_the_merge() {
    let readers = readers_over(&["roots/app"]);
    let entries = vec![(Form::Keyword("x".into()), Form::Int(1))];
    let native = readers
        .dispatch(&defaults::native_tag(), Form::Map(entries.clone()))
        .unwrap();
    assert_eq!(native, Form::NativeMap(entries));
}

#[test]
fn test_conflicting_fixtures_fail_the_load_naming_both_files() {
    let readers = readers_over(&["conflict"]);
    let err = readers.resolve(&tag("demo/dup")).unwrap_err();
    match err {
        ExtensionError::ConflictingDeclaration { tag, first, second } => {
            assert_eq!(tag.to_string(), "demo/dup");
            let (first, second) = (first.to_string(), second.to_string());
            assert!(first.contains("conflict/a"), "first was {first}");
            assert!(second.contains("conflict/b"), "second was {second}");
        }
        other => panic!("expected ConflictingDeclaration, got {other:?}"),
    }
}

#[test]
fn test_identical_redeclaration_across_fixtures_loads() {
    let readers = readers_over(&["duplicate"]);
    assert!(readers.resolve(&tag("demo/dup")).unwrap().is_some());
}

#[test]
fn test_vector_content_is_invalid_declaration_format() {
    let readers = readers_over(&["invalid_form"]);
    let err = readers.resolve(&tag("demo/point")).unwrap_err();
    assert!(matches!(
        err,
        ExtensionError::InvalidDeclarationFormat { .. }
    ));
}

#[test]
fn test_bare_key_is_invalid_tag() {
    let readers = readers_over(&["invalid_tag"]);
    let err = readers.resolve(&tag("demo/point")).unwrap_err();
    match err {
        ExtensionError::InvalidTag { text, .. } => assert_eq!(text, "point"),
        other => panic!("expected InvalidTag, got {other:?}"),
    }
}

#[test]
fn test_reset_cache_rescans_from_scratch() {
    let readers = readers_over(&["roots/app"]);
    assert!(readers.resolve(&tag("demo/point")).unwrap().is_some());

    readers.reset_cache();
    // Defaults are back immediately; the fixture tag reappears after the
    // forced re-scan on the next resolve.
    assert!(readers.resolve(&tag("demo/point")).unwrap().is_some());
    assert!(readers.resolve(&defaults::str_tag()).unwrap().is_some());
}

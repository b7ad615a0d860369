//! Data forms exchanged between the reader and tag handlers.
//!
//! `sable_reader` never tokenizes source text itself: the surrounding reader
//! parses the form that follows a `#tag` literal and hands it to this crate
//! as a [`Form`]. The same currency is used for declaration-file contents,
//! which the [`ReadForm`] capability parses on this crate's behalf.
//!
//! ## Notes
//! - `Form` is deliberately small: it carries just enough structure for tag
//!   handlers to rewrite literals. Reader-side concerns (spans, metadata,
//!   syntax-quote) stay in the reader.
//! - The `Native*` variants are host-native collection forms, produced by the
//!   built-in `sable/native` tag.

use std::fmt;

use thiserror::Error;

/// A (possibly namespace-qualified) symbolic identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    pub namespace: Option<String>,
    pub name: String,
}

impl Symbol {
    /// Build a bare symbol with no namespace part.
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    /// Build a namespace-qualified symbol.
    pub fn qualified(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    /// Parse `name` or `ns/name` spellings.
    ///
    /// Returns `None` when either part is empty, when a part contains
    /// whitespace, or when more than one `/` separator is present.
    pub fn parse(text: &str) -> Option<Self> {
        let (namespace, name) = match text.split_once('/') {
            Some((ns, rest)) => (Some(ns), rest),
            None => (None, text),
        };
        if name.is_empty() || !is_valid_part(name) {
            return None;
        }
        if let Some(ns) = namespace {
            if ns.is_empty() || !is_valid_part(ns) {
                return None;
            }
        }
        Some(Self {
            namespace: namespace.map(str::to_owned),
            name: name.to_owned(),
        })
    }
}

fn is_valid_part(part: &str) -> bool {
    !part.contains('/') && !part.chars().any(char::is_whitespace)
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}", ns, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// One unevaluated data form.
#[derive(Debug, Clone, PartialEq)]
pub enum Form {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Keyword(String),
    Symbol(Symbol),
    List(Vec<Form>),
    Vector(Vec<Form>),
    Map(Vec<(Form, Form)>),
    /// Host-native mapping, as produced by the `sable/native` tag.
    NativeMap(Vec<(Form, Form)>),
    /// Host-native sequence, as produced by the `sable/native` tag.
    NativeVec(Vec<Form>),
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Form::Nil => write!(f, "nil"),
            Form::Bool(b) => write!(f, "{b}"),
            Form::Int(n) => write!(f, "{n}"),
            Form::Float(n) => write!(f, "{n}"),
            Form::Str(s) => write!(f, "{s:?}"),
            Form::Keyword(k) => write!(f, ":{k}"),
            Form::Symbol(s) => write!(f, "{s}"),
            Form::List(items) => write_seq(f, "(", items, ")"),
            Form::Vector(items) => write_seq(f, "[", items, "]"),
            Form::Map(entries) => write_map(f, "{", entries, "}"),
            Form::NativeMap(entries) => write_map(f, "#sable/native {", entries, "}"),
            Form::NativeVec(items) => write_seq(f, "#sable/native [", items, "]"),
        }
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, open: &str, items: &[Form], close: &str) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "{close}")
}

fn write_map(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    entries: &[(Form, Form)],
    close: &str,
) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, (key, value)) in entries.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{key} {value}")?;
    }
    write!(f, "{close}")
}

/// Error produced by a [`ReadForm`] implementation.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct FormReadError {
    pub message: String,
}

impl FormReadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Capability supplied by the surrounding reader: parse one literal data form
/// from text and return it unevaluated.
///
/// Declaration files are read through this seam so this crate stays
/// syntax-agnostic.
pub trait ReadForm: Send + Sync {
    fn read_first(&self, text: &str) -> Result<Form, FormReadError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_symbol() {
        let sym = Symbol::parse("point").unwrap();
        assert_eq!(sym.namespace, None);
        assert_eq!(sym.name, "point");
    }

    #[test]
    fn test_parse_qualified_symbol() {
        let sym = Symbol::parse("demo.readers/point").unwrap();
        assert_eq!(sym.namespace.as_deref(), Some("demo.readers"));
        assert_eq!(sym.name, "point");
    }

    #[test]
    fn test_parse_rejects_empty_parts() {
        assert_eq!(Symbol::parse(""), None);
        assert_eq!(Symbol::parse("/name"), None);
        assert_eq!(Symbol::parse("ns/"), None);
        assert_eq!(Symbol::parse("a/b/c"), None);
        assert_eq!(Symbol::parse("has space"), None);
    }

    #[test]
    fn test_display_round_trips_symbols() {
        for text in ["point", "demo.readers/point"] {
            let sym = Symbol::parse(text).unwrap();
            assert_eq!(sym.to_string(), text);
        }
    }

    #[test]
    fn test_form_display() {
        let form = Form::Map(vec![
            (Form::Keyword("x".into()), Form::Int(1)),
            (Form::Keyword("y".into()), Form::Int(2)),
        ]);
        assert_eq!(form.to_string(), "{:x 1, :y 2}");

        let native = Form::NativeVec(vec![Form::Nil, Form::Bool(true)]);
        assert_eq!(native.to_string(), "#sable/native [nil true]");
    }
}

//! Tag identity for `#tag form` literals.
//!
//! A tag is a two-part qualified identifier. Bare (namespace-less) symbols
//! are reserved for the host language itself and are rejected here; user
//! extension points must always carry a namespace.
//!
//! ## Examples
//! ```rust
//! use sable_reader::tag::Tag;
//!
//! let tag = Tag::parse("demo/point").unwrap();
//! assert_eq!(tag.namespace(), "demo");
//! assert_eq!(tag.name(), "point");
//! assert_eq!(tag.to_string(), "demo/point");
//!
//! assert!(Tag::parse("point").is_none());
//! ```

use std::fmt;

use crate::form::Symbol;

/// A namespace-qualified tag. Both parts are guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    namespace: String,
    name: String,
}

impl Tag {
    /// Build a tag from its two parts. Returns `None` if either part is
    /// empty or not a valid symbol part.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Option<Self> {
        let namespace = namespace.into();
        let name = name.into();
        Symbol::parse(&format!("{namespace}/{name}")).map(|_| Self { namespace, name })
    }

    /// Parse a `ns/name` spelling.
    pub fn parse(text: &str) -> Option<Self> {
        Symbol::parse(text).and_then(|sym| Self::from_symbol(&sym))
    }

    /// Build a tag from a parsed symbol. Bare symbols are rejected.
    pub fn from_symbol(symbol: &Symbol) -> Option<Self> {
        let namespace = symbol.namespace.as_ref()?;
        Some(Self {
            namespace: namespace.clone(),
            name: symbol.name.clone(),
        })
    }

    /// Internal constructor for spellings known valid at authoring time.
    pub(crate) fn from_parts_unchecked(namespace: &str, name: &str) -> Self {
        debug_assert!(!namespace.is_empty() && !name.is_empty());
        Self {
            namespace: namespace.to_owned(),
            name: name.to_owned(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_qualified_tag() {
        let tag = Tag::parse("sable.test/widget").unwrap();
        assert_eq!(tag.namespace(), "sable.test");
        assert_eq!(tag.name(), "widget");
    }

    #[test]
    fn test_bare_symbol_is_not_a_tag() {
        assert!(Tag::parse("widget").is_none());
        let bare = Symbol::simple("widget");
        assert!(Tag::from_symbol(&bare).is_none());
    }

    #[test]
    fn test_new_rejects_empty_parts() {
        assert!(Tag::new("", "widget").is_none());
        assert!(Tag::new("demo", "").is_none());
        assert!(Tag::new("demo", "widget").is_some());
    }

    #[test]
    fn test_structural_equality() {
        let a = Tag::parse("demo/point").unwrap();
        let b = Tag::new("demo", "point").unwrap();
        assert_eq!(a, b);
    }
}

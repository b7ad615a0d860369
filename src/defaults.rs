//! Built-in default reader tags.
//!
//! Defaults are seeded directly into the root registry before any scan runs,
//! so each can be shadowed individually (by a scan source, programmatic
//! registration, or a scoped override) rather than all-or-nothing through the
//! fallback path. Scan sources may freely override them.

use std::collections::HashMap;

use crate::errors::ExtensionError;
use crate::form::Form;
use crate::handler::HandlerRef;
use crate::tag::Tag;

/// `#sable/native`: rewrite a collection literal into its host-native form.
pub fn native_tag() -> Tag {
    Tag::from_parts_unchecked("sable", "native")
}

/// `#sable/str`: render the following form to its printed representation.
pub fn str_tag() -> Tag {
    Tag::from_parts_unchecked("sable", "str")
}

/// The default readers shipped with the language.
pub fn builtin_readers() -> HashMap<Tag, HandlerRef> {
    HashMap::from([
        (native_tag(), HandlerRef::direct(native_reader)),
        (str_tag(), HandlerRef::direct(str_reader)),
    ])
}

fn native_reader(form: Form) -> Result<Form, ExtensionError> {
    match form {
        Form::Map(entries) => Ok(Form::NativeMap(entries)),
        Form::Vector(items) | Form::List(items) => Ok(Form::NativeVec(items)),
        other => Err(ExtensionError::Handler {
            tag: native_tag(),
            message: format!("expected a collection literal, found {other}"),
        }),
    }
}

fn str_reader(form: Form) -> Result<Form, ExtensionError> {
    Ok(Form::Str(form.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Symbol;

    #[test]
    fn test_native_reader_rewrites_collections() {
        let entries = vec![(Form::Keyword("x".into()), Form::Int(1))];
        assert_eq!(
            native_reader(Form::Map(entries.clone())).unwrap(),
            Form::NativeMap(entries)
        );
        assert_eq!(
            native_reader(Form::Vector(vec![Form::Int(1)])).unwrap(),
            Form::NativeVec(vec![Form::Int(1)])
        );
    }

    #[test]
    fn test_native_reader_rejects_scalars() {
        let err = native_reader(Form::Int(7)).unwrap_err();
        assert!(matches!(err, ExtensionError::Handler { .. }));
    }

    #[test]
    fn test_str_reader_prints_the_form() {
        let form = Form::List(vec![
            Form::Symbol(Symbol::simple("inc")),
            Form::Int(1),
        ]);
        assert_eq!(str_reader(form).unwrap(), Form::Str("(inc 1)".into()));
    }
}

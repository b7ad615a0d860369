//! Handler references and the late-binding resolution seam.
//!
//! A handler is a one-argument callable from form to form. Declaration files
//! and manifest entries can only *name* handlers, so those produce
//! [`HandlerRef::Indirect`] values that are resolved against the host's
//! global bindings on every dispatch; redefining the named binding changes
//! future behavior without reloading the registry. Programmatic registration
//! may also install a closure directly via [`HandlerRef::Direct`].

use std::fmt;
use std::sync::Arc;

use crate::errors::ExtensionError;
use crate::form::{Form, Symbol};
use crate::tag::Tag;

/// A reader handler: consumes the parsed form following a tag, returns its
/// replacement value.
pub type HandlerFn = Arc<dyn Fn(Form) -> Result<Form, ExtensionError> + Send + Sync>;

/// Capability supplied by the host runtime: look up a named global binding
/// as a callable handler. Consulted at dispatch time, never cached.
pub trait BindingResolver: Send + Sync {
    fn resolve_binding(&self, binding: &Symbol) -> Option<HandlerFn>;
}

/// A [`BindingResolver`] with no bindings, for embedders that register
/// handlers programmatically only.
pub struct NoBindings;

impl BindingResolver for NoBindings {
    fn resolve_binding(&self, _binding: &Symbol) -> Option<HandlerFn> {
        None
    }
}

/// A resolvable reference to a reader handler.
#[derive(Clone)]
pub enum HandlerRef {
    /// A handler value held directly.
    Direct(HandlerFn),
    /// A late-binding reference to a named global binding.
    Indirect(Symbol),
}

impl HandlerRef {
    pub fn direct(f: impl Fn(Form) -> Result<Form, ExtensionError> + Send + Sync + 'static) -> Self {
        Self::Direct(Arc::new(f))
    }

    pub fn indirect(binding: Symbol) -> Self {
        Self::Indirect(binding)
    }

    /// Whether two references name the same target.
    ///
    /// Indirect references compare their binding symbols; direct references
    /// compare handler identity. Two distinct closures are never the same
    /// target, even if behaviorally identical.
    pub fn same_target(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Direct(a), Self::Direct(b)) => Arc::ptr_eq(a, b),
            (Self::Indirect(a), Self::Indirect(b)) => a == b,
            _ => false,
        }
    }

    /// Invoke the handler on `form`, resolving indirect bindings through
    /// `bindings`. `tag` is used only for error reporting.
    pub fn invoke(
        &self,
        tag: &Tag,
        form: Form,
        bindings: &dyn BindingResolver,
    ) -> Result<Form, ExtensionError> {
        match self {
            Self::Direct(f) => f(form),
            Self::Indirect(binding) => {
                let f = bindings.resolve_binding(binding).ok_or_else(|| {
                    ExtensionError::UnresolvableBinding {
                        tag: tag.clone(),
                        binding: binding.clone(),
                    }
                })?;
                f(form)
            }
        }
    }
}

impl fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(_) => f.write_str("Direct(<fn>)"),
            Self::Indirect(binding) => write!(f, "Indirect({binding})"),
        }
    }
}

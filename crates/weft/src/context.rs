//! Data context threaded through expansion.

use std::rc::Rc;

use serde_json::Value;

static UNDEFINED: Value = Value::Null;

/// Implicit receiver for expressions at a point in the tree.
///
/// Either undefined or a shared, immutable JSON value. Data directives
/// replace the context for a subtree; it is never mutated in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context(Option<Rc<Value>>);

impl Context {
    /// The context of an element that declares no data.
    #[must_use]
    pub fn undefined() -> Self {
        Self(None)
    }

    /// A context holding `value`.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(Some(Rc::new(value)))
    }

    #[must_use]
    pub fn is_defined(&self) -> bool {
        self.0.is_some()
    }

    /// The value expressions see. Undefined reads as `null`.
    #[must_use]
    pub fn value(&self) -> &Value {
        self.0.as_deref().unwrap_or(&UNDEFINED)
    }
}

impl From<Value> for Context {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl From<Option<Value>> for Context {
    fn from(value: Option<Value>) -> Self {
        value.map_or_else(Self::undefined, Self::new)
    }
}

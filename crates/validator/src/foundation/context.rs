//! Validation context passed to every rule.
//!
//! The context is borrowed and `Copy`: it carries the caller-supplied
//! context value and, during a schema run, a `parent` reference to the whole
//! object being validated so rules can reach sibling fields. The running
//! schema's named-condition table rides along for conditional rules nested
//! anywhere below a field.

use std::fmt;

use serde_json::Value;

use crate::combinators::NamedConditions;
use crate::path;

/// Read-only view of the surroundings of a value under validation.
///
/// # Examples
///
/// ```rust,ignore
/// use gatekeeper_validator::foundation::Context;
/// use serde_json::json;
///
/// let data = json!({"password": "a", "confirmPassword": "b"});
/// let ctx = Context::empty().with_parent(&data);
/// assert_eq!(ctx.lookup("password"), Some(&json!("a")));
/// ```
#[derive(Clone, Copy, Default)]
pub struct Context<'a> {
    caller: Option<&'a Value>,
    parent: Option<&'a Value>,
    conditions: Option<&'a NamedConditions>,
}

impl<'a> Context<'a> {
    /// Creates a context around an optional caller-supplied value.
    #[must_use]
    pub const fn new(caller: Option<&'a Value>) -> Self {
        Self {
            caller,
            parent: None,
            conditions: None,
        }
    }

    /// A context with neither caller value nor parent.
    #[must_use]
    pub const fn empty() -> Self {
        Self::new(None)
    }

    /// Returns a copy whose parent is `parent`.
    #[must_use]
    pub const fn with_parent(self, parent: &'a Value) -> Self {
        Self {
            parent: Some(parent),
            ..self
        }
    }

    /// Returns a copy that resolves named conditions against `conditions`.
    #[must_use]
    pub const fn with_conditions(self, conditions: &'a NamedConditions) -> Self {
        Self {
            conditions: Some(conditions),
            ..self
        }
    }

    /// The caller-supplied context value.
    #[must_use]
    pub const fn caller(&self) -> Option<&'a Value> {
        self.caller
    }

    /// The object that owns the value under validation.
    #[must_use]
    pub const fn parent(&self) -> Option<&'a Value> {
        self.parent
    }

    /// The named-condition table of the schema being run, if any.
    #[must_use]
    pub const fn conditions(&self) -> Option<&'a NamedConditions> {
        self.conditions
    }

    /// Resolves a dot path against the parent, then the caller value.
    #[must_use]
    pub fn lookup(&self, dot_path: &str) -> Option<&'a Value> {
        self.parent
            .and_then(|parent| path::resolve(parent, dot_path))
            .or_else(|| self.caller.and_then(|caller| path::resolve(caller, dot_path)))
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.conditions.into_iter().flat_map(|c| c.keys()).collect();
        names.sort();
        f.debug_struct("Context")
            .field("caller", &self.caller)
            .field("parent", &self.parent)
            .field("conditions", &names)
            .finish()
    }
}

/// Treats JSON `null` like an absent value.
#[must_use]
pub fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_prefers_parent() {
        let caller = json!({"role": "admin", "tenant": {"id": 7}});
        let parent = json!({"role": "user"});
        let ctx = Context::new(Some(&caller)).with_parent(&parent);

        assert_eq!(ctx.lookup("role"), Some(&json!("user")));
        assert_eq!(ctx.lookup("tenant.id"), Some(&json!(7)));
        assert_eq!(ctx.lookup("missing"), None);
    }

    #[test]
    fn null_is_absent() {
        assert!(present(Some(&Value::Null)).is_none());
        assert!(present(None).is_none());
        assert_eq!(present(Some(&json!(0))), Some(&json!(0)));
    }
}

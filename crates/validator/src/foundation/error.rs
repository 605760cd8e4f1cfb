//! Error types for validation failures
//!
//! A [`ValidationError`] is a single finding produced by a rule. Errors are
//! plain data: they carry a root-relative path, a human message, an ordered
//! list of stable message identifiers for message-table lookups, and
//! optional `expected`/`received` diagnostics.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A structured validation finding.
///
/// # Examples
///
/// ```rust,ignore
/// use gatekeeper_validator::foundation::ValidationError;
///
/// let error = ValidationError::new("Must be at least 18")
///     .with_message_id("validation.min")
///     .with_expected(18)
///     .prefixed("age");
///
/// assert_eq!(error.path, vec!["age".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    /// Top-level field that produced this error, stamped by the schema validator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// Root-relative location: field names and array indices as strings.
    ///
    /// Examples: `["address", "city"]`, `["alternateAddresses", "1", "city"]`
    #[serde(default)]
    pub path: Vec<String>,

    /// Human-readable message.
    pub message: String,

    /// Stable identifiers usable for message-table lookup, most specific first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub message_ids: Vec<String>,

    /// What the rule expected, when meaningful.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,

    /// What the rule received, when meaningful.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received: Option<Value>,

    /// Kind of the compiled rule that produced the error (`min`,
    /// `safeSizeString`, `datatype`, ...). Never serialised.
    #[serde(skip)]
    pub rule_type: Option<String>,
}

impl ValidationError {
    /// Creates an error with a message and nothing else.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            field: None,
            path: Vec::new(),
            message: message.into(),
            message_ids: Vec::new(),
            expected: None,
            received: None,
            rule_type: None,
        }
    }

    /// Sets the field attribute.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Replaces the path.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_path(mut self, path: Vec<String>) -> Self {
        self.path = path;
        self
    }

    /// Appends a message identifier.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_message_id(mut self, id: impl Into<String>) -> Self {
        self.message_ids.push(id.into());
        self
    }

    /// Sets the expected diagnostic.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_expected(mut self, expected: impl Into<Value>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Sets the received diagnostic.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_received(mut self, received: impl Into<Value>) -> Self {
        self.received = Some(received.into());
        self
    }

    /// Sets the rule type unless a more specific rule already did.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_rule_type(mut self, kind: &str) -> Self {
        if self.rule_type.is_none() {
            self.rule_type = Some(kind.to_owned());
        }
        self
    }

    /// Prepends one path segment.
    #[must_use = "builder methods must be chained or built"]
    pub fn prefixed(mut self, segment: impl Into<String>) -> Self {
        self.path.insert(0, segment.into());
        self
    }

    /// Prepends several path segments, keeping their order.
    #[must_use = "builder methods must be chained or built"]
    pub fn prefixed_with(mut self, segments: &[String]) -> Self {
        if !segments.is_empty() {
            self.path.splice(0..0, segments.iter().cloned());
        }
        self
    }

    /// The most specific message identifier, if any.
    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        self.message_ids.first().map(String::as_str)
    }

    /// Returns true if `id` is among this error's identifiers.
    #[must_use]
    pub fn has_message_id(&self, id: &str) -> bool {
        self.message_ids.iter().any(|m| m == id)
    }

    /// Replaces the message with the override of the first identifier that
    /// has one. Returns whether a replacement happened.
    pub fn apply_override(&mut self, overrides: &HashMap<String, String>) -> bool {
        match self.message_ids.iter().find_map(|id| overrides.get(id)) {
            Some(text) => {
                self.message.clone_from(text);
                true
            }
            None => false,
        }
    }

    /// Strips everything but `path` and `message`.
    #[must_use]
    pub fn terse(self) -> Self {
        Self {
            path: self.path,
            ..Self::new(self.message)
        }
    }

    /// The path joined with dots, for logs and display.
    #[must_use]
    pub fn dotted_path(&self) -> String {
        self.path.join(".")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)?;
        } else {
            write!(f, "[{}] {}", self.dotted_path(), self.message)?;
        }
        if let Some(id) = self.message_id() {
            write!(f, " ({id})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prefixing_keeps_traversal_order() {
        let error = ValidationError::new("City is required")
            .prefixed("city")
            .prefixed("1")
            .prefixed("alternateAddresses");
        assert_eq!(error.path, ["alternateAddresses", "1", "city"]);

        let error = ValidationError::new("x")
            .prefixed("c")
            .prefixed_with(&["a".to_string(), "b".to_string()]);
        assert_eq!(error.dotted_path(), "a.b.c");
    }

    #[test]
    fn first_matching_override_wins() {
        let mut error = ValidationError::new("Too small")
            .with_message_id("validation.entity.user.age.min")
            .with_message_id("validation.min");

        let overrides = HashMap::from([
            ("validation.min".to_string(), "generic".to_string()),
            (
                "validation.entity.user.age.min".to_string(),
                "specific".to_string(),
            ),
        ]);
        assert!(error.apply_override(&overrides));
        assert_eq!(error.message, "specific");

        let mut untouched = ValidationError::new("keep").with_message_id("validation.max");
        assert!(!untouched.apply_override(&overrides));
        assert_eq!(untouched.message, "keep");
    }

    #[test]
    fn terse_strips_diagnostics() {
        let error = ValidationError::new("Must be at least 18")
            .with_field("age")
            .with_message_id("validation.min")
            .with_expected(18)
            .with_received(16)
            .prefixed("age")
            .terse();

        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            json!({"path": ["age"], "message": "Must be at least 18"})
        );
    }

    #[test]
    fn serializes_camel_case() {
        let error = ValidationError::new("bad").with_message_id("validation.custom");
        let value = serde_json::to_value(&error).unwrap();
        assert_eq!(value["messageIds"], json!(["validation.custom"]));
        assert!(value.get("field").is_none());
    }

    #[test]
    fn display_includes_path_and_id() {
        let error = ValidationError::new("Invalid email")
            .with_message_id("validation.email")
            .prefixed("email");
        assert_eq!(error.to_string(), "[email] Invalid email (validation.email)");
    }
}

//! Nested schema validation
//!
//! [`Nested`] resolves a dot path against the value under validation and
//! runs a child [`ValidationSchema`] on what it finds. Child error paths are
//! re-prefixed with the path segments, so an error on `city` inside
//! `nested("address", ..)` reports `["address", "city"]` once the schema
//! validator adds the field name.
//!
//! # Examples
//!
//! ```rust,ignore
//! use gatekeeper_validator::prelude::*;
//!
//! let address = ValidationSchema::new()
//!     .field("street", required())
//!     .field("city", required());
//!
//! let schema = ValidationSchema::new()
//!     .field("address", nested("", address.clone()))
//!     .field("billing", nested("", address).required(false));
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::foundation::{Context, ValidationError, ValidationResult, ValidationRule, present};
use crate::path;
use crate::schema::{self, ValidationSchema};
use crate::validators::MessageOverride;

/// Runs a child schema on the value found at `path`.
#[derive(Debug, Clone)]
pub struct Nested {
    path: String,
    schema: Arc<ValidationSchema>,
    required: bool,
    message: String,
    message_id: String,
}

impl Nested {
    pub fn new(path: impl Into<String>, schema: impl Into<Arc<ValidationSchema>>) -> Self {
        Self {
            path: path.into(),
            schema: schema.into(),
            required: true,
            message: "Nested value is required".to_owned(),
            message_id: "validation.nested.required".to_owned(),
        }
    }

    /// Whether a missing sub-value fails (default `true`).
    #[must_use = "builder methods must be chained or built"]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Replaces the failure message.
    #[must_use = "builder methods must be chained or built"]
    pub fn message(self, message: impl Into<String>) -> Self {
        self.override_message(Some(message.into()), None)
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn message_id(self, id: impl Into<String>) -> Self {
        self.override_message(None, Some(id.into()))
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn schema(&self) -> &ValidationSchema {
        &self.schema
    }
}

#[async_trait]
impl ValidationRule for Nested {
    async fn validate(&self, value: Option<&Value>, ctx: &Context<'_>) -> ValidationResult {
        let target = present(value).and_then(|v| present(path::resolve(v, &self.path)));
        let prefix = path::segments(&self.path);

        let Some(target) = target else {
            if !self.required {
                return ValidationResult::passed();
            }
            return ValidationResult::fail(
                ValidationError::new(self.message.clone())
                    .with_message_id(self.message_id.clone())
                    .with_path(prefix),
            );
        };

        let errors = schema::collect(Some(target), &self.schema, ctx.caller(), true).await;
        ValidationResult::from_errors(errors.into_iter().map(|e| e.prefixed_with(&prefix)).collect())
    }
}

impl MessageOverride for Nested {
    fn override_message(mut self, message: Option<String>, message_id: Option<String>) -> Self {
        if let Some(message) = message {
            self.message = message;
        }
        if let Some(id) = message_id {
            self.message_id = id;
        }
        self
    }
}

/// Validates the value at `path` (`""` for the value itself) against `schema`.
pub fn nested(path: impl Into<String>, schema: impl Into<Arc<ValidationSchema>>) -> Nested {
    Nested::new(path, schema)
}

//! Cross-field dependencies
//!
//! [`DependsOn`] defines a value's validity in terms of another value found
//! by path. The path resolves against the schema's `parent` object when one
//! is set, then against the caller context, and finally against the value
//! itself, so the rule also works outside a schema run.
//!
//! # Examples
//!
//! ```rust,ignore
//! use gatekeeper_validator::prelude::*;
//!
//! let schema = ValidationSchema::new().field(
//!     "confirmPassword",
//!     depends_on("password", |password, confirm, _| password == confirm)
//!         .message("Passwords do not match"),
//! );
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::foundation::{Context, ValidationError, ValidationResult, ValidationRule, present};
use crate::path;
use crate::validators::MessageOverride;

/// A dependency predicate: `(dependency_value, value, context)`.
pub type DependencyFn =
    Arc<dyn Fn(Option<&Value>, Option<&Value>, &Context<'_>) -> bool + Send + Sync>;

/// Validates a value against the value at another path.
#[derive(Clone)]
pub struct DependsOn {
    path: String,
    predicate: DependencyFn,
    message: String,
    message_id: String,
}

impl DependsOn {
    pub fn new(path: impl Into<String>, predicate: DependencyFn) -> Self {
        let path = path.into();
        Self {
            message: format!("Validation failed for dependency on '{path}'"),
            message_id: "validation.dependsOn".to_owned(),
            path,
            predicate,
        }
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = id.into();
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn dependency<'a>(&self, value: Option<&'a Value>, ctx: &Context<'a>) -> Option<&'a Value> {
        if let Some(parent) = ctx.parent() {
            return path::resolve(parent, &self.path);
        }
        if let Some(caller) = ctx.caller() {
            return path::resolve(caller, &self.path);
        }
        present(value).and_then(|v| path::resolve(v, &self.path))
    }
}

impl std::fmt::Debug for DependsOn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependsOn")
            .field("path", &self.path)
            .field("message", &self.message)
            .field("message_id", &self.message_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ValidationRule for DependsOn {
    async fn validate(&self, value: Option<&Value>, ctx: &Context<'_>) -> ValidationResult {
        let dependency = present(self.dependency(value, ctx));
        if (self.predicate)(dependency, present(value), ctx) {
            return ValidationResult::passed();
        }

        let mut error = ValidationError::new(self.message.clone()).with_message_id(self.message_id.clone());
        if let Some(dependency) = dependency {
            error = error.with_expected(dependency.clone());
        }
        if let Some(value) = present(value) {
            error = error.with_received(value.clone());
        }
        ValidationResult::fail(error)
    }
}

impl MessageOverride for DependsOn {
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

/// Validates a value in terms of the value at `path`.
pub fn depends_on<F>(path: impl Into<String>, predicate: F) -> DependsOn
where
    F: Fn(Option<&Value>, Option<&Value>, &Context<'_>) -> bool + Send + Sync + 'static,
{
    DependsOn::new(path, Arc::new(predicate))
}

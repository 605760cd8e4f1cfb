//! EACH combinator - validates every element of an array

use async_trait::async_trait;
use serde_json::Value;

use crate::foundation::{
    Context, RuleExt, SharedRule, ValidationError, ValidationResult, ValidationRule, present,
};
use crate::validators::MessageOverride;

/// Validates each element of an array with the same rule.
///
/// Errors are prefixed with the element's index as a string, so a failure on
/// the second element's `city` reads `["1", "city"]`.
///
/// # Examples
///
/// ```rust,ignore
/// use gatekeeper_validator::prelude::*;
///
/// let tags = each_item(min_length(2)).stop_on_first_error(true);
/// ```
#[derive(Debug, Clone)]
pub struct EachItem {
    rule: SharedRule,
    required: bool,
    stop_on_first_error: bool,
    message: String,
    message_id: String,
}

impl EachItem {
    pub fn new(rule: SharedRule) -> Self {
        Self {
            rule,
            required: true,
            stop_on_first_error: false,
            message: "Value must be an array".to_owned(),
            message_id: "validation.eachItem.array".to_owned(),
        }
    }

    /// Whether an absent value fails (default `true`).
    #[must_use = "builder methods must be chained or built"]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Stop after the first failing element (default `false`).
    #[must_use = "builder methods must be chained or built"]
    pub fn stop_on_first_error(mut self, stop: bool) -> Self {
        self.stop_on_first_error = stop;
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

    pub fn rule(&self) -> &SharedRule {
        &self.rule
    }

    fn not_an_array(&self, received: Option<&Value>) -> ValidationResult {
        let error = ValidationError::new(self.message.clone()).with_message_id(self.message_id.clone());
        ValidationResult::fail(match received {
            Some(value) => error.with_received(value.clone()),
            None => error,
        })
    }
}

#[async_trait]
impl ValidationRule for EachItem {
    async fn validate(&self, value: Option<&Value>, ctx: &Context<'_>) -> ValidationResult {
        let items = match present(value) {
            None if !self.required => return ValidationResult::passed(),
            None => return self.not_an_array(None),
            Some(Value::Array(items)) => items,
            Some(other) => return self.not_an_array(Some(other)),
        };

        let mut errors = Vec::new();
        for (index, item) in items.iter().enumerate() {
            let result = self.rule.validate(Some(item), ctx).await;
            if result.is_fail() {
                errors.extend(result.prefixed(&index.to_string()).into_errors());
                if self.stop_on_first_error {
                    break;
                }
            }
        }
        ValidationResult::from_errors(errors)
    }
}

impl MessageOverride for EachItem {
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

/// Applies `rule` to every element of an array.
pub fn each_item<R: ValidationRule + 'static>(rule: R) -> EachItem {
    EachItem::new(rule.shared())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::min_length;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn prefixes_with_index() {
        let value = json!(["ok", "x", "fine", "y"]);
        let result = each_item(min_length(2)).validate(Some(&value), &Context::empty()).await;

        let paths: Vec<_> = result.errors().iter().map(|e| e.path.clone()).collect();
        assert_eq!(paths, vec![vec!["1"], vec!["3"]]);
    }

    #[tokio::test]
    async fn stops_on_first_error() {
        let value = json!(["x", "y"]);
        let rule = each_item(min_length(2)).stop_on_first_error(true);
        assert_eq!(rule.validate(Some(&value), &Context::empty()).await.errors().len(), 1);
    }

    #[tokio::test]
    async fn requires_an_array() {
        let ctx = Context::empty();
        let rule = each_item(min_length(2));

        let result = rule.validate(Some(&json!("abc")), &ctx).await;
        assert_eq!(result.errors()[0].message_id(), Some("validation.eachItem.array"));
        assert!(rule.validate(None, &ctx).await.is_fail());
        assert!(rule.clone().required(false).validate(None, &ctx).await.is_pass());
        assert!(rule.required(false).validate(Some(&json!(1)), &ctx).await.is_fail());
    }

    #[tokio::test]
    async fn custom_array_message() {
        let rule = each_item(min_length(2)).message("Tags must be a list").message_id("validation.tags");
        let result = rule.validate(Some(&json!({})), &Context::empty()).await;
        assert_eq!(result.errors()[0].message, "Tags must be a list");
        assert_eq!(result.errors()[0].message_id(), Some("validation.tags"));
    }
}

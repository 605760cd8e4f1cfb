//! OBJECT_VALUES combinator - validates every value of a map

use async_trait::async_trait;
use serde_json::Value;

use crate::foundation::{
    Context, RuleExt, SharedRule, ValidationError, ValidationResult, ValidationRule, present,
};
use crate::validators::MessageOverride;

/// Validates each value of an object with the same rule, for maps with
/// arbitrary keys. Errors are prefixed with the key.
#[derive(Debug, Clone)]
pub struct ObjectValues {
    rule: SharedRule,
    required: bool,
    stop_on_first_error: bool,
    message: String,
    message_id: String,
}

impl ObjectValues {
    pub fn new(rule: SharedRule) -> Self {
        Self {
            rule,
            required: true,
            stop_on_first_error: false,
            message: "Value must be an object".to_owned(),
            message_id: "validation.objectValues.object".to_owned(),
        }
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

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

    fn not_an_object(&self, received: Option<&Value>) -> ValidationResult {
        let error = ValidationError::new(self.message.clone()).with_message_id(self.message_id.clone());
        ValidationResult::fail(match received {
            Some(value) => error.with_received(value.clone()),
            None => error,
        })
    }
}

#[async_trait]
impl ValidationRule for ObjectValues {
    async fn validate(&self, value: Option<&Value>, ctx: &Context<'_>) -> ValidationResult {
        let map = match present(value) {
            None if !self.required => return ValidationResult::passed(),
            None => return self.not_an_object(None),
            Some(Value::Object(map)) => map,
            Some(other) => return self.not_an_object(Some(other)),
        };

        let mut errors = Vec::new();
        for (key, entry) in map {
            let result = self.rule.validate(Some(entry), ctx).await;
            if result.is_fail() {
                errors.extend(result.prefixed(key).into_errors());
                if self.stop_on_first_error {
                    break;
                }
            }
        }
        ValidationResult::from_errors(errors)
    }
}

impl MessageOverride for ObjectValues {
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

/// Applies `rule` to every value of an object.
pub fn object_values<R: ValidationRule + 'static>(rule: R) -> ObjectValues {
    ObjectValues::new(rule.shared())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::min;
    use serde_json::json;

    #[tokio::test]
    async fn prefixes_with_key() {
        let prices = json!({"apple": 3, "pear": -1, "plum": -2});
        let result = object_values(min(0)).validate(Some(&prices), &Context::empty()).await;

        let paths: Vec<_> = result.errors().iter().map(ValidationError::dotted_path).collect();
        assert_eq!(paths, ["pear", "plum"]);
    }

    #[tokio::test]
    async fn arrays_are_not_objects() {
        let result = object_values(min(0)).validate(Some(&json!([1])), &Context::empty()).await;
        assert_eq!(result.errors()[0].message_id(), Some("validation.objectValues.object"));
    }
}

//! Length validators
//!
//! Length is measured in Unicode scalar values for strings and in elements
//! for arrays. Any other type fails the rule.

use serde_json::Value;

use super::predicate::{Absent, PredicateRule, rule};

/// The measurable length of a value, if it has one.
pub(crate) fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

/// Requires a string or array of at least `min` characters/elements.
pub fn min_length(min: usize) -> PredicateRule {
    rule(Absent::Fail, move |value, _| length_of(value).is_some_and(|len| len >= min))
        .message(format!("Length must be at least {min}"))
        .message_id("validation.minLength")
        .expected(min)
}

/// Requires a string or array of at most `max` characters/elements.
pub fn max_length(max: usize) -> PredicateRule {
    rule(Absent::Fail, move |value, _| length_of(value).is_some_and(|len| len <= max))
        .message(format!("Length must be at most {max}"))
        .message_id("validation.maxLength")
        .expected(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::{Context, ValidationRule};
    use serde_json::json;

    #[tokio::test]
    async fn counts_chars_not_bytes() {
        let ctx = Context::empty();
        assert!(max_length(3).validate(Some(&json!("ñññ")), &ctx).await.is_pass());
        assert!(min_length(4).validate(Some(&json!("ñññ")), &ctx).await.is_fail());
    }

    #[tokio::test]
    async fn measures_arrays() {
        let ctx = Context::empty();
        assert!(min_length(2).validate(Some(&json!([1, 2])), &ctx).await.is_pass());
        assert!(max_length(1).validate(Some(&json!([1, 2])), &ctx).await.is_fail());
    }

    #[tokio::test]
    async fn absent_and_unmeasurable_fail() {
        let ctx = Context::empty();
        let result = min_length(1).validate(None, &ctx).await;
        assert!(result.errors()[0].has_message_id(super::super::predicate::ABSENT_ID));
        assert_eq!(result.errors()[0].expected, Some(json!(1)));
        assert!(min_length(0).validate(Some(&json!(12)), &ctx).await.is_fail());
    }
}

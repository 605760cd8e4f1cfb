//! Presence validation.

use super::predicate::{Absent, PredicateRule, rule};

/// Fails on an absent value, `null`, or the empty string.
///
/// Other empty values (`[]`, `{}`, `0`, `false`) are present and pass.
///
/// # Examples
///
/// ```rust,ignore
/// use gatekeeper_validator::prelude::*;
/// use serde_json::json;
///
/// let ctx = Context::empty();
/// assert!(required().validate(Some(&json!("")), &ctx).await.is_fail());
/// assert!(required().validate(Some(&json!("x")), &ctx).await.is_pass());
/// ```
pub fn required() -> PredicateRule {
    rule(Absent::Fail, |value, _| value.as_str() != Some(""))
        .message("This field is required")
        .message_id("validation.required")
}

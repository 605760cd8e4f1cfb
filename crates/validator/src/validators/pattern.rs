//! Pattern validation

use regex::Regex;

use super::predicate::{Absent, PredicateRule, rule};

/// Requires a string matching `pattern`.
///
/// Non-string values fail. The pattern is unanchored unless it anchors
/// itself.
///
/// ```rust,ignore
/// let slug = matches(Regex::new(r"^[a-z0-9-]+$")?);
/// ```
pub fn matches(pattern: Regex) -> PredicateRule {
    let expected = pattern.as_str().to_owned();
    rule(Absent::Fail, move |value, _| {
        value.as_str().is_some_and(|s| pattern.is_match(s))
    })
    .message(format!("Value must match pattern {expected}"))
    .message_id("validation.matches")
    .expected(expected)
}

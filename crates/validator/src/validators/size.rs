//! Size and depth guards
//!
//! Cheap checks meant to run before expensive rules on untrusted input.
//! Guards pass on absent values and on values of a type they do not
//! measure; pair them with `required` or a type rule when that matters.

use serde_json::Value;

use super::predicate::{Absent, PredicateRule, rule};

fn guard(
    id: &str,
    message: String,
    limit: usize,
    within: impl Fn(&Value) -> bool + Send + Sync + 'static,
) -> PredicateRule {
    rule(Absent::Pass, move |value, _| within(value))
        .message(message)
        .message_id(format!("validation.safeSize.{id}"))
        .expected(limit)
}

/// At most `max_chars` characters in a string.
pub fn safe_size_string(max_chars: usize) -> PredicateRule {
    guard(
        "string",
        format!("String must not exceed {max_chars} characters"),
        max_chars,
        move |value| value.as_str().is_none_or(|s| s.chars().count() <= max_chars),
    )
}

/// At most `max_items` elements in an array.
pub fn safe_size_array(max_items: usize) -> PredicateRule {
    guard(
        "array",
        format!("Array must not exceed {max_items} items"),
        max_items,
        move |value| value.as_array().is_none_or(|items| items.len() <= max_items),
    )
}

/// At most `max_keys` keys in an object.
pub fn safe_size_object(max_keys: usize) -> PredicateRule {
    guard(
        "object",
        format!("Object must not exceed {max_keys} keys"),
        max_keys,
        move |value| value.as_object().is_none_or(|map| map.len() <= max_keys),
    )
}

/// At most `max_bytes` for the serialised value, counted as two bytes per
/// character of its JSON text.
pub fn safe_size_json(max_bytes: usize) -> PredicateRule {
    guard(
        "json",
        format!("Value must not exceed {max_bytes} bytes"),
        max_bytes,
        move |value| value.to_string().chars().count().saturating_mul(2) <= max_bytes,
    )
}

/// At most `max_depth` levels of array/object nesting. Scalars have depth 0.
pub fn safe_depth(max_depth: usize) -> PredicateRule {
    rule(Absent::Pass, move |value, _| !exceeds(value, max_depth))
        .message(format!("Value must not be nested deeper than {max_depth} levels"))
        .message_id("validation.safeDepth")
        .expected(max_depth)
}

/// Whether `value` nests deeper than `budget`. Stops descending as soon as
/// the budget is spent.
fn exceeds(value: &Value, budget: usize) -> bool {
    let mut children: Box<dyn Iterator<Item = &Value>> = match value {
        Value::Array(items) => Box::new(items.iter()),
        Value::Object(map) => Box::new(map.values()),
        _ => return false,
    };
    match budget.checked_sub(1) {
        None => true,
        Some(rest) => children.any(|child| exceeds(child, rest)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::{Context, ValidationRule};
    use serde_json::json;

    #[tokio::test]
    async fn guards_ignore_absent_and_foreign_types() {
        let ctx = Context::empty();
        assert!(safe_size_string(1).validate(None, &ctx).await.is_pass());
        assert!(safe_size_string(1).validate(Some(&json!(12345)), &ctx).await.is_pass());
        assert!(safe_size_array(1).validate(Some(&json!("long string")), &ctx).await.is_pass());
    }

    #[tokio::test]
    async fn sizes_are_enforced() {
        let ctx = Context::empty();
        assert!(safe_size_string(3).validate(Some(&json!("abcd")), &ctx).await.is_fail());
        assert!(safe_size_array(2).validate(Some(&json!([1, 2, 3])), &ctx).await.is_fail());
        assert!(safe_size_object(1).validate(Some(&json!({"a": 1, "b": 2})), &ctx).await.is_fail());

        // `"ab"` serialises to 4 characters
        assert!(safe_size_json(8).validate(Some(&json!("ab")), &ctx).await.is_pass());
        let result = safe_size_json(7).validate(Some(&json!("ab")), &ctx).await;
        assert_eq!(result.errors()[0].message_id(), Some("validation.safeSize.json"));
    }

    #[test]
    fn depth_measurement() {
        assert!(!exceeds(&json!(1), 0));
        assert!(exceeds(&json!([]), 0));
        assert!(!exceeds(&json!({"a": [1]}), 2));
        assert!(exceeds(&json!({"a": [[1]]}), 2));
    }

    #[tokio::test]
    async fn depth_guard() {
        let ctx = Context::empty();
        let nested = json!({"a": {"b": {"c": {"d": 1}}}});
        assert!(safe_depth(4).validate(Some(&nested), &ctx).await.is_pass());
        assert!(safe_depth(3).validate(Some(&nested), &ctx).await.is_fail());
    }
}

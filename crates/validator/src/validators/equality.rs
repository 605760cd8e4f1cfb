//! Equality and set-membership validators

use serde_json::Value;

use super::predicate::{Absent, PredicateRule, rule};

/// JSON equality where numbers compare by value (`1 == 1.0`).
pub(crate) fn same(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Requires the value to equal `expected`.
pub fn equals(expected: impl Into<Value>) -> PredicateRule {
    let expected = expected.into();
    let target = expected.clone();
    rule(Absent::Fail, move |value, _| same(value, &target))
        .message(format!("Value must equal {expected}"))
        .message_id("validation.equals")
        .expected(expected)
}

/// Requires the value to differ from `forbidden`.
pub fn not_equals(forbidden: impl Into<Value>) -> PredicateRule {
    let forbidden = forbidden.into();
    let target = forbidden.clone();
    rule(Absent::Fail, move |value, _| !same(value, &target))
        .message(format!("Value must not equal {forbidden}"))
        .message_id("validation.notEquals")
        .expected(forbidden)
}

/// Requires the value to be one of `options`.
pub fn one_of<I, V>(options: I) -> PredicateRule
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let options: Vec<Value> = options.into_iter().map(Into::into).collect();
    let listed = Value::Array(options.clone());
    rule(Absent::Fail, move |value, _| options.iter().any(|o| same(value, o)))
        .message(format!("Value must be one of {listed}"))
        .message_id("validation.oneOf")
        .expected(listed)
}

/// Requires the value to be none of `options`.
pub fn not_one_of<I, V>(options: I) -> PredicateRule
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let options: Vec<Value> = options.into_iter().map(Into::into).collect();
    let listed = Value::Array(options.clone());
    rule(Absent::Fail, move |value, _| !options.iter().any(|o| same(value, o)))
        .message(format!("Value must not be one of {listed}"))
        .message_id("validation.notOneOf")
        .expected(listed)
}

//! Numeric range validators
//!
//! Bounds are inclusive. Only JSON numbers are in range; strings holding
//! digits are not coerced.

use serde_json::{Number, Value};

use super::predicate::{Absent, PredicateRule, rule};

/// Renders a bound as JSON, keeping integral bounds integral.
pub(crate) fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

fn bound_text(n: f64) -> String {
    number_value(n).to_string()
}

/// Requires a number `>= min`.
pub fn min(min: impl Into<f64>) -> PredicateRule {
    let min = min.into();
    rule(Absent::Fail, move |value, _| value.as_f64().is_some_and(|n| n >= min))
        .message(format!("Value must be at least {}", bound_text(min)))
        .message_id("validation.min")
        .expected(number_value(min))
}

/// Requires a number `<= max`.
pub fn max(max: impl Into<f64>) -> PredicateRule {
    let max = max.into();
    rule(Absent::Fail, move |value, _| value.as_f64().is_some_and(|n| n <= max))
        .message(format!("Value must be at most {}", bound_text(max)))
        .message_id("validation.max")
        .expected(number_value(max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::{Context, ValidationRule};
    use serde_json::json;

    #[tokio::test]
    async fn bounds_are_inclusive() {
        let ctx = Context::empty();
        assert!(min(18).validate(Some(&json!(18)), &ctx).await.is_pass());
        assert!(max(18).validate(Some(&json!(18)), &ctx).await.is_pass());
        assert!(max(18).validate(Some(&json!(18.5)), &ctx).await.is_fail());
    }

    #[tokio::test]
    async fn below_minimum_reports_diagnostics() {
        let result = min(18).validate(Some(&json!(16)), &Context::empty()).await;
        let error = &result.errors()[0];
        assert_eq!(error.message, "Value must be at least 18");
        assert_eq!(error.message_id(), Some("validation.min"));
        assert_eq!(error.expected, Some(json!(18)));
        assert_eq!(error.received, Some(json!(16)));
    }

    #[tokio::test]
    async fn strings_are_not_numbers() {
        let result = min(1).validate(Some(&json!("5")), &Context::empty()).await;
        assert!(result.is_fail());
    }

    #[test]
    fn fractional_bounds_render_as_floats() {
        assert_eq!(number_value(2.5), json!(2.5));
        assert_eq!(number_value(-3.0), json!(-3));
    }
}

//! Content format validators

use std::sync::LazyLock;

use regex::Regex;

use super::predicate::{Absent, PredicateRule, rule};

pub(crate) static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap()
});

/// Returns true if `s` looks like an email address.
pub(crate) fn is_email_address(s: &str) -> bool {
    s.len() <= 254 && EMAIL_REGEX.is_match(s)
}

/// Requires a string shaped like an email address.
pub fn email() -> PredicateRule {
    rule(Absent::Fail, |value, _| value.as_str().is_some_and(is_email_address))
        .message("Invalid email address")
        .message_id("validation.email")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::{Context, ValidationRule};
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[case(json!("user@example.com"), true)]
    #[case(json!("first.last+tag@sub.example.org"), true)]
    #[case(json!("no-at-sign"), false)]
    #[case(json!("user@"), false)]
    #[case(json!("@example.com"), false)]
    #[case(json!(42), false)]
    #[tokio::test]
    async fn email_cases(#[case] value: Value, #[case] pass: bool) {
        let result = email().validate(Some(&value), &Context::empty()).await;
        assert_eq!(result.is_pass(), pass);
    }
}

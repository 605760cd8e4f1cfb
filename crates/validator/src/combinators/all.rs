//! ALL_OF combinator - every rule must pass

use async_trait::async_trait;
use serde_json::Value;

use crate::foundation::{Context, RuleExt, SharedRule, ValidationResult, ValidationRule};

/// Runs every rule in order and merges their findings.
///
/// All rules run even after one fails, so a field reports every violated
/// constraint at once.
#[derive(Debug, Clone, Default)]
pub struct AllOf {
    rules: Vec<SharedRule>,
}

impl AllOf {
    pub fn new(rules: Vec<SharedRule>) -> Self {
        Self { rules }
    }

    /// Appends another rule.
    #[must_use = "builder methods must be chained or built"]
    pub fn and<R: ValidationRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(rule.shared());
        self
    }

    pub fn rules(&self) -> &[SharedRule] {
        &self.rules
    }
}

#[async_trait]
impl ValidationRule for AllOf {
    async fn validate(&self, value: Option<&Value>, ctx: &Context<'_>) -> ValidationResult {
        let mut errors = Vec::new();
        for rule in &self.rules {
            errors.extend(rule.validate(value, ctx).await.into_errors());
        }
        ValidationResult::from_errors(errors)
    }
}

/// Combines rules into one that requires all of them.
pub fn all_of(rules: impl IntoIterator<Item = SharedRule>) -> AllOf {
    AllOf::new(rules.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::{max_length, min_length, matches};
    use regex::Regex;
    use serde_json::json;

    #[tokio::test]
    async fn collects_every_failure() {
        let rule = min_length(5).and(matches(Regex::new("^[a-z]+$").unwrap()));
        let result = rule.validate(Some(&json!("AB")), &Context::empty()).await;

        let ids: Vec<_> = result.errors().iter().filter_map(|e| e.message_id()).collect();
        assert_eq!(ids, ["validation.minLength", "validation.matches"]);
    }

    #[tokio::test]
    async fn empty_passes() {
        assert!(all_of([]).validate(None, &Context::empty()).await.is_pass());
        let chained = AllOf::default().and(min_length(1)).and(max_length(3));
        assert!(chained.validate(Some(&json!("ok")), &Context::empty()).await.is_pass());
    }
}

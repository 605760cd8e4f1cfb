//! OPTIONAL combinator - absent values pass
//!
//! Catalog rules fail on absent values. Wrapping a rule in [`Optional`]
//! turns "absent" into a pass while still validating present values.

use async_trait::async_trait;
use serde_json::Value;

use crate::foundation::{Context, RuleExt, SharedRule, ValidationResult, ValidationRule, present};

/// Passes on an absent (or `null`) value, otherwise delegates.
#[derive(Debug, Clone)]
pub struct Optional {
    inner: SharedRule,
}

impl Optional {
    pub fn new(inner: SharedRule) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &SharedRule {
        &self.inner
    }
}

#[async_trait]
impl ValidationRule for Optional {
    async fn validate(&self, value: Option<&Value>, ctx: &Context<'_>) -> ValidationResult {
        match present(value) {
            None => ValidationResult::passed(),
            Some(value) => self.inner.validate(Some(value), ctx).await,
        }
    }
}

/// Makes `rule` accept absent values.
pub fn optional<R: ValidationRule + 'static>(rule: R) -> Optional {
    Optional::new(rule.shared())
}

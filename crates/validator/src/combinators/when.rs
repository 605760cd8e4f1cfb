//! WHEN combinator - conditional validation
//!
//! A [`ConditionalRule`] pairs a rule with an optional [`Condition`]. The
//! schema validator evaluates the condition against its named-condition
//! table and runs the rule only when it holds; with no condition the rule
//! always applies.
//!
//! # Examples
//!
//! ```rust,ignore
//! use gatekeeper_validator::prelude::*;
//!
//! let vat_number = when(required(), "isBusiness");
//! let discount = when_all(max(50), ["isMember", "isAdult"]);
//! let guardian = when_not(required(), "isAdult");
//! ```

use async_trait::async_trait;
use serde_json::Value;

use super::condition::{Condition, NamedConditions};
use crate::foundation::{Context, RuleExt, SharedRule, ValidationResult, ValidationRule};

/// A rule applied only when its condition holds.
#[derive(Debug, Clone)]
pub struct ConditionalRule {
    rule: SharedRule,
    when: Option<Condition>,
}

impl ConditionalRule {
    /// Creates a conditional rule. `None` means "always applies".
    pub fn new(rule: SharedRule, when: Option<Condition>) -> Self {
        Self { rule, when }
    }

    /// A conditional rule with no condition.
    pub fn always(rule: SharedRule) -> Self {
        Self::new(rule, None)
    }

    /// The wrapped rule.
    pub fn rule(&self) -> &SharedRule {
        &self.rule
    }

    /// The condition, if any.
    pub fn condition(&self) -> Option<&Condition> {
        self.when.as_ref()
    }

    /// Whether the rule applies to `value` given the named-condition table.
    pub fn applies(&self, value: Option<&Value>, ctx: &Context<'_>, named: &NamedConditions) -> bool {
        self.when.as_ref().is_none_or(|c| c.evaluate(value, ctx, named))
    }

    /// Evaluates the condition and, when it holds, the rule.
    pub async fn validate_with(
        &self,
        value: Option<&Value>,
        ctx: &Context<'_>,
        named: &NamedConditions,
    ) -> ValidationResult {
        if self.applies(value, ctx, named) {
            self.rule.validate(value, ctx).await
        } else {
            ValidationResult::passed()
        }
    }
}

/// Named conditions resolve against the table of the schema being run.
/// Outside a schema there is no table, so they evaluate to `false`.
#[async_trait]
impl ValidationRule for ConditionalRule {
    async fn validate(&self, value: Option<&Value>, ctx: &Context<'_>) -> ValidationResult {
        match ctx.conditions() {
            Some(named) => self.validate_with(value, ctx, named).await,
            None => self.validate_with(value, ctx, &NamedConditions::new()).await,
        }
    }
}

/// Applies `rule` when `condition` holds.
pub fn when<R: ValidationRule + 'static>(rule: R, condition: impl Into<Condition>) -> ConditionalRule {
    ConditionalRule::new(rule.shared(), Some(condition.into()))
}

/// Applies `rule` when every condition holds.
pub fn when_all<R, I>(rule: R, conditions: I) -> ConditionalRule
where
    R: ValidationRule + 'static,
    I: IntoIterator,
    I::Item: Into<Condition>,
{
    ConditionalRule::new(rule.shared(), Some(Condition::all(conditions)))
}

/// Applies `rule` when at least one condition holds.
pub fn when_any<R, I>(rule: R, conditions: I) -> ConditionalRule
where
    R: ValidationRule + 'static,
    I: IntoIterator,
    I::Item: Into<Condition>,
{
    ConditionalRule::new(rule.shared(), Some(Condition::any(conditions)))
}

/// Applies `rule` when `condition` does not hold.
pub fn when_not<R: ValidationRule + 'static>(rule: R, condition: impl Into<Condition>) -> ConditionalRule {
    ConditionalRule::new(rule.shared(), Some(Condition::not(condition)))
}

//! Predicate-backed rules.
//!
//! [`rule`], [`try_rule`] and [`async_rule`] adapt plain predicates into a
//! [`ValidationRule`]. Every predicate rule declares up front how it treats
//! an absent value through [`Absent`]; the predicate itself only ever sees
//! present values.

use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::foundation::{Context, ValidationError, ValidationResult, ValidationRule, present};

/// Message reported when a predicate itself fails.
pub const EVALUATION_FAILED_MESSAGE: &str = "Validation error occurred";

/// Message id reported when a predicate itself fails.
pub const EVALUATION_FAILED_ID: &str = "validation.error";

/// Secondary message id attached when a rule fails because the value is absent.
pub const ABSENT_ID: &str = "validation.absent";

/// An error raised while evaluating a predicate.
pub type RuleFault = Box<dyn std::error::Error + Send + Sync>;

type CheckFn = Arc<dyn Fn(&Value, &Context<'_>) -> Result<bool, RuleFault> + Send + Sync>;
type AsyncCheckFn = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<bool, RuleFault>> + Send + Sync>;

/// How a rule treats a missing (or `null`) value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Absent {
    /// An absent value fails the rule.
    Fail,
    /// An absent value passes the rule vacuously.
    Pass,
}

#[derive(Clone)]
enum Check {
    Sync(CheckFn),
    Async(AsyncCheckFn),
}

/// A rule built from a predicate plus message options.
///
/// # Examples
///
/// ```rust,ignore
/// use gatekeeper_validator::validators::{Absent, rule};
///
/// let even = rule(Absent::Fail, |v, _| v.as_i64().is_some_and(|n| n % 2 == 0))
///     .message("Must be even")
///     .message_id("validation.even");
/// ```
#[derive(Clone)]
pub struct PredicateRule {
    check: Check,
    absent: Absent,
    message: String,
    message_id: String,
    expected: Option<Value>,
}

impl PredicateRule {
    fn with_check(absent: Absent, check: Check) -> Self {
        Self {
            check,
            absent,
            message: "Validation failed".to_owned(),
            message_id: "validation.rule".to_owned(),
            expected: None,
        }
    }

    /// Replaces the failure message.
    #[must_use = "builder methods must be chained or built"]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Replaces the message id.
    #[must_use = "builder methods must be chained or built"]
    pub fn message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = id.into();
        self
    }

    /// Sets the `expected` diagnostic reported on failure.
    #[must_use = "builder methods must be chained or built"]
    pub fn expected(mut self, expected: impl Into<Value>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// How this rule treats an absent value.
    #[must_use]
    pub const fn absent_policy(&self) -> Absent {
        self.absent
    }

    /// The current message id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.message_id
    }

    fn error(&self) -> ValidationError {
        let error = ValidationError::new(self.message.clone()).with_message_id(self.message_id.clone());
        match &self.expected {
            Some(expected) => error.with_expected(expected.clone()),
            None => error,
        }
    }
}

impl std::fmt::Debug for PredicateRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredicateRule")
            .field("absent", &self.absent)
            .field("message", &self.message)
            .field("message_id", &self.message_id)
            .field("expected", &self.expected)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ValidationRule for PredicateRule {
    async fn validate(&self, value: Option<&Value>, ctx: &Context<'_>) -> ValidationResult {
        let Some(value) = present(value) else {
            return match self.absent {
                Absent::Pass => ValidationResult::passed(),
                Absent::Fail => ValidationResult::fail(self.error().with_message_id(ABSENT_ID)),
            };
        };

        let outcome = match &self.check {
            Check::Sync(check) => check(value, ctx),
            Check::Async(check) => check(value.clone()).await,
        };

        match outcome {
            Ok(true) => ValidationResult::passed(),
            Ok(false) => ValidationResult::fail(self.error().with_received(value.clone())),
            Err(fault) => {
                tracing::warn!(message_id = %self.message_id, error = %fault, "rule evaluation failed");
                ValidationResult::fail(
                    ValidationError::new(EVALUATION_FAILED_MESSAGE)
                        .with_message_id(EVALUATION_FAILED_ID)
                        .with_message_id(self.message_id.clone())
                        .with_received(value.clone()),
                )
            }
        }
    }
}

/// Adapts a boolean predicate into a rule.
pub fn rule<F>(absent: Absent, predicate: F) -> PredicateRule
where
    F: Fn(&Value, &Context<'_>) -> bool + Send + Sync + 'static,
{
    let check: CheckFn = Arc::new(move |value: &Value, ctx: &Context<'_>| Ok(predicate(value, ctx)));
    PredicateRule::with_check(absent, Check::Sync(check))
}

/// Adapts a fallible predicate into a rule. An `Err` becomes a failed result
/// with message [`EVALUATION_FAILED_MESSAGE`] and is never propagated.
pub fn try_rule<F>(absent: Absent, predicate: F) -> PredicateRule
where
    F: Fn(&Value, &Context<'_>) -> Result<bool, RuleFault> + Send + Sync + 'static,
{
    PredicateRule::with_check(absent, Check::Sync(Arc::new(predicate)))
}

/// Adapts an asynchronous predicate into a rule.
///
/// The predicate receives an owned copy of the value so the future can
/// outlive the validation borrow (a database round trip, for example).
pub fn async_rule<F, Fut>(absent: Absent, predicate: F) -> PredicateRule
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<bool, RuleFault>> + Send + 'static,
{
    let check: AsyncCheckFn = Arc::new(move |value| predicate(value).boxed());
    PredicateRule::with_check(absent, Check::Async(check))
}

/// A caller-supplied predicate with the `validation.custom` id.
///
/// Absent values fail without reaching the predicate; wrap the rule in
/// `optional` to let them through.
pub fn custom<F>(predicate: F) -> PredicateRule
where
    F: Fn(&Value, &Context<'_>) -> bool + Send + Sync + 'static,
{
    rule(Absent::Fail, predicate)
        .message("Custom validation failed")
        .message_id("validation.custom")
}

/// Rules whose own failure message can be overridden after construction.
///
/// Used by the rule compiler to apply a description's sibling
/// `message`/`messageId` keys uniformly.
pub trait MessageOverride: Sized {
    /// Replaces the message and/or message id when given.
    #[must_use]
    fn override_message(self, message: Option<String>, message_id: Option<String>) -> Self;
}

impl MessageOverride for PredicateRule {
    fn override_message(mut self, message: Option<String>, message_id: Option<String>) -> Self {
        if let Some(message) = message {
            self.message = message;
        }
        if let Some(id) = message_id {
            self.message_id = id;
        }
        self
    }
}

//! Core traits for the validation system
//!
//! [`ValidationRule`] is the one capability every check implements; the
//! conditional, nested, collection and dependency rules are all rules that
//! wrap other rules.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{Context, ValidationResult};
use crate::combinators::{AllOf, Condition, ConditionalRule, Optional};

// ============================================================================
// CORE RULE TRAIT
// ============================================================================

/// The atomic validation capability.
///
/// A rule receives the value under validation (`None` when absent) and the
/// validation context, and produces a [`ValidationResult`]. Rules may be
/// asynchronous (a uniqueness check backed by a database, for example), but
/// a schema run awaits them strictly in field-declaration order.
///
/// # Examples
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use gatekeeper_validator::prelude::*;
/// use serde_json::Value;
///
/// struct Even;
///
/// #[async_trait]
/// impl ValidationRule for Even {
///     async fn validate(&self, value: Option<&Value>, _ctx: &Context<'_>) -> ValidationResult {
///         match value.and_then(Value::as_i64) {
///             Some(n) if n % 2 == 0 => ValidationResult::passed(),
///             _ => ValidationResult::fail(ValidationError::new("Must be even")),
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait ValidationRule: Send + Sync {
    /// Validates `value` within `ctx`.
    async fn validate(&self, value: Option<&Value>, ctx: &Context<'_>) -> ValidationResult;
}

/// A type-erased, shareable rule.
pub type SharedRule = Arc<dyn ValidationRule>;

impl std::fmt::Debug for dyn ValidationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn ValidationRule")
    }
}

#[async_trait]
impl<R: ValidationRule + ?Sized> ValidationRule for Arc<R> {
    async fn validate(&self, value: Option<&Value>, ctx: &Context<'_>) -> ValidationResult {
        (**self).validate(value, ctx).await
    }
}

#[async_trait]
impl<R: ValidationRule + ?Sized> ValidationRule for Box<R> {
    async fn validate(&self, value: Option<&Value>, ctx: &Context<'_>) -> ValidationResult {
        (**self).validate(value, ctx).await
    }
}

// ============================================================================
// RULE EXTENSION TRAIT
// ============================================================================

/// Fluent composition helpers, implemented for every sized rule.
///
/// ```rust,ignore
/// use gatekeeper_validator::prelude::*;
///
/// let nickname = min_length(3).and(max_length(20)).optional();
/// let vat = required().when("isBusiness");
/// ```
pub trait RuleExt: ValidationRule + Sized + 'static {
    /// Erases the rule's type.
    fn shared(self) -> SharedRule {
        Arc::new(self)
    }

    /// Both rules must pass; findings of both are reported.
    fn and<R: ValidationRule + 'static>(self, other: R) -> AllOf {
        AllOf::new(vec![self.shared(), other.shared()])
    }

    /// Passes on an absent value, otherwise delegates.
    fn optional(self) -> Optional {
        Optional::new(self.shared())
    }

    /// Applies the rule only when `condition` holds.
    fn when(self, condition: impl Into<Condition>) -> ConditionalRule {
        ConditionalRule::new(self.shared(), Some(condition.into()))
    }
}

impl<R: ValidationRule + 'static> RuleExt for R {}

//! Conditions - predicates that decide whether a rule applies
//!
//! A [`Condition`] is either a reference to a named predicate (resolved
//! against the schema's condition table at validation time), an inline
//! predicate, or a boolean composition of other conditions.
//!
//! # Examples
//!
//! ```rust,ignore
//! use gatekeeper_validator::combinators::Condition;
//!
//! let adult_business = Condition::all([
//!     Condition::named("isAdult"),
//!     Condition::predicate(|_, ctx| {
//!         ctx.lookup("accountType").and_then(|v| v.as_str()) == Some("business")
//!     }),
//! ]);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::foundation::Context;

/// A condition predicate: receives the value under validation and the context.
pub type ConditionFn = Arc<dyn Fn(Option<&Value>, &Context<'_>) -> bool + Send + Sync>;

/// A schema's table of named conditions.
pub type NamedConditions = HashMap<String, ConditionFn>;

/// Whether a conditional rule applies.
#[derive(Clone)]
pub enum Condition {
    /// Looked up by name in the schema's condition table.
    Named(String),
    /// Evaluated directly.
    Predicate(ConditionFn),
    /// Every condition holds. Stops at the first that does not.
    All(Vec<Condition>),
    /// At least one condition holds. Stops at the first that does.
    Any(Vec<Condition>),
    /// The inner condition does not hold.
    Not(Box<Condition>),
}

impl Condition {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(Option<&Value>, &Context<'_>) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    pub fn all(conditions: impl IntoIterator<Item = impl Into<Self>>) -> Self {
        Self::All(conditions.into_iter().map(Into::into).collect())
    }

    pub fn any(conditions: impl IntoIterator<Item = impl Into<Self>>) -> Self {
        Self::Any(conditions.into_iter().map(Into::into).collect())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(condition: impl Into<Self>) -> Self {
        Self::Not(Box::new(condition.into()))
    }

    /// Evaluates the condition.
    ///
    /// A name missing from `named` logs a warning and evaluates to `false`,
    /// so the rule it guards is skipped.
    pub fn evaluate(&self, value: Option<&Value>, ctx: &Context<'_>, named: &NamedConditions) -> bool {
        match self {
            Self::Named(name) => match named.get(name) {
                Some(predicate) => predicate(value, ctx),
                None => {
                    tracing::warn!(condition = %name, "named condition not found; rule skipped");
                    false
                }
            },
            Self::Predicate(predicate) => predicate(value, ctx),
            Self::All(conditions) => conditions.iter().all(|c| c.evaluate(value, ctx, named)),
            Self::Any(conditions) => conditions.iter().any(|c| c.evaluate(value, ctx, named)),
            Self::Not(condition) => !condition.evaluate(value, ctx, named),
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
            Self::All(conditions) => f.debug_tuple("All").field(conditions).finish(),
            Self::Any(conditions) => f.debug_tuple("Any").field(conditions).finish(),
            Self::Not(condition) => f.debug_tuple("Not").field(condition).finish(),
        }
    }
}

impl From<&str> for Condition {
    fn from(name: &str) -> Self {
        Self::Named(name.to_owned())
    }
}

impl From<String> for Condition {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<ConditionFn> for Condition {
    fn from(predicate: ConditionFn) -> Self {
        Self::Predicate(predicate)
    }
}

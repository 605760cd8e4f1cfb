//! The schema validator
//!
//! A [`ValidationSchema`] maps field names to rules (in declaration order)
//! and carries a table of named conditions. [`validate`] walks the fields,
//! evaluates conditional rules against the full data object, prefixes every
//! finding with its field name, and finally applies message overrides and
//! terse stripping from [`ValidateOptions`].
//!
//! # Examples
//!
//! ```rust,ignore
//! use gatekeeper_validator::prelude::*;
//! use serde_json::json;
//!
//! let schema = ValidationSchema::new()
//!     .condition("isAdult", |_, ctx| {
//!         ctx.lookup("age").and_then(|v| v.as_u64()).is_some_and(|age| age >= 18)
//!     })
//!     .field("name", required())
//!     .field("age", min(0))
//!     .conditional("licence", when(required(), "isAdult"));
//!
//! let result = validate(Some(&json!({"name": "Ada", "age": 30})), Some(&schema), None, &Default::default()).await;
//! assert!(result.is_fail()); // licence is required for adults
//! ```

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, trace};

use crate::combinators::{ConditionFn, ConditionalRule, NamedConditions};
use crate::foundation::{
    Context, RuleExt, SharedRule, ValidationError, ValidationResult, ValidationRule,
};
use crate::options::ValidateOptions;

/// The rule configured for one field.
#[derive(Debug, Clone)]
pub enum FieldRule {
    /// Always applied.
    Rule(SharedRule),
    /// Applied when its condition holds.
    Conditional(ConditionalRule),
}

impl From<SharedRule> for FieldRule {
    fn from(rule: SharedRule) -> Self {
        Self::Rule(rule)
    }
}

impl From<ConditionalRule> for FieldRule {
    fn from(rule: ConditionalRule) -> Self {
        Self::Conditional(rule)
    }
}

/// Field rules plus named conditions.
#[derive(Clone, Default)]
pub struct ValidationSchema {
    fields: IndexMap<String, FieldRule>,
    conditions: NamedConditions,
}

impl ValidationSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) an unconditional field rule.
    #[must_use = "builder methods must be chained or built"]
    pub fn field<R: ValidationRule + 'static>(mut self, name: impl Into<String>, rule: R) -> Self {
        self.insert_field(name, FieldRule::Rule(rule.shared()));
        self
    }

    /// Adds (or replaces) a conditional field rule.
    #[must_use = "builder methods must be chained or built"]
    pub fn conditional(mut self, name: impl Into<String>, rule: ConditionalRule) -> Self {
        self.insert_field(name, FieldRule::Conditional(rule));
        self
    }

    /// Registers a named condition for this schema's conditional rules.
    #[must_use = "builder methods must be chained or built"]
    pub fn condition<F>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(Option<&Value>, &Context<'_>) -> bool + Send + Sync + 'static,
    {
        self.insert_condition(name, Arc::new(predicate));
        self
    }

    pub fn insert_field(&mut self, name: impl Into<String>, rule: FieldRule) {
        self.fields.insert(name.into(), rule);
    }

    pub fn insert_condition(&mut self, name: impl Into<String>, predicate: ConditionFn) {
        self.conditions.insert(name.into(), predicate);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &IndexMap<String, FieldRule> {
        &self.fields
    }

    pub fn conditions(&self) -> &NamedConditions {
        &self.conditions
    }
}

impl fmt::Debug for ValidationSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.conditions.keys().collect();
        names.sort();
        f.debug_struct("ValidationSchema")
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("conditions", &names)
            .finish()
    }
}

/// Runs `schema` over `data` and returns the raw findings, path-prefixed
/// and field-stamped, without overrides or stripping.
pub(crate) async fn collect(
    data: Option<&Value>,
    schema: &ValidationSchema,
    context: Option<&Value>,
    collect_errors: bool,
) -> Vec<ValidationError> {
    let mut ctx = Context::new(context).with_conditions(&schema.conditions);
    if let Some(data) = data {
        ctx = ctx.with_parent(data);
    }

    let mut errors = Vec::new();
    for (name, field_rule) in &schema.fields {
        let value = data.and_then(|d| d.get(name));
        let result = match field_rule {
            FieldRule::Rule(rule) => rule.validate(value, &ctx).await,
            FieldRule::Conditional(rule) => {
                if !rule.applies(value, &ctx, &schema.conditions) {
                    trace!(field = %name, "condition false; field skipped");
                    continue;
                }
                rule.rule().validate(value, &ctx).await
            }
        };

        if result.is_pass() {
            continue;
        }
        trace!(field = %name, "field failed");
        errors.extend(
            result
                .into_errors()
                .into_iter()
                .map(|e| e.prefixed(name.as_str()).with_field(name.as_str())),
        );
        if !collect_errors {
            break;
        }
    }
    errors
}

/// Validates `data` against `schema`.
///
/// An undefined or empty schema passes. `context` is the caller's own
/// context value; rules see it through [`Context::caller`], while the data
/// object itself is exposed as [`Context::parent`].
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(fields = schema.map_or(0, ValidationSchema::len), failed = tracing::field::Empty)
)]
pub async fn validate(
    data: Option<&Value>,
    schema: Option<&ValidationSchema>,
    context: Option<&Value>,
    options: &ValidateOptions,
) -> ValidationResult {
    let Some(schema) = schema.filter(|s| !s.is_empty()) else {
        return ValidationResult::passed();
    };

    let errors = collect(data, schema, context, options.collect_errors).await;
    tracing::Span::current().record("failed", errors.len());
    if !errors.is_empty() {
        debug!(errors = errors.len(), "schema validation failed");
    }
    ValidationResult::from_errors(options.shape(errors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::when;
    use crate::validators::{min, min_length, required};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn person() -> ValidationSchema {
        ValidationSchema::new()
            .field("name", required())
            .field("age", min(18))
            .field("nickname", min_length(3).optional())
    }

    #[tokio::test]
    async fn undefined_and_empty_schemas_pass() {
        let data = json!({"anything": 1});
        let options = ValidateOptions::default();
        assert!(validate(Some(&data), None, None, &options).await.is_pass());
        assert!(validate(Some(&data), Some(&ValidationSchema::new()), None, &options).await.is_pass());
    }

    #[tokio::test]
    async fn errors_follow_declaration_order() {
        let data = json!({"nickname": "x", "age": 3});
        let result = validate(Some(&data), Some(&person()), None, &ValidateOptions::default()).await;

        let fields: Vec<_> = result.errors().iter().map(|e| e.field.clone().unwrap()).collect();
        assert_eq!(fields, ["name", "age", "nickname"]);
        assert_eq!(result.errors()[1].path, ["age"]);
    }

    #[tokio::test]
    async fn fail_fast_stops_at_first_field() {
        let data = json!({"age": 3});
        let result = validate(Some(&data), Some(&person()), None, &ValidateOptions::fail_fast()).await;
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].field.as_deref(), Some("name"));
    }

    #[tokio::test]
    async fn conditions_see_the_whole_object() {
        let schema = ValidationSchema::new()
            .condition("isBusiness", |_, ctx| {
                ctx.lookup("type").and_then(Value::as_str) == Some("business")
            })
            .conditional("vat", when(required(), "isBusiness"));

        let options = ValidateOptions::default();
        let private = json!({"type": "private"});
        assert!(validate(Some(&private), Some(&schema), None, &options).await.is_pass());

        let business = json!({"type": "business"});
        let result = validate(Some(&business), Some(&schema), None, &options).await;
        assert_eq!(result.errors()[0].path, ["vat"]);
    }

    #[tokio::test]
    async fn caller_context_is_visible() {
        let schema = ValidationSchema::new().conditional(
            "discount",
            when(
                required(),
                crate::combinators::Condition::predicate(|_, ctx| {
                    ctx.caller().and_then(|c| c.get("member")) == Some(&json!(true))
                }),
            ),
        );
        let context = json!({"member": true});
        let result = validate(Some(&json!({})), Some(&schema), Some(&context), &ValidateOptions::default()).await;
        assert!(result.is_fail());
    }

    #[tokio::test]
    async fn missing_data_validates_as_absent_fields() {
        let result = validate(None, Some(&person()), None, &ValidateOptions::default()).await;
        let fields: Vec<_> = result.errors().iter().filter_map(|e| e.field.as_deref()).collect();
        assert_eq!(fields, ["name", "age"]);
    }

    #[tokio::test]
    async fn inline_conditionals_see_named_conditions() {
        let schema = ValidationSchema::new()
            .condition("isBusiness", |_, ctx| ctx.lookup("type") == Some(&json!("business")))
            .field("vat", required().when("isBusiness"))
            .field("tags", crate::combinators::each_item(min_length(2).when("isBusiness")));

        let business = json!({"type": "business", "tags": ["x"]});
        let result = validate(Some(&business), Some(&schema), None, &ValidateOptions::default()).await;
        let paths: Vec<_> = result.errors().iter().map(|e| e.path.clone()).collect();
        assert_eq!(paths, vec![vec!["vat"], vec!["tags", "0"]]);

        let personal = json!({"type": "personal", "tags": ["x"]});
        let result = validate(Some(&personal), Some(&schema), None, &ValidateOptions::default()).await;
        assert!(result.is_pass());
    }
}

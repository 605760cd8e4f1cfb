//! Compiles rule descriptions into rules
//!
//! Every problem is reported as a [`CompileError`] at compile time: unknown
//! keys, bad parameters, invalid patterns and names that resolve to no
//! registered function. A compiled schema never silently skips a rule.

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use super::description::{ConditionDescription, RuleDescription, RuleKind, SchemaDescription};
use super::error::{CompileError, child};
use super::registry::{FunctionKind, FunctionRegistry, NamedFunction};
use crate::combinators::{
    AllOf, Condition, ConditionFn, ConditionalRule, DependencyFn, DependsOn, EachItem, Nested, ObjectValues,
    Optional,
};
use crate::foundation::{Context, RuleExt, SharedRule, ValidationResult, ValidationRule};
use crate::schema::{FieldRule, ValidationSchema};
use crate::validators::equality::same;
use crate::validators::{
    MessageOverride, PredicateRule, custom, email, equals, is_type, matches, max, max_length, min,
    min_length, not_equals, not_one_of, one_of, required, safe_depth, safe_size_array,
    safe_size_json, safe_size_object, safe_size_string, unique,
};

/// Message options inherited from an enclosing description.
#[derive(Debug, Clone, Default)]
struct Labels {
    message: Option<String>,
    message_id: Option<String>,
}

impl Labels {
    fn of(description: &RuleDescription, inherited: &Self) -> Self {
        Self {
            message: description.message.clone().or_else(|| inherited.message.clone()),
            message_id: description.message_id.clone().or_else(|| inherited.message_id.clone()),
        }
    }

    fn is_empty(&self) -> bool {
        self.message.is_none() && self.message_id.is_none()
    }

    fn apply<R: MessageOverride>(&self, rule: R) -> R {
        rule.override_message(self.message.clone(), self.message_id.clone())
    }
}

/// Condition names visible while compiling one schema: name → registered
/// predicate name.
type Scope = IndexMap<String, String>;

/// Turns descriptions into rules, resolving names through a shared
/// [`FunctionRegistry`].
///
/// # Examples
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use gatekeeper_validator::compile::{FunctionRegistry, RuleCompiler};
/// use serde_json::json;
///
/// let registry = Arc::new(FunctionRegistry::new());
/// registry.register_predicate("isAdult", |_, ctx| {
///     ctx.lookup("age").and_then(|v| v.as_u64()).is_some_and(|age| age >= 18)
/// });
///
/// let compiler = RuleCompiler::new(registry);
/// let schema = compiler.compile_schema(&json!({
///     "name": {"required": true, "maxLength": 80},
///     "licence": {"when": "isAdult", "rule": {"required": true}}
/// }))?;
/// ```
#[derive(Debug, Clone)]
pub struct RuleCompiler {
    registry: Arc<FunctionRegistry>,
}

impl RuleCompiler {
    pub fn new(registry: Arc<FunctionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<FunctionRegistry> {
        &self.registry
    }

    /// Parses and compiles one rule description.
    pub fn compile_rule(&self, description: &Value) -> Result<SharedRule, CompileError> {
        self.build_rule(&RuleDescription::parse(description)?)
    }

    /// Parses and compiles a schema description.
    pub fn compile_schema(&self, description: &Value) -> Result<ValidationSchema, CompileError> {
        self.build_schema(&SchemaDescription::parse(description)?)
    }

    /// Compiles an already parsed rule description. Condition names resolve
    /// directly against the registry.
    pub fn build_rule(&self, description: &RuleDescription) -> Result<SharedRule, CompileError> {
        self.rule_at(description, "", &Scope::new(), &Labels::default())
    }

    /// Compiles an already parsed schema description.
    pub fn build_schema(&self, description: &SchemaDescription) -> Result<ValidationSchema, CompileError> {
        self.schema_at(description, "")
    }

    fn schema_at(&self, description: &SchemaDescription, at: &str) -> Result<ValidationSchema, CompileError> {
        let scope = &description.conditions;
        let mut schema = ValidationSchema::new();

        for name in scope.keys() {
            let predicate = self.predicate(name, &child(&child(at, "conditions"), name), scope)?;
            schema.insert_condition(name.clone(), predicate);
        }

        for (name, rule) in &description.fields {
            let field_at = child(at, name);
            let field_rule = match &rule.kind {
                RuleKind::When { .. } => {
                    FieldRule::Conditional(self.conditional_at(rule, &field_at, scope, &Labels::default())?)
                }
                _ => FieldRule::Rule(self.rule_at(rule, &field_at, scope, &Labels::default())?),
            };
            schema.insert_field(name.clone(), field_rule);
        }
        Ok(schema)
    }

    fn conditional_at(
        &self,
        description: &RuleDescription,
        at: &str,
        scope: &Scope,
        inherited: &Labels,
    ) -> Result<ConditionalRule, CompileError> {
        let labels = Labels::of(description, inherited);
        match &description.kind {
            RuleKind::When { condition, rule } => {
                let condition = self.condition(condition, at, scope)?;
                let rule = self.rule_at(rule, &child(at, "rule"), scope, &labels)?;
                Ok(ConditionalRule::new(rule, Some(condition)))
            }
            _ => Ok(ConditionalRule::always(self.rule_at(description, at, scope, inherited)?)),
        }
    }

    /// Compiles one description. Errors raised by a leaf or by a
    /// collection/dependency rule itself carry its kind as rule type.
    fn rule_at(
        &self,
        description: &RuleDescription,
        at: &str,
        scope: &Scope,
        inherited: &Labels,
    ) -> Result<SharedRule, CompileError> {
        let rule = self.kind_at(description, at, scope, inherited)?;
        Ok(match &description.kind {
            RuleKind::AllOf(_) | RuleKind::Optional(_) | RuleKind::When { .. } => rule,
            kind => Typed {
                rule,
                kind: kind.name(),
            }
            .shared(),
        })
    }

    fn kind_at(
        &self,
        description: &RuleDescription,
        at: &str,
        scope: &Scope,
        inherited: &Labels,
    ) -> Result<SharedRule, CompileError> {
        let labels = Labels::of(description, inherited);
        let leaf = |rule: PredicateRule| labels.apply(rule).shared();

        Ok(match &description.kind {
            RuleKind::Required => leaf(required()),
            RuleKind::MinLength(n) => leaf(min_length(*n)),
            RuleKind::MaxLength(n) => leaf(max_length(*n)),
            RuleKind::Matches(pattern) => {
                let pattern = Regex::new(pattern).map_err(|source| CompileError::InvalidPattern {
                    at: child(at, "matches"),
                    source,
                })?;
                leaf(matches(pattern))
            }
            RuleKind::Email => leaf(email()),
            RuleKind::Equals(v) => leaf(equals(v.clone())),
            RuleKind::NotEquals(v) => leaf(not_equals(v.clone())),
            RuleKind::Min(n) => leaf(min(*n)),
            RuleKind::Max(n) => leaf(max(*n)),
            RuleKind::OneOf(options) => leaf(one_of(options.iter().cloned())),
            RuleKind::NotOneOf(options) => leaf(not_one_of(options.iter().cloned())),
            RuleKind::Custom(name) => self.custom(name, &child(at, "custom"), &labels)?,
            RuleKind::DataType(kind) => leaf(is_type(*kind)),
            RuleKind::Unique => leaf(unique()),
            RuleKind::SafeSizeString(n) => leaf(safe_size_string(*n)),
            RuleKind::SafeSizeArray(n) => leaf(safe_size_array(*n)),
            RuleKind::SafeSizeObject(n) => leaf(safe_size_object(*n)),
            RuleKind::SafeSizeJson(n) => leaf(safe_size_json(*n)),
            RuleKind::SafeDepth(n) => leaf(safe_depth(*n)),
            RuleKind::AllOf(items) => {
                let rules = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.rule_at(item, &child(at, &i.to_string()), scope, &labels))
                    .collect::<Result<Vec<_>, _>>()?;
                AllOf::new(rules).shared()
            }
            RuleKind::Optional(inner) => {
                Optional::new(self.rule_at(inner, &child(at, "optional"), scope, &labels)?).shared()
            }
            RuleKind::When { .. } => self.conditional_at(description, at, scope, inherited)?.shared(),
            RuleKind::Nested { path, schema, options } => {
                let schema = self.schema_at(schema, &child(at, "schema"))?;
                labels
                    .apply(Nested::new(path.clone(), schema))
                    .required(options.required.unwrap_or(true))
                    .shared()
            }
            RuleKind::EachItem { rule, options } => {
                let inner = self.rule_at(rule, &child(at, "eachItem"), scope, &Labels::default())?;
                labels
                    .apply(EachItem::new(inner))
                    .required(options.required.unwrap_or(true))
                    .stop_on_first_error(options.stop_on_first_error.unwrap_or(false))
                    .shared()
            }
            RuleKind::ObjectValues { rule, options } => {
                let inner = self.rule_at(rule, &child(at, "objectValues"), scope, &Labels::default())?;
                labels
                    .apply(ObjectValues::new(inner))
                    .required(options.required.unwrap_or(true))
                    .stop_on_first_error(options.stop_on_first_error.unwrap_or(false))
                    .shared()
            }
            RuleKind::DependsOn { path, condition, options } => {
                let predicate = self.dependency(condition, &child(at, "condition"))?;
                let rule = labels.apply(DependsOn::new(path.clone(), predicate));
                if options.required == Some(false) {
                    Optional::new(rule.shared()).shared()
                } else {
                    rule.shared()
                }
            }
        })
    }

    /// Resolves a condition description to predicates.
    fn condition(&self, description: &ConditionDescription, at: &str, scope: &Scope) -> Result<Condition, CompileError> {
        Ok(match description {
            ConditionDescription::Named(name) => Condition::Predicate(self.predicate(name, at, scope)?),
            ConditionDescription::All(items) => Condition::All(
                items
                    .iter()
                    .map(|item| self.condition(item, at, scope))
                    .collect::<Result<_, _>>()?,
            ),
            ConditionDescription::Any(items) => Condition::Any(
                items
                    .iter()
                    .map(|item| self.condition(item, at, scope))
                    .collect::<Result<_, _>>()?,
            ),
            ConditionDescription::Not(inner) => Condition::Not(Box::new(self.condition(inner, at, scope)?)),
        })
    }

    /// Looks `name` up in the schema scope first, then in the registry.
    fn predicate(&self, name: &str, at: &str, scope: &Scope) -> Result<ConditionFn, CompileError> {
        let registered = scope.get(name).map_or(name, String::as_str);
        match self.registry.get(registered) {
            Some(NamedFunction::Predicate(predicate)) => Ok(predicate),
            Some(other) => Err(CompileError::WrongFunctionKind {
                at: at.to_owned(),
                name: registered.to_owned(),
                expected: FunctionKind::Predicate,
                found: other.kind(),
            }),
            None => Err(CompileError::UnknownFunction {
                at: at.to_owned(),
                name: registered.to_owned(),
            }),
        }
    }

    fn custom(&self, name: &str, at: &str, labels: &Labels) -> Result<SharedRule, CompileError> {
        match self.registry.get(name) {
            Some(NamedFunction::Predicate(predicate)) => {
                Ok(labels.apply(custom(move |value, ctx| predicate(Some(value), ctx))).shared())
            }
            Some(NamedFunction::Rule(rule)) if labels.is_empty() => Ok(rule),
            Some(NamedFunction::Rule(rule)) => Ok(Relabeled {
                rule,
                labels: labels.clone(),
            }
            .shared()),
            Some(NamedFunction::Dependency(_)) => Err(CompileError::WrongFunctionKind {
                at: at.to_owned(),
                name: name.to_owned(),
                expected: FunctionKind::Rule,
                found: FunctionKind::Dependency,
            }),
            None => Err(CompileError::UnknownFunction {
                at: at.to_owned(),
                name: name.to_owned(),
            }),
        }
    }

    /// A registered dependency predicate, or one of the built-in
    /// `equals` / `notEquals` comparisons.
    fn dependency(&self, name: &str, at: &str) -> Result<DependencyFn, CompileError> {
        match self.registry.get(name) {
            Some(NamedFunction::Dependency(predicate)) => Ok(predicate),
            Some(other) => Err(CompileError::WrongFunctionKind {
                at: at.to_owned(),
                name: name.to_owned(),
                expected: FunctionKind::Dependency,
                found: other.kind(),
            }),
            None => {
                let builtin: DependencyFn = match name {
                    "equals" => Arc::new(|dependency, value, _| same_option(dependency, value)),
                    "notEquals" => Arc::new(|dependency, value, _| !same_option(dependency, value)),
                    _ => {
                        return Err(CompileError::UnknownFunction {
                            at: at.to_owned(),
                            name: name.to_owned(),
                        });
                    }
                };
                Ok(builtin)
            }
        }
    }
}

fn same_option(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => same(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// Tags the findings of a compiled rule with its kind.
struct Typed {
    rule: SharedRule,
    kind: &'static str,
}

#[async_trait]
impl ValidationRule for Typed {
    async fn validate(&self, value: Option<&Value>, ctx: &Context<'_>) -> ValidationResult {
        self.rule
            .validate(value, ctx)
            .await
            .map_errors(|error| error.with_rule_type(self.kind))
    }
}

/// A registered rule whose findings take the description's message options.
struct Relabeled {
    rule: SharedRule,
    labels: Labels,
}

#[async_trait]
impl ValidationRule for Relabeled {
    async fn validate(&self, value: Option<&Value>, ctx: &Context<'_>) -> ValidationResult {
        self.rule.validate(value, ctx).await.map_errors(|mut error| {
            if let Some(message) = &self.labels.message {
                error.message.clone_from(message);
            }
            if let Some(id) = &self.labels.message_id {
                error.message_ids.insert(0, id.clone());
            }
            error
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ValidateOptions;
    use crate::schema::validate;
    use serde_json::json;

    fn compiler() -> RuleCompiler {
        let registry = FunctionRegistry::new();
        registry.register_predicate("isEven", |value, _| value.and_then(Value::as_i64).is_some_and(|n| n % 2 == 0));
        registry.register_predicate("always", |_, _| true);
        registry.register_dependency("greaterThan", |dependency, value, _| {
            matches!((dependency.and_then(Value::as_f64), value.and_then(Value::as_f64)), (Some(d), Some(v)) if v > d)
        });
        RuleCompiler::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn messages_apply_to_leaves() {
        let rule = compiler()
            .compile_rule(&json!({"min": 18, "message": "Adults only", "messageId": "validation.adult"}))
            .unwrap();
        let result = rule.validate(Some(&json!(12)), &Context::empty()).await;
        assert_eq!(result.errors()[0].message, "Adults only");
        assert_eq!(result.errors()[0].message_id(), Some("validation.adult"));
    }

    #[tokio::test]
    async fn when_messages_reach_the_inner_rule() {
        let rule = compiler()
            .compile_rule(&json!({"when": "always", "rule": {"required": true}, "message": "Needs a value"}))
            .unwrap();
        let result = rule.validate(None, &Context::empty()).await;
        assert_eq!(result.errors()[0].message, "Needs a value");
        assert_eq!(result.errors()[0].message_id(), Some("validation.required"));
    }

    #[tokio::test]
    async fn custom_predicates_resolve() {
        let rule = compiler().compile_rule(&json!({"custom": "isEven"})).unwrap();
        let ctx = Context::empty();
        assert!(rule.validate(Some(&json!(4)), &ctx).await.is_pass());
        let result = rule.validate(Some(&json!(5)), &ctx).await;
        assert_eq!(result.errors()[0].message_id(), Some("validation.custom"));
    }

    #[tokio::test]
    async fn dependencies_resolve() {
        let schema = compiler()
            .compile_schema(&json!({
                "max": {"dependsOn": "min", "condition": "greaterThan"},
                "confirm": {"dependsOn": "password", "condition": "equals", "options": {"required": false}}
            }))
            .unwrap();

        let data = json!({"min": 5, "max": 3, "password": "a"});
        let result = validate(Some(&data), Some(&schema), None, &ValidateOptions::default()).await;
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].path, ["max"]);
    }

    #[test]
    fn unresolved_names_are_fatal() {
        let compiler = compiler();
        let missing = compiler.compile_rule(&json!({"custom": "nope"})).unwrap_err();
        assert!(matches!(missing, CompileError::UnknownFunction { ref name, .. } if name == "nope"));

        let wrong = compiler
            .compile_rule(&json!({"when": "greaterThan", "rule": {"required": true}}))
            .unwrap_err();
        assert!(matches!(wrong, CompileError::WrongFunctionKind { found: FunctionKind::Dependency, .. }));

        let error = compiler
            .compile_schema(&json!({"a": {"dependsOn": "b", "condition": "between"}}))
            .unwrap_err();
        assert_eq!(error.location(), "a.condition");
    }

    #[test]
    fn invalid_patterns_are_fatal() {
        let error = compiler().compile_rule(&json!({"matches": "(unclosed"})).unwrap_err();
        assert!(matches!(error, CompileError::InvalidPattern { .. }));
    }

    #[test]
    fn scoped_condition_names_map_to_registry_names() {
        let compiler = compiler();
        let schema = compiler
            .compile_schema(&json!({
                "fields": {"x": {"when": "evenNumber", "rule": {"required": true}}},
                "conditions": {"evenNumber": "isEven"}
            }))
            .unwrap();
        assert!(schema.conditions().contains_key("evenNumber"));

        let error = compiler
            .compile_schema(&json!({
                "fields": {},
                "conditions": {"evenNumber": "isOdd"}
            }))
            .unwrap_err();
        assert!(matches!(error, CompileError::UnknownFunction { ref name, .. } if name == "isOdd"));
    }

    #[tokio::test]
    async fn errors_carry_the_compiled_rule_kind() {
        let compiler = compiler();
        let ctx = Context::empty();
        let kind_of = |result: ValidationResult| result.errors()[0].rule_type.clone();

        let tagged = compiler.compile_rule(&json!({"gte": 18, "messageId": "errors.tooYoung"})).unwrap();
        assert_eq!(kind_of(tagged.validate(Some(&json!(3)), &ctx).await).as_deref(), Some("min"));

        let guard = compiler.compile_rule(&json!({"safeSizeString": 1})).unwrap();
        assert_eq!(kind_of(guard.validate(Some(&json!("ab")), &ctx).await).as_deref(), Some("safeSizeString"));

        let items = compiler.compile_rule(&json!({"eachItem": {"datatype": "string"}})).unwrap();
        assert_eq!(kind_of(items.validate(Some(&json!([1])), &ctx).await).as_deref(), Some("datatype"));
        assert_eq!(kind_of(items.validate(Some(&json!(1)), &ctx).await).as_deref(), Some("eachItem"));
    }
}

//! Entity validation
//!
//! Validates the three sections of a business operation against
//! data-described schemas: the `actor` performing it, the `input` payload,
//! and the `record` it applies to. Each section is validated on its own,
//! its error paths start with the section name, and every error gains the
//! message id `validation.entity.<entity>.<field>.<ruleType>` so message
//! tables can target one entity's field precisely.
//!
//! # Examples
//!
//! ```rust,ignore
//! use gatekeeper_validator::prelude::*;
//! use serde_json::json;
//!
//! let request: EntityValidationRequest = serde_json::from_value(json!({
//!     "entityName": "user",
//!     "operationName": "update",
//!     "entityValidations": {"input": {"age": {"min": 18}}},
//!     "input": {"age": 16}
//! }))?;
//!
//! let result = validate_entity(&compiler, &request).await?;
//! assert_eq!(
//!     result.errors[0].message_ids,
//!     ["validation.entity.user.age.min", "validation.min"]
//! );
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::compile::{CompileError, RuleCompiler};
use crate::foundation::ValidationError;
use crate::options::ValidateOptions;
use crate::schema::{self, ValidationSchema};

/// The sections of an entity operation, in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Actor,
    Input,
    Record,
}

impl Section {
    pub const ALL: [Self; 3] = [Self::Actor, Self::Input, Self::Record];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Actor => "actor",
            Self::Input => "input",
            Self::Record => "record",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Schema descriptions per section. A section without one is not validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EntitySchemas {
    pub actor: Option<Value>,
    pub input: Option<Value>,
    pub record: Option<Value>,
}

const fn yes() -> bool {
    true
}

/// Everything needed to validate one entity operation.
///
/// On the wire the run options sit next to the sections:
///
/// ```json
/// {
///   "operationName": "update",
///   "entityName": "user",
///   "entityValidations": {"input": {"age": {"min": 18}}},
///   "input": {"age": 16},
///   "collectErrors": false
/// }
/// ```
///
/// Unknown keys are rejected so a misspelt key cannot disable validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EntityValidationRequest {
    /// Entity name used in synthesised message ids (`user`, `order`, ...).
    pub entity_name: String,
    /// Operation name, for diagnostics only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    #[serde(default)]
    pub entity_validations: EntitySchemas,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<Value>,
    /// Caller context visible to every rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    #[serde(default = "yes")]
    pub collect_errors: bool,
    #[serde(default = "yes")]
    pub verbose_errors: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overridden_error_messages: Option<HashMap<String, String>>,
    /// With `collect_errors == false`, return after the first failing section.
    #[serde(default)]
    pub stop_on_first_section_failure: bool,
}

impl EntityValidationRequest {
    pub fn new(entity_name: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            operation_name: None,
            entity_validations: EntitySchemas::default(),
            actor: None,
            input: None,
            record: None,
            context: None,
            collect_errors: true,
            verbose_errors: true,
            overridden_error_messages: None,
            stop_on_first_section_failure: false,
        }
    }

    /// Sets a section's data and schema description.
    #[must_use = "builder methods must be chained or built"]
    pub fn section(mut self, section: Section, data: Option<Value>, schema: Value) -> Self {
        let schemas = &mut self.entity_validations;
        match section {
            Section::Actor => (self.actor, schemas.actor) = (data, Some(schema)),
            Section::Input => (self.input, schemas.input) = (data, Some(schema)),
            Section::Record => (self.record, schemas.record) = (data, Some(schema)),
        }
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn operation(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Takes the run options from `options`.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_options(mut self, options: ValidateOptions) -> Self {
        self.collect_errors = options.collect_errors;
        self.verbose_errors = options.verbose_errors;
        self.overridden_error_messages = options.overridden_error_messages;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn stop_on_first_section_failure(mut self, stop: bool) -> Self {
        self.stop_on_first_section_failure = stop;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    /// The run options carried by this request.
    pub fn options(&self) -> ValidateOptions {
        ValidateOptions {
            collect_errors: self.collect_errors,
            verbose_errors: self.verbose_errors,
            overridden_error_messages: self.overridden_error_messages.clone(),
        }
    }

    fn data(&self, section: Section) -> Option<&Value> {
        match section {
            Section::Actor => self.actor.as_ref(),
            Section::Input => self.input.as_ref(),
            Section::Record => self.record.as_ref(),
        }
    }

    fn schema(&self, section: Section) -> Option<&Value> {
        match section {
            Section::Actor => self.entity_validations.actor.as_ref(),
            Section::Input => self.entity_validations.input.as_ref(),
            Section::Record => self.entity_validations.record.as_ref(),
        }
    }
}

/// The merged outcome. `errors` is always present, empty on pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityValidationResult {
    pub pass: bool,
    pub errors: Vec<ValidationError>,
}

/// `validation.entity.<entity>.<field>.<ruleType>`. The rule type is the
/// kind of the compiled rule that failed; errors without one fall back to
/// the last segment of their most specific id.
fn entity_message_id(entity: &str, error: &ValidationError) -> String {
    let field = error.field.as_deref().unwrap_or("_");
    let rule_type = error
        .rule_type
        .as_deref()
        .or_else(|| error.message_id().and_then(|id| id.rsplit('.').next()))
        .unwrap_or("invalid");
    format!("validation.entity.{entity}.{field}.{rule_type}")
}

/// Compiles the section schemas and validates each section that has one.
///
/// All schemas are compiled before any data is looked at, so a bad
/// description fails the call even when its section would not be reached.
/// Sections merge like request segments: with `collect_errors == false`
/// and `stop_on_first_section_failure` the run ends after the first failing
/// section.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(entity = %request.entity_name, operation = ?request.operation_name, failed = tracing::field::Empty)
)]
pub async fn validate_entity(
    compiler: &RuleCompiler,
    request: &EntityValidationRequest,
) -> Result<EntityValidationResult, CompileError> {
    let mut schemas: Vec<(Section, ValidationSchema)> = Vec::new();
    for section in Section::ALL {
        if let Some(description) = request.schema(section) {
            let schema = compiler.compile_schema(description).map_err(|e| {
                debug!(%section, error = %e, "section schema rejected");
                e
            })?;
            schemas.push((section, schema));
        }
    }

    let options = request.options();
    let stops_early = request.stop_on_first_section_failure && !options.collect_errors;
    let mut errors = Vec::new();
    for (section, schema) in &schemas {
        let found = schema::collect(
            request.data(*section),
            schema,
            request.context.as_ref(),
            options.collect_errors,
        )
        .await;
        if found.is_empty() {
            continue;
        }

        debug!(%section, errors = found.len(), "entity section failed");
        errors.extend(found.into_iter().map(|mut error| {
            error.message_ids.insert(0, entity_message_id(&request.entity_name, &error));
            error.prefixed(section.as_str())
        }));
        if stops_early {
            break;
        }
    }

    tracing::Span::current().record("failed", errors.len());
    let errors = options.shape(errors);
    Ok(EntityValidationResult {
        pass: errors.is_empty(),
        errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_ids_use_the_compiled_rule_type() {
        let error = ValidationError::new("x")
            .with_message_id("errors.tooYoung")
            .with_rule_type("min")
            .with_field("age");
        assert_eq!(entity_message_id("user", &error), "validation.entity.user.age.min");

        let untyped = ValidationError::new("x")
            .with_message_id("validation.safeSize.string")
            .with_field("bio");
        assert_eq!(entity_message_id("user", &untyped), "validation.entity.user.bio.string");

        let bare = ValidationError::new("x");
        assert_eq!(entity_message_id("user", &bare), "validation.entity.user._.invalid");
    }

    #[test]
    fn request_rejects_unknown_keys() {
        let misnamed = serde_json::from_value::<EntityValidationRequest>(serde_json::json!({
            "entity": "user",
            "input": {"age": 16}
        }));
        assert!(misnamed.is_err());

        let nested = serde_json::from_value::<EntityValidationRequest>(serde_json::json!({
            "entityName": "user",
            "entityValidations": {"inputs": {"age": {"min": 18}}}
        }));
        assert!(nested.is_err());
    }

    #[test]
    fn request_defaults_match_validate_options() {
        let request: EntityValidationRequest =
            serde_json::from_value(serde_json::json!({"entityName": "user"})).unwrap();
        assert_eq!(request.options(), ValidateOptions::default());
        assert!(!request.stop_on_first_section_failure);
        assert_eq!(request, EntityValidationRequest::new("user"));
    }
}

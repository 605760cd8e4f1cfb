//! Validation options
//!
//! Options are plain configuration: they deserialise from camelCase keys
//! (`collectErrors`, `verboseErrors`, `overriddenErrorMessages`,
//! `stopOnFirstSectionFailure`) and default to collecting every error in
//! verbose form.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::foundation::ValidationError;

/// Options for a schema validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidateOptions {
    /// Gather every failure (`true`) or stop at the first failing field.
    pub collect_errors: bool,
    /// Keep `messageIds`/`expected`/`received`/`field` (`true`) or reduce
    /// errors to `{path, message}`.
    pub verbose_errors: bool,
    /// Replacement messages keyed by message id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overridden_error_messages: Option<HashMap<String, String>>,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            collect_errors: true,
            verbose_errors: true,
            overridden_error_messages: None,
        }
    }
}

impl ValidateOptions {
    /// Defaults, but stopping at the first failing field.
    #[must_use]
    pub fn fail_fast() -> Self {
        Self {
            collect_errors: false,
            ..Self::default()
        }
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn collect_errors(mut self, collect: bool) -> Self {
        self.collect_errors = collect;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn verbose_errors(mut self, verbose: bool) -> Self {
        self.verbose_errors = verbose;
        self
    }

    /// Adds one message override.
    #[must_use = "builder methods must be chained or built"]
    pub fn override_message(mut self, message_id: impl Into<String>, message: impl Into<String>) -> Self {
        self.overridden_error_messages
            .get_or_insert_with(HashMap::new)
            .insert(message_id.into(), message.into());
        self
    }

    /// Applies message overrides, then terse stripping.
    pub(crate) fn shape(&self, mut errors: Vec<ValidationError>) -> Vec<ValidationError> {
        if let Some(overrides) = &self.overridden_error_messages {
            for error in &mut errors {
                error.apply_override(overrides);
            }
        }
        if self.verbose_errors {
            errors
        } else {
            errors.into_iter().map(ValidationError::terse).collect()
        }
    }
}

/// Options for an HTTP request validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpValidateOptions {
    #[serde(flatten)]
    pub validate: ValidateOptions,
    /// With `collect_errors == false`, return after the first failing segment.
    pub stop_on_first_section_failure: bool,
}

impl HttpValidateOptions {
    #[must_use = "builder methods must be chained or built"]
    pub fn with_validate(mut self, validate: ValidateOptions) -> Self {
        self.validate = validate;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn stop_on_first_section_failure(mut self, stop: bool) -> Self {
        self.stop_on_first_section_failure = stop;
        self
    }

    pub(crate) fn stops_early(&self) -> bool {
        self.stop_on_first_section_failure && !self.validate.collect_errors
    }
}

impl From<ValidateOptions> for HttpValidateOptions {
    fn from(validate: ValidateOptions) -> Self {
        Self {
            validate,
            stop_on_first_section_failure: false,
        }
    }
}

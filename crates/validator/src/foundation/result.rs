//! The outcome of running a rule.

use serde::Serialize;

use super::ValidationError;

/// Message used when a failure is reported without any finding.
const GENERIC_FAILURE: &str = "Validation failed";

/// Pass/fail plus the findings that explain a failure.
///
/// `errors` is always present and non-empty on failure and absent on pass;
/// the constructors are the only way to build a result, so the invariant
/// holds everywhere.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pass: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<ValidationError>>,
}

impl ValidationResult {
    /// A passing result.
    #[must_use]
    pub const fn passed() -> Self {
        Self {
            pass: true,
            errors: None,
        }
    }

    /// A failing result. An empty list is replaced by one generic error.
    #[must_use]
    pub fn failed(errors: Vec<ValidationError>) -> Self {
        let errors = if errors.is_empty() {
            vec![ValidationError::new(GENERIC_FAILURE)]
        } else {
            errors
        };
        Self {
            pass: false,
            errors: Some(errors),
        }
    }

    /// A failing result with a single error.
    #[must_use]
    pub fn fail(error: ValidationError) -> Self {
        Self::failed(vec![error])
    }

    /// Passes when `errors` is empty, fails with them otherwise.
    #[must_use]
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        if errors.is_empty() {
            Self::passed()
        } else {
            Self::failed(errors)
        }
    }

    /// Whether validation passed.
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        self.pass
    }

    /// Whether validation failed.
    #[must_use]
    pub const fn is_fail(&self) -> bool {
        !self.pass
    }

    /// The findings; empty on pass.
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        self.errors.as_deref().unwrap_or_default()
    }

    /// Consumes the result, returning its findings.
    #[must_use]
    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors.unwrap_or_default()
    }

    /// Applies `f` to every finding.
    #[must_use]
    pub fn map_errors(self, f: impl FnMut(ValidationError) -> ValidationError) -> Self {
        match self.errors {
            Some(errors) => Self::failed(errors.into_iter().map(f).collect()),
            None => self,
        }
    }

    /// Prepends `segment` to every finding's path.
    #[must_use]
    pub fn prefixed(self, segment: &str) -> Self {
        self.map_errors(|e| e.prefixed(segment))
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::passed()
    }
}

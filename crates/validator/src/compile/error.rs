//! Configuration errors raised while compiling rule descriptions.

use thiserror::Error;

use super::registry::FunctionKind;

/// A rule or schema description that cannot be compiled.
///
/// Every variant carries `at`, the location of the offending description
/// (`fields.address.schema.fields.city`, for example; empty at the root).
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("malformed rule description at '{at}': {reason}")]
    Malformed { at: String, reason: String },

    #[error("unknown rule '{rule}' at '{at}'")]
    UnknownRule { at: String, rule: String },

    #[error("rule description at '{at}' combines '{first}' with '{second}'")]
    AmbiguousRule {
        at: String,
        first: String,
        second: String,
    },

    #[error("invalid parameter for '{rule}' at '{at}': {reason}")]
    InvalidParameter {
        at: String,
        rule: String,
        reason: String,
    },

    #[error("invalid pattern at '{at}'")]
    InvalidPattern {
        at: String,
        #[source]
        source: regex::Error,
    },

    #[error("unknown data type '{kind}' at '{at}'")]
    UnknownDataType { at: String, kind: String },

    #[error("no function named '{name}' is registered (referenced at '{at}')")]
    UnknownFunction { at: String, name: String },

    #[error("function '{name}' is a {found}, but '{at}' needs a {expected}")]
    WrongFunctionKind {
        at: String,
        name: String,
        expected: FunctionKind,
        found: FunctionKind,
    },
}

impl CompileError {
    /// Where in the description the problem is.
    pub fn location(&self) -> &str {
        match self {
            Self::Malformed { at, .. }
            | Self::UnknownRule { at, .. }
            | Self::AmbiguousRule { at, .. }
            | Self::InvalidParameter { at, .. }
            | Self::InvalidPattern { at, .. }
            | Self::UnknownDataType { at, .. }
            | Self::UnknownFunction { at, .. }
            | Self::WrongFunctionKind { at, .. } => at,
        }
    }

    pub(crate) fn malformed(at: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            at: at.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(at: &str, rule: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            at: at.to_owned(),
            rule: rule.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Joins a location and a child segment.
pub(crate) fn child(at: &str, segment: &str) -> String {
    if at.is_empty() {
        segment.to_owned()
    } else {
        format!("{at}.{segment}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_location() {
        let error = CompileError::UnknownRule {
            at: child("fields", "age"),
            rule: "between".into(),
        };
        assert_eq!(error.to_string(), "unknown rule 'between' at 'fields.age'");
        assert_eq!(error.location(), "fields.age");
    }

    #[test]
    fn pattern_errors_keep_their_source() {
        let source = regex::Regex::new("(").unwrap_err();
        let error = CompileError::InvalidPattern {
            at: "zip".into(),
            source,
        };
        assert!(std::error::Error::source(&error).is_some());
    }
}

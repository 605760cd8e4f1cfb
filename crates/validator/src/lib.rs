//! # gatekeeper-validator
//!
//! A schema-driven validation engine for JSON values: composable rules,
//! conditional gates, nested and collection traversal, and structured,
//! path-addressed errors.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gatekeeper_validator::prelude::*;
//! use serde_json::json;
//!
//! let schema = ValidationSchema::new()
//!     .field("email", required().and(email()))
//!     .field("age", min(18))
//!     .field("nickname", min_length(3).optional());
//!
//! let result = validate(Some(&json!({"email": "a@b.co", "age": 16})), Some(&schema), None, &ValidateOptions::default()).await;
//! assert_eq!(result.errors()[0].path, ["age"]);
//! ```
//!
//! ## Entry points
//!
//! - [`validate`]: one value against a [`ValidationSchema`]
//! - [`http_validate`]: headers, params, query and body of a request
//! - [`RuleCompiler`](compile::RuleCompiler): schemas described as plain data
//! - [`validate_entity`]: actor / input / record sections of an operation
//!
//! ## Absent values
//!
//! A rule receives `None` for a missing value, and JSON `null` is treated the
//! same way. Every built-in rule declares whether an absent value passes or
//! fails ([`Absent`](validators::Absent)); `required` and the catalog rules
//! fail, the size guards pass, and [`optional`](combinators::optional) turns
//! any rule into one that passes.

// Rule and predicate signatures are higher-ranked closures behind `Arc`.
#![allow(clippy::type_complexity)]

pub mod combinators;
pub mod compile;
pub mod entity;
pub mod foundation;
pub mod http;
pub mod options;
pub mod path;
pub mod prelude;
pub mod schema;
pub mod validators;

pub use entity::{EntityValidationRequest, EntityValidationResult, validate_entity};
pub use foundation::{Context, ValidationError, ValidationResult, ValidationRule};
pub use http::{HttpRequest, HttpSchema, http_validate};
pub use options::{HttpValidateOptions, ValidateOptions};
pub use schema::{FieldRule, ValidationSchema, validate};

//! Prelude module for convenient imports.
//!
//! Provides a single `use gatekeeper_validator::prelude::*;` import that
//! brings in the rule trait, the catalog, the combinators and every entry
//! point.
//!
//! # Examples
//!
//! ```rust,ignore
//! use gatekeeper_validator::prelude::*;
//!
//! let username = min_length(3).and(max_length(20));
//! let vat = when(required(), "isBusiness");
//! let tags = each_item(min_length(2)).stop_on_first_error(true);
//! ```

// ============================================================================
// FOUNDATION: Core trait, results, context
// ============================================================================

pub use crate::foundation::{
    Context, RuleExt, SharedRule, ValidationError, ValidationResult, ValidationRule, present,
};

// ============================================================================
// VALIDATORS: All built-in rules
// ============================================================================

#[allow(clippy::wildcard_imports)]
pub use crate::validators::*;

// ============================================================================
// COMBINATORS: Composition functions and types
// ============================================================================

pub use crate::combinators::{
    AllOf, Condition, ConditionFn, ConditionalRule, DependsOn, EachItem, NamedConditions, Nested,
    ObjectValues, Optional, all_of, depends_on, each_item, nested, object_values, optional, when,
    when_all, when_any, when_not,
};

// ============================================================================
// ENTRY POINTS
// ============================================================================

pub use crate::compile::{CompileError, FunctionRegistry, RuleCompiler};
pub use crate::entity::{EntityValidationRequest, EntityValidationResult, Section, validate_entity};
pub use crate::http::{HttpRequest, HttpSchema, Segment, http_validate};
pub use crate::options::{HttpValidateOptions, ValidateOptions};
pub use crate::schema::{FieldRule, ValidationSchema, validate};

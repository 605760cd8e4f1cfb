//! Core validation types and traits
//!
//! - **Trait**: [`ValidationRule`] and the [`RuleExt`] composition helpers
//! - **Results**: [`ValidationResult`], [`ValidationError`]
//! - **Context**: [`Context`], the borrowed view a rule sees of its surroundings
//!
//! Values are `serde_json::Value`; an absent value is `None`, and a JSON
//! `null` is treated the same way (see [`present`]).

pub mod context;
pub mod error;
pub mod result;
pub mod traits;

pub use context::{Context, present};
pub use error::ValidationError;
pub use result::ValidationResult;
pub use traits::{RuleExt, SharedRule, ValidationRule};

//! Rule combinators
//!
//! Rules that wrap other rules: conditions and conditional rules,
//! conjunction, optionality, nested schemas, collections and cross-field
//! dependencies. All of them are [`ValidationRule`](crate::foundation::ValidationRule)s
//! and compose freely.

pub mod all;
pub mod condition;
pub mod depends_on;
pub mod each;
pub mod nested;
pub mod object_values;
pub mod optional;
pub mod when;

pub use all::{AllOf, all_of};
pub use condition::{Condition, ConditionFn, NamedConditions};
pub use depends_on::{DependencyFn, DependsOn, depends_on};
pub use each::{EachItem, each_item};
pub use nested::{Nested, nested};
pub use object_values::{ObjectValues, object_values};
pub use optional::{Optional, optional};
pub use when::{ConditionalRule, when, when_all, when_any, when_not};

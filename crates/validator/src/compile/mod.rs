//! Data-described rules
//!
//! Schemas that live in configuration files, databases or network messages
//! are written in a plain-data rule format ([`description`]) and compiled
//! into rules by a [`RuleCompiler`]. Code cannot travel inside data, so
//! predicates are referenced by name and resolved through a
//! [`FunctionRegistry`].
//!
//! Compilation is strict: anything the compiler does not understand, or a
//! name nothing is registered under, is a [`CompileError`].

pub mod compiler;
pub mod description;
pub mod error;
pub mod registry;

pub use compiler::RuleCompiler;
pub use description::{
    CollectionOptions, ConditionDescription, RuleDescription, RuleKind, SchemaDescription,
};
pub use error::CompileError;
pub use registry::{FunctionKind, FunctionRegistry, NamedFunction};

//! Named-function registry
//!
//! Data-described schemas cannot carry code, so they reference predicates by
//! name. A [`FunctionRegistry`] maps those names to executable functions.
//! It is an explicit object shared through `Arc`: register everything during
//! start-up, then hand the registry to a [`RuleCompiler`](super::RuleCompiler)
//! and compile schemas from many threads. Call [`FunctionRegistry::clear`]
//! between isolated test cases.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, warn};

use crate::combinators::{ConditionFn, DependencyFn};
use crate::foundation::{Context, RuleExt, SharedRule, ValidationRule};

/// What a registered function can be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    /// `(value, context) -> bool`: conditions and custom rules.
    Predicate,
    /// `(dependency, value, context) -> bool`: `dependsOn` conditions.
    Dependency,
    /// A complete rule, possibly asynchronous.
    Rule,
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Predicate => "predicate",
            Self::Dependency => "dependency predicate",
            Self::Rule => "rule",
        })
    }
}

/// A registered function.
#[derive(Clone)]
pub enum NamedFunction {
    Predicate(ConditionFn),
    Dependency(DependencyFn),
    Rule(SharedRule),
}

impl NamedFunction {
    pub fn kind(&self) -> FunctionKind {
        match self {
            Self::Predicate(_) => FunctionKind::Predicate,
            Self::Dependency(_) => FunctionKind::Dependency,
            Self::Rule(_) => FunctionKind::Rule,
        }
    }
}

impl fmt::Debug for NamedFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NamedFunction::{:?}", self.kind())
    }
}

/// Name → function table behind a read/write lock.
#[derive(Default)]
pub struct FunctionRegistry {
    functions: RwLock<HashMap<String, NamedFunction>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `function` under `name`, replacing any previous entry.
    pub fn register(&self, name: impl Into<String>, function: NamedFunction) {
        let name = name.into();
        let kind = function.kind();
        if let Some(previous) = self.functions.write().insert(name.clone(), function) {
            warn!(%name, previous = %previous.kind(), %kind, "registered function replaced");
        } else {
            debug!(%name, %kind, "function registered");
        }
    }

    /// Registers a `(value, context)` predicate.
    pub fn register_predicate<F>(&self, name: impl Into<String>, predicate: F)
    where
        F: Fn(Option<&Value>, &Context<'_>) -> bool + Send + Sync + 'static,
    {
        self.register(name, NamedFunction::Predicate(Arc::new(predicate)));
    }

    /// Registers a `(dependency, value, context)` predicate for `dependsOn`.
    pub fn register_dependency<F>(&self, name: impl Into<String>, predicate: F)
    where
        F: Fn(Option<&Value>, Option<&Value>, &Context<'_>) -> bool + Send + Sync + 'static,
    {
        self.register(name, NamedFunction::Dependency(Arc::new(predicate)));
    }

    /// Registers a complete rule for use as `custom: "<name>"`.
    pub fn register_rule<R: ValidationRule + 'static>(&self, name: impl Into<String>, rule: R) {
        self.register(name, NamedFunction::Rule(rule.shared()));
    }

    /// Removes `name`, returning whether it was registered.
    pub fn unregister(&self, name: &str) -> bool {
        let removed = self.functions.write().remove(name).is_some();
        if removed {
            debug!(%name, "function unregistered");
        }
        removed
    }

    /// Removes every registration.
    pub fn clear(&self) {
        let mut functions = self.functions.write();
        debug!(count = functions.len(), "function registry cleared");
        functions.clear();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.read().is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.functions.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn get(&self, name: &str) -> Option<NamedFunction> {
        self.functions.read().get(name).cloned()
    }

    /// The predicate registered under `name`, if it is one.
    pub fn predicate(&self, name: &str) -> Option<ConditionFn> {
        match self.get(name)? {
            NamedFunction::Predicate(predicate) => Some(predicate),
            _ => None,
        }
    }

    /// The dependency predicate registered under `name`, if it is one.
    pub fn dependency(&self, name: &str) -> Option<DependencyFn> {
        match self.get(name)? {
            NamedFunction::Dependency(predicate) => Some(predicate),
            _ => None,
        }
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("names", &self.names())
            .finish()
    }
}

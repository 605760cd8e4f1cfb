//! The plain-data rule description format
//!
//! A rule description is a JSON object whose key selects the rule kind and
//! whose value supplies the parameter, with optional sibling `message` and
//! `messageId` keys:
//!
//! ```json
//! {"minLength": 3, "message": "Too short"}
//! {"when": "isBusiness", "rule": {"required": true}}
//! {"nested": "address", "schema": {"city": {"required": true}}}
//! {"eachItem": {"min": 0}, "options": {"stopOnFirstError": true}}
//! {"dependsOn": "password", "condition": "equals"}
//! ```
//!
//! Several leaf keys in one object, or a JSON array of descriptions, mean
//! "all of these". `required: false` next to other leaf keys makes them
//! optional. Parsing produces a [`RuleDescription`] tree; [`to_value`]
//! renders it back in canonical form (aliases resolved, composites as
//! `allOf`).
//!
//! [`to_value`]: RuleDescription::to_value

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::error::{CompileError, child};
use crate::validators::DataType;
use crate::validators::range::number_value;

const MESSAGE: &str = "message";
const MESSAGE_ID: &str = "messageId";

/// Keys that select a composite rule. At most one may appear in an object,
/// and only next to its companions and the message keys.
const STRUCTURAL: &[(&str, &[&str])] = &[
    ("allOf", &[]),
    ("optional", &[]),
    ("when", &["rule"]),
    ("whenAll", &["rule"]),
    ("whenAny", &["rule"]),
    ("whenNot", &["rule"]),
    ("nested", &["schema", "options"]),
    ("eachItem", &["options"]),
    ("objectValues", &["options"]),
    ("dependsOn", &["condition", "options"]),
];

/// A parsed rule description.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDescription {
    pub kind: RuleKind,
    pub message: Option<String>,
    pub message_id: Option<String>,
}

/// Every rule kind the description format can express.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleKind {
    Required,
    MinLength(usize),
    MaxLength(usize),
    Matches(String),
    Email,
    Equals(Value),
    NotEquals(Value),
    Min(f64),
    Max(f64),
    OneOf(Vec<Value>),
    NotOneOf(Vec<Value>),
    /// A function registered under this name.
    Custom(String),
    DataType(DataType),
    Unique,
    SafeSizeString(usize),
    SafeSizeArray(usize),
    SafeSizeObject(usize),
    SafeSizeJson(usize),
    SafeDepth(usize),
    AllOf(Vec<RuleDescription>),
    Optional(Box<RuleDescription>),
    When {
        condition: ConditionDescription,
        rule: Box<RuleDescription>,
    },
    Nested {
        path: String,
        schema: SchemaDescription,
        options: CollectionOptions,
    },
    EachItem {
        rule: Box<RuleDescription>,
        options: CollectionOptions,
    },
    ObjectValues {
        rule: Box<RuleDescription>,
        options: CollectionOptions,
    },
    DependsOn {
        path: String,
        /// A registered dependency predicate, or `equals` / `notEquals`.
        condition: String,
        options: CollectionOptions,
    },
}

impl RuleKind {
    /// The canonical key of this kind, used as its rule type.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::MinLength(_) => "minLength",
            Self::MaxLength(_) => "maxLength",
            Self::Matches(_) => "matches",
            Self::Email => "email",
            Self::Equals(_) => "equals",
            Self::NotEquals(_) => "notEquals",
            Self::Min(_) => "min",
            Self::Max(_) => "max",
            Self::OneOf(_) => "oneOf",
            Self::NotOneOf(_) => "notOneOf",
            Self::Custom(_) => "custom",
            Self::DataType(_) => "datatype",
            Self::Unique => "unique",
            Self::SafeSizeString(_) => "safeSizeString",
            Self::SafeSizeArray(_) => "safeSizeArray",
            Self::SafeSizeObject(_) => "safeSizeObject",
            Self::SafeSizeJson(_) => "safeSizeJSON",
            Self::SafeDepth(_) => "safeDepth",
            Self::AllOf(_) => "allOf",
            Self::Optional(_) => "optional",
            Self::When { .. } => "when",
            Self::Nested { .. } => "nested",
            Self::EachItem { .. } => "eachItem",
            Self::ObjectValues { .. } => "objectValues",
            Self::DependsOn { .. } => "dependsOn",
        }
    }
}

/// The `options` object of nested, collection and dependency rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CollectionOptions {
    pub required: Option<bool>,
    pub stop_on_first_error: Option<bool>,
}

impl CollectionOptions {
    fn is_empty(&self) -> bool {
        self.required.is_none() && self.stop_on_first_error.is_none()
    }

    fn to_value(&self) -> Value {
        let mut map = Map::new();
        if let Some(required) = self.required {
            map.insert("required".into(), required.into());
        }
        if let Some(stop) = self.stop_on_first_error {
            map.insert("stopOnFirstError".into(), stop.into());
        }
        Value::Object(map)
    }
}

/// A condition reference: a name, or a boolean composition of names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionDescription {
    Named(String),
    All(Vec<ConditionDescription>),
    Any(Vec<ConditionDescription>),
    Not(Box<ConditionDescription>),
}

impl ConditionDescription {
    /// Parses `"name"`, `{"all": [..]}`, `{"any": [..]}` or `{"not": ..}`.
    pub fn parse_at(value: &Value, at: &str) -> Result<Self, CompileError> {
        match value {
            Value::String(name) => Ok(Self::Named(name.clone())),
            Value::Object(map) if map.len() == 1 => {
                let Some((key, inner)) = map.iter().next() else {
                    return Err(CompileError::malformed(at, "empty condition"));
                };
                let at = child(at, key);
                match key.as_str() {
                    "all" => Ok(Self::All(Self::parse_list(inner, &at)?)),
                    "any" => Ok(Self::Any(Self::parse_list(inner, &at)?)),
                    "not" => Ok(Self::Not(Box::new(Self::parse_at(inner, &at)?))),
                    _ => Err(CompileError::malformed(&at, "expected 'all', 'any' or 'not'")),
                }
            }
            _ => Err(CompileError::malformed(at, "a condition is a name or an all/any/not object")),
        }
    }

    fn parse_list(value: &Value, at: &str) -> Result<Vec<Self>, CompileError> {
        let Value::Array(items) = value else {
            return Err(CompileError::malformed(at, "expected a list of conditions"));
        };
        items
            .iter()
            .enumerate()
            .map(|(i, item)| Self::parse_at(item, &child(at, &i.to_string())))
            .collect()
    }

    fn list_value(items: &[Self]) -> Value {
        Value::Array(items.iter().map(Self::to_value).collect())
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Named(name) => Value::String(name.clone()),
            Self::All(items) => json!({"all": Self::list_value(items)}),
            Self::Any(items) => json!({"any": Self::list_value(items)}),
            Self::Not(inner) => json!({"not": inner.to_value()}),
        }
    }
}

impl RuleDescription {
    pub fn new(kind: RuleKind) -> Self {
        Self {
            kind,
            message: None,
            message_id: None,
        }
    }

    /// Parses a description rooted at the empty location.
    pub fn parse(value: &Value) -> Result<Self, CompileError> {
        Self::parse_at(value, "")
    }

    /// Parses a description, reporting errors relative to `at`.
    pub fn parse_at(value: &Value, at: &str) -> Result<Self, CompileError> {
        match value {
            Value::Array(items) => Ok(Self::new(RuleKind::AllOf(parse_items(items, at)?))),
            Value::Object(map) => parse_object(map, at),
            _ => Err(CompileError::malformed(at, "a rule is an object or a list of rules")),
        }
    }

    /// Renders the description in canonical form.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        match &self.kind {
            RuleKind::Required => insert(&mut map, "required", true),
            RuleKind::MinLength(n) => insert(&mut map, "minLength", *n),
            RuleKind::MaxLength(n) => insert(&mut map, "maxLength", *n),
            RuleKind::Matches(pattern) => insert(&mut map, "matches", pattern.as_str()),
            RuleKind::Email => insert(&mut map, "email", true),
            RuleKind::Equals(v) => insert(&mut map, "equals", v.clone()),
            RuleKind::NotEquals(v) => insert(&mut map, "notEquals", v.clone()),
            RuleKind::Min(n) => insert(&mut map, "min", number_value(*n)),
            RuleKind::Max(n) => insert(&mut map, "max", number_value(*n)),
            RuleKind::OneOf(options) => insert(&mut map, "oneOf", options.clone()),
            RuleKind::NotOneOf(options) => insert(&mut map, "notOneOf", options.clone()),
            RuleKind::Custom(name) => insert(&mut map, "custom", name.as_str()),
            RuleKind::DataType(kind) => insert(&mut map, "datatype", kind.as_str()),
            RuleKind::Unique => insert(&mut map, "unique", true),
            RuleKind::SafeSizeString(n) => insert(&mut map, "safeSizeString", *n),
            RuleKind::SafeSizeArray(n) => insert(&mut map, "safeSizeArray", *n),
            RuleKind::SafeSizeObject(n) => insert(&mut map, "safeSizeObject", *n),
            RuleKind::SafeSizeJson(n) => insert(&mut map, "safeSizeJSON", *n),
            RuleKind::SafeDepth(n) => insert(&mut map, "safeDepth", *n),
            RuleKind::AllOf(items) => {
                insert(&mut map, "allOf", items.iter().map(Self::to_value).collect::<Vec<_>>());
            }
            RuleKind::Optional(inner) => insert(&mut map, "optional", inner.to_value()),
            RuleKind::When { condition, rule } => {
                let (key, condition) = match condition {
                    ConditionDescription::All(items) => ("whenAll", ConditionDescription::list_value(items)),
                    ConditionDescription::Any(items) => ("whenAny", ConditionDescription::list_value(items)),
                    ConditionDescription::Not(inner) => ("whenNot", inner.to_value()),
                    named @ ConditionDescription::Named(_) => ("when", named.to_value()),
                };
                insert(&mut map, key, condition);
                insert(&mut map, "rule", rule.to_value());
            }
            RuleKind::Nested { path, schema, options } => {
                insert(&mut map, "nested", path.as_str());
                insert(&mut map, "schema", schema.to_value());
                insert_options(&mut map, options);
            }
            RuleKind::EachItem { rule, options } => {
                insert(&mut map, "eachItem", rule.to_value());
                insert_options(&mut map, options);
            }
            RuleKind::ObjectValues { rule, options } => {
                insert(&mut map, "objectValues", rule.to_value());
                insert_options(&mut map, options);
            }
            RuleKind::DependsOn { path, condition, options } => {
                insert(&mut map, "dependsOn", path.as_str());
                insert(&mut map, "condition", condition.as_str());
                insert_options(&mut map, options);
            }
        }
        if let Some(message) = &self.message {
            insert(&mut map, MESSAGE, message.as_str());
        }
        if let Some(id) = &self.message_id {
            insert(&mut map, MESSAGE_ID, id.as_str());
        }
        Value::Object(map)
    }
}

fn insert(map: &mut Map<String, Value>, key: &str, value: impl Into<Value>) {
    map.insert(key.to_owned(), value.into());
}

fn insert_options(map: &mut Map<String, Value>, options: &CollectionOptions) {
    if !options.is_empty() {
        insert(map, "options", options.to_value());
    }
}

fn parse_items(items: &[Value], at: &str) -> Result<Vec<RuleDescription>, CompileError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| RuleDescription::parse_at(item, &child(at, &i.to_string())))
        .collect()
}

fn text(map: &Map<String, Value>, key: &str, at: &str) -> Result<Option<String>, CompileError> {
    match map.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(CompileError::malformed(&child(at, key), "expected a string")),
    }
}

fn parse_object(map: &Map<String, Value>, at: &str) -> Result<RuleDescription, CompileError> {
    let message = text(map, MESSAGE, at)?;
    let message_id = text(map, MESSAGE_ID, at)?;
    let keys: Vec<&str> = map
        .keys()
        .map(String::as_str)
        .filter(|k| *k != MESSAGE && *k != MESSAGE_ID)
        .collect();

    let mut structural = STRUCTURAL.iter().filter(|(key, _)| map.contains_key(*key));
    if let Some(&(key, companions)) = structural.next() {
        if let Some(&(other, _)) = structural.next() {
            return Err(ambiguous(at, key, other));
        }
        if let Some(extra) = keys.iter().find(|k| **k != key && !companions.contains(*k)) {
            return Err(ambiguous(at, key, extra));
        }
        return Ok(RuleDescription {
            kind: parse_structural(key, map, at)?,
            message,
            message_id,
        });
    }

    if keys.is_empty() {
        return Err(CompileError::malformed(at, "empty rule description"));
    }

    let mut optional = false;
    let mut leaves = Vec::with_capacity(keys.len());
    for key in keys {
        let value = &map[key];
        if key == "required" && *value == Value::Bool(false) {
            optional = true;
            continue;
        }
        leaves.push(RuleDescription {
            kind: parse_leaf(key, value, &child(at, key))?,
            message: message.clone(),
            message_id: message_id.clone(),
        });
    }

    let inner = match leaves.len() {
        1 if !optional => return Ok(leaves.remove(0)),
        1 => leaves.remove(0),
        _ => RuleDescription::new(RuleKind::AllOf(leaves)),
    };
    Ok(if optional {
        RuleDescription::new(RuleKind::Optional(Box::new(inner)))
    } else {
        inner
    })
}

fn ambiguous(at: &str, first: &str, second: &str) -> CompileError {
    CompileError::AmbiguousRule {
        at: at.to_owned(),
        first: first.to_owned(),
        second: second.to_owned(),
    }
}

fn parse_structural(key: &str, map: &Map<String, Value>, at: &str) -> Result<RuleKind, CompileError> {
    let value = &map[key];
    let here = child(at, key);
    let companion = |name: &str| {
        map.get(name)
            .ok_or_else(|| CompileError::malformed(at, format!("'{key}' requires '{name}'")))
    };
    let options = || -> Result<CollectionOptions, CompileError> {
        match map.get("options") {
            None => Ok(CollectionOptions::default()),
            Some(options) => serde_json::from_value(options.clone())
                .map_err(|e| CompileError::malformed(&child(at, "options"), e.to_string())),
        }
    };

    Ok(match key {
        "allOf" => match value {
            Value::Array(items) => RuleKind::AllOf(parse_items(items, &here)?),
            _ => return Err(CompileError::malformed(&here, "expected a list of rules")),
        },
        "optional" => RuleKind::Optional(Box::new(RuleDescription::parse_at(value, &here)?)),
        "when" | "whenAll" | "whenAny" | "whenNot" => {
            let condition = match key {
                "whenAll" => ConditionDescription::All(ConditionDescription::parse_list(value, &here)?),
                "whenAny" => ConditionDescription::Any(ConditionDescription::parse_list(value, &here)?),
                "whenNot" => ConditionDescription::Not(Box::new(ConditionDescription::parse_at(value, &here)?)),
                _ => ConditionDescription::parse_at(value, &here)?,
            };
            let rule = RuleDescription::parse_at(companion("rule")?, &child(at, "rule"))?;
            RuleKind::When {
                condition,
                rule: Box::new(rule),
            }
        }
        "nested" => {
            let options = options()?;
            no_stop_option(&options, at, key)?;
            RuleKind::Nested {
                path: path_param(value, &here)?,
                schema: SchemaDescription::parse_at(companion("schema")?, &child(at, "schema"))?,
                options,
            }
        }
        "eachItem" => RuleKind::EachItem {
            rule: Box::new(RuleDescription::parse_at(value, &here)?),
            options: options()?,
        },
        "objectValues" => RuleKind::ObjectValues {
            rule: Box::new(RuleDescription::parse_at(value, &here)?),
            options: options()?,
        },
        "dependsOn" => {
            let options = options()?;
            no_stop_option(&options, at, key)?;
            let condition = match companion("condition")? {
                Value::String(name) => name.clone(),
                _ => return Err(CompileError::malformed(&child(at, "condition"), "expected a function name")),
            };
            RuleKind::DependsOn {
                path: path_param(value, &here)?,
                condition,
                options,
            }
        }
        _ => return Err(CompileError::UnknownRule { at: at.to_owned(), rule: key.to_owned() }),
    })
}

fn no_stop_option(options: &CollectionOptions, at: &str, rule: &str) -> Result<(), CompileError> {
    match options.stop_on_first_error {
        Some(_) => Err(CompileError::invalid(
            &child(at, "options"),
            rule,
            "'stopOnFirstError' applies to collections only",
        )),
        None => Ok(()),
    }
}

fn path_param(value: &Value, at: &str) -> Result<String, CompileError> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| CompileError::malformed(at, "expected a dot-separated path"))
}

fn parse_leaf(key: &str, value: &Value, at: &str) -> Result<RuleKind, CompileError> {
    let count = || {
        value
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| CompileError::invalid(at, key, "expected a non-negative integer"))
    };
    let number = || {
        value
            .as_f64()
            .ok_or_else(|| CompileError::invalid(at, key, "expected a number"))
    };
    let flag = |kind: RuleKind| match value {
        Value::Bool(true) => Ok(kind),
        _ => Err(CompileError::invalid(at, key, "expected true")),
    };
    let list = || match value {
        Value::Array(items) => Ok(items.clone()),
        _ => Err(CompileError::invalid(at, key, "expected a list of values")),
    };
    let name = || {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| CompileError::invalid(at, key, "expected a string"))
    };
    let data_type = |literal: &str| {
        literal
            .parse::<DataType>()
            .map(RuleKind::DataType)
            .map_err(|_| CompileError::UnknownDataType {
                at: at.to_owned(),
                kind: literal.to_owned(),
            })
    };

    match key {
        "required" => flag(RuleKind::Required),
        "minLength" => count().map(RuleKind::MinLength),
        "maxLength" => count().map(RuleKind::MaxLength),
        "matches" => name().map(RuleKind::Matches),
        "email" => flag(RuleKind::Email),
        "equals" | "eq" => Ok(RuleKind::Equals(value.clone())),
        "notEquals" | "ne" | "neq" => Ok(RuleKind::NotEquals(value.clone())),
        "min" | "gte" => number().map(RuleKind::Min),
        "max" | "lte" => number().map(RuleKind::Max),
        "gt" => number().map(|n| RuleKind::Min(n + 1.0)),
        "lt" => number().map(|n| RuleKind::Max(n - 1.0)),
        "oneOf" | "in" => list().map(RuleKind::OneOf),
        "notOneOf" | "notIn" => list().map(RuleKind::NotOneOf),
        "custom" => name().map(RuleKind::Custom),
        "datatype" | "isType" => data_type(&name()?),
        "isEmail" => flag(RuleKind::DataType(DataType::Email)),
        "isIP" => flag(RuleKind::DataType(DataType::Ip)),
        "isIPv4" => flag(RuleKind::DataType(DataType::Ipv4)),
        "isIPv6" => flag(RuleKind::DataType(DataType::Ipv6)),
        "isUUID" => flag(RuleKind::DataType(DataType::Uuid)),
        "isDate" => flag(RuleKind::DataType(DataType::Date)),
        "isJSON" => flag(RuleKind::DataType(DataType::Json)),
        "isURL" => flag(RuleKind::DataType(DataType::Url)),
        "isNumeric" => flag(RuleKind::DataType(DataType::Numeric)),
        "unique" => flag(RuleKind::Unique),
        "safeSizeString" => count().map(RuleKind::SafeSizeString),
        "safeSizeArray" => count().map(RuleKind::SafeSizeArray),
        "safeSizeObject" => count().map(RuleKind::SafeSizeObject),
        "safeSizeJSON" | "safeSizeJson" => count().map(RuleKind::SafeSizeJson),
        "safeDepth" => count().map(RuleKind::SafeDepth),
        _ => Err(CompileError::UnknownRule {
            at: at.to_owned(),
            rule: key.to_owned(),
        }),
    }
}

/// A parsed schema description.
///
/// Accepts `{"fields": {..}, "conditions": {..}}` or a bare field map. An
/// object is read as the structured form when its `fields` key holds an
/// object and it has no keys besides `fields` and `conditions`.
/// `conditions` maps a name used by `when*` keys to a registered predicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaDescription {
    pub fields: IndexMap<String, RuleDescription>,
    pub conditions: IndexMap<String, String>,
}

impl SchemaDescription {
    pub fn parse(value: &Value) -> Result<Self, CompileError> {
        Self::parse_at(value, "")
    }

    pub fn parse_at(value: &Value, at: &str) -> Result<Self, CompileError> {
        let Value::Object(map) = value else {
            return Err(CompileError::malformed(at, "a schema is an object of fields"));
        };

        let structured = map.get("fields").is_some_and(Value::is_object)
            && map.keys().all(|k| k == "fields" || k == "conditions");
        let (fields, fields_at) = if structured {
            (map.get("fields").and_then(Value::as_object), child(at, "fields"))
        } else {
            (Some(map), at.to_owned())
        };

        let mut description = Self::default();
        for (name, rule) in fields.into_iter().flatten() {
            let rule = RuleDescription::parse_at(rule, &child(&fields_at, name))?;
            description.fields.insert(name.clone(), rule);
        }

        if structured {
            match map.get("conditions") {
                None => {}
                Some(Value::Object(conditions)) => {
                    for (name, target) in conditions {
                        let target = target.as_str().ok_or_else(|| {
                            CompileError::malformed(
                                &child(&child(at, "conditions"), name),
                                "expected the name of a registered predicate",
                            )
                        })?;
                        description.conditions.insert(name.clone(), target.to_owned());
                    }
                }
                Some(_) => {
                    return Err(CompileError::malformed(&child(at, "conditions"), "expected an object"));
                }
            }
        }
        Ok(description)
    }

    /// Renders the structured form.
    pub fn to_value(&self) -> Value {
        let fields: Map<String, Value> = self
            .fields
            .iter()
            .map(|(name, rule)| (name.clone(), rule.to_value()))
            .collect();
        let mut map = Map::new();
        map.insert("fields".into(), Value::Object(fields));
        if !self.conditions.is_empty() {
            let conditions: Map<String, Value> = self
                .conditions
                .iter()
                .map(|(name, target)| (name.clone(), Value::String(target.clone())))
                .collect();
            map.insert("conditions".into(), Value::Object(conditions));
        }
        Value::Object(map)
    }
}

//! Data-type recognition
//!
//! Format checks (`email`, `ip`, `uuid`, `date`, ...) and plain JSON type
//! checks share one [`DataType`] enum so that data-described schemas can
//! select a check by string literal through [`is_type`].

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use thiserror::Error;

use super::content::is_email_address;
use super::equality::same;
use super::predicate::{Absent, PredicateRule, rule};

/// A recognisable value kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Email,
    Ip,
    Ipv4,
    Ipv6,
    Uuid,
    Date,
    Json,
    Url,
    Numeric,
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl DataType {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 15] = [
        Self::Email,
        Self::Ip,
        Self::Ipv4,
        Self::Ipv6,
        Self::Uuid,
        Self::Date,
        Self::Json,
        Self::Url,
        Self::Numeric,
        Self::String,
        Self::Number,
        Self::Integer,
        Self::Boolean,
        Self::Array,
        Self::Object,
    ];

    /// The literal used in rule descriptions and message ids.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Ip => "ip",
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
            Self::Uuid => "uuid",
            Self::Date => "date",
            Self::Json => "json",
            Self::Url => "url",
            Self::Numeric => "numeric",
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Email => "an email address",
            Self::Ip => "an IP address",
            Self::Ipv4 => "an IPv4 address",
            Self::Ipv6 => "an IPv6 address",
            Self::Uuid => "a UUID",
            Self::Date => "a date",
            Self::Json => "a JSON string",
            Self::Url => "a URL",
            Self::Numeric => "numeric",
            Self::String => "a string",
            Self::Number => "a number",
            Self::Integer => "an integer",
            Self::Boolean => "a boolean",
            Self::Array => "an array",
            Self::Object => "an object",
        }
    }

    /// Whether `value` is of this kind.
    #[must_use]
    pub fn recognizes(self, value: &Value) -> bool {
        let text = value.as_str();
        match self {
            Self::Email => text.is_some_and(is_email_address),
            Self::Ip => text.is_some_and(|s| s.parse::<IpAddr>().is_ok()),
            Self::Ipv4 => text.is_some_and(|s| s.parse::<Ipv4Addr>().is_ok()),
            Self::Ipv6 => text.is_some_and(|s| s.parse::<Ipv6Addr>().is_ok()),
            Self::Uuid => text.is_some_and(|s| uuid::Uuid::parse_str(s).is_ok()),
            Self::Date => is_date_value(value),
            Self::Json => text.is_some_and(|s| serde_json::from_str::<Value>(s).is_ok()),
            Self::Url => text.is_some_and(is_absolute_url),
            Self::Numeric => match value {
                Value::Number(_) => true,
                Value::String(s) => s.trim().parse::<f64>().is_ok_and(f64::is_finite),
                _ => false,
            },
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => {
                value.is_i64() || value.is_u64() || value.as_f64().is_some_and(|n| n.fract() == 0.0)
            }
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no [`DataType`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown data type '{0}'")]
pub struct UnknownDataType(pub String);

impl FromStr for DataType {
    type Err = UnknownDataType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownDataType(s.to_owned()))
    }
}

fn is_date_value(value: &Value) -> bool {
    match value {
        Value::String(s) => {
            DateTime::parse_from_rfc3339(s).is_ok()
                || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
        }
        Value::Number(n) => n
            .as_i64()
            .is_some_and(|secs| DateTime::from_timestamp(secs, 0).is_some()),
        _ => false,
    }
}

fn is_absolute_url(s: &str) -> bool {
    url::Url::parse(s).is_ok_and(|url| url.has_host())
}

/// Requires a value of the given kind. Id: `validation.type.<kind>`.
pub fn is_type(kind: DataType) -> PredicateRule {
    rule(Absent::Fail, move |value, _| kind.recognizes(value))
        .message(format!("Value must be {}", kind.label()))
        .message_id(format!("validation.type.{}", kind.as_str()))
        .expected(kind.as_str())
}

pub fn is_email() -> PredicateRule {
    is_type(DataType::Email)
}

pub fn is_ip() -> PredicateRule {
    is_type(DataType::Ip)
}

pub fn is_ipv4() -> PredicateRule {
    is_type(DataType::Ipv4)
}

pub fn is_ipv6() -> PredicateRule {
    is_type(DataType::Ipv6)
}

pub fn is_uuid() -> PredicateRule {
    is_type(DataType::Uuid)
}

/// RFC 3339 timestamps, `YYYY-MM-DD` dates, or unix seconds.
pub fn is_date() -> PredicateRule {
    is_type(DataType::Date)
}

/// A string that parses as JSON.
pub fn is_json() -> PredicateRule {
    is_type(DataType::Json)
}

/// An absolute URL with a host.
pub fn is_url() -> PredicateRule {
    is_type(DataType::Url)
}

/// A number, or a string holding a finite number.
pub fn is_numeric() -> PredicateRule {
    is_type(DataType::Numeric)
}

/// Requires an array without duplicate elements.
pub fn unique() -> PredicateRule {
    rule(Absent::Fail, |value, _| {
        value.as_array().is_some_and(|items| {
            items
                .iter()
                .enumerate()
                .all(|(i, a)| items[i + 1..].iter().all(|b| !same(a, b)))
        })
    })
    .message("Array items must be unique")
    .message_id("validation.unique")
}

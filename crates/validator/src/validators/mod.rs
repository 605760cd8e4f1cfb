//! Built-in validators
//!
//! Every catalog rule is a [`PredicateRule`] built with [`rule`], so each one
//! accepts `.message(..)` and `.message_id(..)` overrides and declares how it
//! treats an absent value.
//!
//! # Categories
//!
//! - **Presence**: `required`
//! - **String / array**: `min_length`, `max_length`, `matches`, `email`
//! - **Comparison**: `equals`, `not_equals`, `min`, `max`, `one_of`, `not_one_of`
//! - **Data types**: `is_type` and its shorthands, `unique`
//! - **Guards**: `safe_size_*`, `safe_depth`
//!
//! # Examples
//!
//! ```rust,ignore
//! use gatekeeper_validator::prelude::*;
//!
//! let username = min_length(3).and(max_length(20));
//! let age = min(18).message("Adults only");
//! let role = one_of(["admin", "editor"]).optional();
//! ```

pub mod content;
pub mod datatype;
pub mod equality;
pub mod length;
pub mod nullable;
pub mod pattern;
pub mod predicate;
pub mod range;
pub mod size;

pub use content::email;
pub use datatype::{
    DataType, UnknownDataType, is_date, is_email, is_ip, is_ipv4, is_ipv6, is_json, is_numeric,
    is_type, is_url, is_uuid, unique,
};
pub use equality::{equals, not_equals, not_one_of, one_of};
pub use length::{max_length, min_length};
pub use nullable::required;
pub use pattern::matches;
pub use predicate::{
    ABSENT_ID, Absent, EVALUATION_FAILED_ID, EVALUATION_FAILED_MESSAGE, MessageOverride,
    PredicateRule, RuleFault, async_rule, custom, rule, try_rule,
};
pub use range::{max, min};
pub use size::{safe_depth, safe_size_array, safe_size_json, safe_size_object, safe_size_string};

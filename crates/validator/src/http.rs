//! HTTP request validation
//!
//! Applies up to four independent schemas to the four segments of an
//! inbound request: headers, path parameters, query parameters and body.
//! Segments without a schema are skipped. Every error path starts with the
//! segment name (`"headers"`, `"params"`, `"query"`, `"body"`).
//!
//! The validator never parses wire formats itself; callers hand it already
//! decoded JSON values. With the `http` feature, [`HttpRequest::headers_from`]
//! and [`HttpRequest::query_from_str`] cover the common decoding steps.
//!
//! # Examples
//!
//! ```rust,ignore
//! use gatekeeper_validator::prelude::*;
//! use serde_json::json;
//!
//! let schema = HttpSchema::new().body(ValidationSchema::new().field("email", email()));
//! let request = HttpRequest::new().with_body(json!({"email": "nope"}));
//!
//! let result = http_validate(&request, &schema, &HttpValidateOptions::default()).await;
//! assert_eq!(result.errors()[0].path, ["body", "email"]);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::foundation::{ValidationError, ValidationResult};
use crate::options::HttpValidateOptions;
use crate::schema::{self, ValidationSchema};

/// One of the four request segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Headers,
    Params,
    Query,
    Body,
}

impl Segment {
    /// Validation order.
    pub const ALL: [Self; 4] = [Self::Headers, Self::Params, Self::Query, Self::Body];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Headers => "headers",
            Self::Params => "params",
            Self::Query => "query",
            Self::Body => "body",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The decoded segments of an inbound request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpRequest {
    pub headers: Option<Value>,
    pub params: Option<Value>,
    pub query: Option<Value>,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_headers(mut self, headers: Value) -> Self {
        self.headers = Some(headers);
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_query(mut self, query: Value) -> Self {
        self.query = Some(query);
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn segment(&self, segment: Segment) -> Option<&Value> {
        match segment {
            Segment::Headers => self.headers.as_ref(),
            Segment::Params => self.params.as_ref(),
            Segment::Query => self.query.as_ref(),
            Segment::Body => self.body.as_ref(),
        }
    }

    /// Decodes an `application/x-www-form-urlencoded` query string into an
    /// object. A repeated key becomes an array of its values.
    pub fn query_from_str(query: &str) -> Value {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut map = Map::new();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            push_multi(&mut map, key.into_owned(), Value::String(value.into_owned()));
        }
        Value::Object(map)
    }

    /// Builds the headers segment from an `http` header map. Names are
    /// lower-cased, a header sent several times becomes an array, and
    /// values that are not visible ASCII are skipped.
    #[cfg(feature = "http")]
    pub fn headers_from(headers: &::http::HeaderMap) -> Value {
        let mut map = Map::new();
        for (name, value) in headers {
            match value.to_str() {
                Ok(text) => push_multi(&mut map, name.as_str().to_owned(), Value::String(text.to_owned())),
                Err(_) => debug!(header = %name, "non-ASCII header value skipped"),
            }
        }
        Value::Object(map)
    }
}

fn push_multi(map: &mut Map<String, Value>, key: String, value: Value) {
    match map.get_mut(&key) {
        Some(Value::Array(values)) => values.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            map.insert(key, value);
        }
    }
}

/// One optional schema per request segment.
#[derive(Debug, Clone, Default)]
pub struct HttpSchema {
    pub headers: Option<ValidationSchema>,
    pub params: Option<ValidationSchema>,
    pub query: Option<ValidationSchema>,
    pub body: Option<ValidationSchema>,
}

impl HttpSchema {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn headers(mut self, schema: ValidationSchema) -> Self {
        self.headers = Some(schema);
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn params(mut self, schema: ValidationSchema) -> Self {
        self.params = Some(schema);
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn query(mut self, schema: ValidationSchema) -> Self {
        self.query = Some(schema);
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn body(mut self, schema: ValidationSchema) -> Self {
        self.body = Some(schema);
        self
    }

    pub fn segment(&self, segment: Segment) -> Option<&ValidationSchema> {
        match segment {
            Segment::Headers => self.headers.as_ref(),
            Segment::Params => self.params.as_ref(),
            Segment::Query => self.query.as_ref(),
            Segment::Body => self.body.as_ref(),
        }
    }
}

/// Validates each request segment that has a schema, in the order headers,
/// params, query, body, and merges the findings.
///
/// With `stop_on_first_section_failure` and `collect_errors == false`, the
/// run ends after the first failing segment.
#[tracing::instrument(level = "debug", skip_all, fields(failed = tracing::field::Empty))]
pub async fn http_validate(
    request: &HttpRequest,
    schema: &HttpSchema,
    options: &HttpValidateOptions,
) -> ValidationResult {
    let mut errors: Vec<ValidationError> = Vec::new();

    for segment in Segment::ALL {
        let Some(segment_schema) = schema.segment(segment) else {
            continue;
        };
        let found = schema::collect(
            request.segment(segment),
            segment_schema,
            None,
            options.validate.collect_errors,
        )
        .await;
        if found.is_empty() {
            continue;
        }

        debug!(%segment, errors = found.len(), "request segment failed");
        errors.extend(found.into_iter().map(|e| e.prefixed(segment.as_str())));
        if options.stops_early() {
            break;
        }
    }

    tracing::Span::current().record("failed", errors.len());
    ValidationResult::from_errors(options.validate.shape(errors))
}

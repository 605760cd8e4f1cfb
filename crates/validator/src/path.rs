//! Dot-separated path resolution over JSON values.

use serde_json::Value;

/// Returns true for the paths that mean "the value itself".
#[must_use]
pub fn is_self(dot_path: &str) -> bool {
    dot_path.is_empty() || dot_path == "."
}

/// Splits a dot path into segments. The self path has none.
#[must_use]
pub fn segments(dot_path: &str) -> Vec<String> {
    if is_self(dot_path) {
        Vec::new()
    } else {
        dot_path.split('.').map(str::to_owned).collect()
    }
}

/// Resolves `dot_path` against `value`.
///
/// Object segments are keys, array segments are indices. Returns `None` as
/// soon as a segment cannot be followed.
#[must_use]
pub fn resolve<'a>(value: &'a Value, dot_path: &str) -> Option<&'a Value> {
    if is_self(dot_path) {
        return Some(value);
    }
    dot_path
        .split('.')
        .try_fold(value, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

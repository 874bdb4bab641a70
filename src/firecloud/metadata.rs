//! Dotted-path access into unstructured call metadata.
//!
//! Cromwell nests call attributes several levels deep (for example
//! `runtimeAttributes.preemptible`) and renders most runtime attributes as
//! JSON strings, so the coercion helpers accept both native and stringified
//! numbers.

use serde_json::Value;

use crate::error::{Error, Result};

/// Read a dotted path out of nested metadata, or `None` if any segment is
/// absent.
pub fn optional_field<'a>(metadata: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = metadata;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// Read a required dotted path out of nested metadata.
pub fn fetch_field<'a>(metadata: &'a Value, path: &str) -> Result<&'a Value> {
    optional_field(metadata, path).ok_or_else(|| Error::MissingField(path.to_string()))
}

/// Coerce a metadata value to an integer. Accepts numbers, stringified
/// numbers, and booleans.
pub fn field_as_i64(value: &Value, path: &str) -> Result<i64> {
    match value {
        Value::Bool(flag) => Ok(i64::from(*flag)),
        Value::Number(number) => number
            .as_i64()
            .ok_or_else(|| Error::MissingField(format!("{path}: expected an integer, got {number}"))),
        Value::String(text) => text.trim().parse().map_err(|_| {
            Error::MissingField(format!("{path}: expected an integer, got '{text}'"))
        }),
        other => Err(Error::MissingField(format!(
            "{path}: expected an integer, got {other}"
        ))),
    }
}

/// Coerce a metadata value to a string slice.
pub fn field_as_str<'a>(value: &'a Value, path: &str) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| Error::MissingField(format!("{path}: expected a string, got {value}")))
}

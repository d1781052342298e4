//! Lenient coercions applied to bound arguments.
//!
//! Clients written against the historical daemon send job ids as numbers,
//! integers as strings, and flags as any value. Handlers read their
//! arguments through these helpers.

use serde_json::Value;

use crate::blackboard::Limit;
use crate::dispatch::HandlerError;

/// Text form of an identifier; null and empty strings are absent.
pub(super) fn identifier(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => Some(text.trim().to_owned()),
        other => Some(other.to_string()),
    }
}

/// An optional string filter.
pub(super) fn optional_text(value: &Value, name: &str) -> Result<Option<String>, HandlerError> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) if text.is_empty() => Ok(None),
        Value::String(text) => Ok(Some(text.clone())),
        other => Err(HandlerError::invalid_argument(format!(
            "'{name}' must be a string, got {other}"
        ))),
    }
}

/// A required, non-empty string.
pub(super) fn required_text<'a>(value: &'a Value, name: &str) -> Result<&'a str, HandlerError> {
    match value {
        Value::String(text) if !text.is_empty() => Ok(text),
        other => Err(HandlerError::invalid_argument(format!(
            "'{name}' must be a non-empty string, got {other}"
        ))),
    }
}

/// A JSON integer or a string holding one.
pub(super) fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Row offset; anything but a non-negative integer starts at the first row.
pub(super) fn offset(value: &Value) -> usize {
    integer(value)
        .and_then(|offset| usize::try_from(offset).ok())
        .unwrap_or(0)
}

/// Row limit; anything but a non-negative integer lifts the limit.
pub(super) fn limit(value: &Value) -> Limit {
    integer(value)
        .and_then(|limit| usize::try_from(limit).ok())
        .map_or(Limit::Unbounded, Limit::AtMost)
}

/// Truth value of an arbitrary argument.
pub(super) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Non-negative priority that fits the scheduler's range.
pub(super) fn priority(value: &Value) -> Option<u32> {
    integer(value).and_then(|priority| u32::try_from(priority).ok())
}

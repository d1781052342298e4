//! Wire codec for the daemon's line-oriented JSON protocol.
//!
//! A client sends a single line holding a JSON array:
//!
//! ```json
//! ["jobs_get_list", "alice", {"limit": 5}]
//! ```
//!
//! The first element names the API method. A trailing JSON object carries
//! keyword arguments; every other element is positional. The daemon answers
//! with a single JSON value followed by `\n` and closes the connection.

mod errors;
pub mod reply;

use serde_json::{Map, Value};

pub use self::errors::DecodeError;

/// Decoded request line.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    method: String,
    args: Vec<Value>,
    kwargs: Map<String, Value>,
}

impl Request {
    /// Builds a request from its parts.
    pub fn new(method: impl Into<String>, args: Vec<Value>, kwargs: Map<String, Value>) -> Self {
        Self {
            method: method.into(),
            args,
            kwargs,
        }
    }

    /// Name of the API method being invoked.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Positional arguments in wire order.
    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Keyword arguments.
    #[must_use]
    pub fn kwargs(&self) -> &Map<String, Value> {
        &self.kwargs
    }
}

/// Decodes a request line.
///
/// `line` holds the bytes received before the terminator; trailing whitespace
/// (including a stray `\r` or `\n`) is ignored.
///
/// # Errors
///
/// Returns [`DecodeError::Malformed`] when the line is empty, is not JSON, or
/// is not a JSON array, and [`DecodeError::InvalidStructure`] when the first
/// element is missing, not a string, or empty.
pub fn decode(line: &[u8]) -> Result<Request, DecodeError> {
    let trimmed = trim_trailing_whitespace(line);
    if trimmed.is_empty() {
        return Err(DecodeError::malformed(trimmed, "empty request line"));
    }

    let value: Value =
        serde_json::from_slice(trimmed).map_err(|source| DecodeError::from_json(trimmed, source))?;
    let Value::Array(mut items) = value else {
        return Err(DecodeError::malformed(trimmed, "request is not a JSON array"));
    };

    if items.is_empty() {
        return Err(DecodeError::invalid_structure(trimmed, "missing method name"));
    }
    let method = match items.remove(0) {
        Value::String(name) if !name.is_empty() => name,
        Value::String(_) => {
            return Err(DecodeError::invalid_structure(trimmed, "method name is empty"));
        }
        _ => {
            return Err(DecodeError::invalid_structure(
                trimmed,
                "method name is not a string",
            ));
        }
    };

    let kwargs = match items.last() {
        Some(Value::Object(_)) => match items.pop() {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        },
        _ => Map::new(),
    };

    Ok(Request::new(method, items, kwargs))
}

/// Encodes a reply as a single JSON line.
#[must_use]
pub fn encode(value: &Value) -> Vec<u8> {
    let mut bytes = value.to_string().into_bytes();
    bytes.push(b'\n');
    bytes
}

fn trim_trailing_whitespace(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|byte| !byte.is_ascii_whitespace())
        .map_or(0, |index| index + 1);
    &line[..end]
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_method_and_positional_arguments() {
        let request = decode(br#"["echo", "hello"]"#).expect("decode");
        assert_eq!(request.method(), "echo");
        assert_eq!(request.args(), &[json!("hello")]);
        assert!(request.kwargs().is_empty());
    }

    #[test]
    fn trailing_object_becomes_keyword_arguments() {
        let request =
            decode(br#"["jobs_get_list", "alice", {"limit": 5, "newest_first": false}]"#)
                .expect("decode");
        assert_eq!(request.args(), &[json!("alice")]);
        assert_eq!(request.kwargs().get("limit"), Some(&json!(5)));
        assert_eq!(request.kwargs().get("newest_first"), Some(&json!(false)));
    }

    #[test]
    fn only_the_last_object_is_treated_as_keywords() {
        let request = decode(br#"["echo", {"a": 1}, "x"]"#).expect("decode");
        assert_eq!(request.args(), &[json!({"a": 1}), json!("x")]);
        assert!(request.kwargs().is_empty());
    }

    #[test]
    fn trailing_whitespace_is_ignored() {
        let request = decode(b"[\"list_methods\"]  \r\n").expect("decode");
        assert_eq!(request.method(), "list_methods");
        assert!(request.args().is_empty());
    }

    #[rstest]
    #[case::empty(b"".as_slice())]
    #[case::blank(b"   \n".as_slice())]
    #[case::not_json(b"this is not JSON".as_slice())]
    #[case::truncated(br#"["echo", "hel"#.as_slice())]
    #[case::object(br#"{"method": "echo"}"#.as_slice())]
    #[case::scalar(b"42".as_slice())]
    fn rejects_malformed_lines(#[case] line: &[u8]) {
        let error = decode(line).expect_err("line must be rejected");
        assert!(matches!(error, DecodeError::Malformed { .. }), "got {error:?}");
    }

    #[rstest]
    #[case::empty_array(b"[]".as_slice())]
    #[case::numeric_method(b"[42, 1]".as_slice())]
    #[case::empty_method(br#"["", 1]"#.as_slice())]
    fn rejects_invalid_structure(#[case] line: &[u8]) {
        let error = decode(line).expect_err("line must be rejected");
        assert!(
            matches!(error, DecodeError::InvalidStructure { .. }),
            "got {error:?}"
        );
    }

    #[test]
    fn decode_errors_keep_the_offending_text() {
        let error = decode(b"garbage\n").expect_err("garbage");
        assert_eq!(error.text(), "garbage");
    }

    #[test]
    fn encode_appends_a_single_newline() {
        let bytes = encode(&json!({"a": [1, 2, null]}));
        let text = String::from_utf8(bytes).expect("utf8");
        assert!(text.ends_with('\n'));
        assert_eq!(text.matches('\n').count(), 1);
        let parsed: Value = serde_json::from_str(text.trim_end()).expect("valid json");
        assert_eq!(parsed, json!({"a": [1, 2, null]}));
    }

    #[test]
    fn encoded_reply_round_trips_through_decode() {
        let reply = json!(["echo", "ünïcödé", 3.5, true, null]);
        let request = decode(&encode(&reply)).expect("decode");
        assert_eq!(request.method(), "echo");
        assert_eq!(request.args().len(), 4);
    }
}

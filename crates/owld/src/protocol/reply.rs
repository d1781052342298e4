//! Reply values the daemon produces on its own behalf.
//!
//! Protocol and dispatch failures are answered with a plain warning string so
//! that simple clients can print the reply verbatim. Handler failures are
//! answered with an object carrying an `error` member.

use serde_json::{Value, json};

/// Reply sent when a request line exceeds the configured size limit.
#[must_use]
pub fn too_much_data(size: usize, limit: usize) -> Value {
    Value::String(format!(
        "Warning: too much data ({size} bytes exceeds the {limit} byte limit)"
    ))
}

/// Reply sent when a request line cannot be decoded.
#[must_use]
pub fn malformed_command(text: &str) -> Value {
    Value::String(format!("Warning: ignored malformed JSON command {text}"))
}

/// Reply sent when the method is not in the registry.
#[must_use]
pub fn unsupported_command(method: &str) -> Value {
    Value::String(format!("Warning: ignored unsupported command {method}"))
}

/// Reply sent when arguments cannot be bound to the method parameters.
#[must_use]
pub fn invalid_arguments(method: &str, detail: &str) -> Value {
    Value::String(format!("Warning: invalid arguments for {method}: {detail}"))
}

/// Reply sent when a handler fails.
#[must_use]
pub fn handler_error(method: &str, kind: &str, message: &str) -> Value {
    json!({
        "error": {
            "method": method,
            "kind": kind,
            "message": message,
        }
    })
}

//! Conversion of command line words into request values.

use serde_json::{Map, Value};

use crate::errors::AppError;

/// Interprets one word: `None` is null, valid JSON is kept, anything else is
/// a string.
pub(crate) fn parse_value(word: &str) -> Value {
    if word == "None" {
        return Value::Null;
    }
    serde_json::from_str(word).unwrap_or_else(|_| Value::String(word.to_owned()))
}

/// Collects `NAME=VALUE` pairs into a keyword map; later pairs win.
pub(crate) fn parse_keywords(pairs: &[String]) -> Result<Map<String, Value>, AppError> {
    let mut keywords = Map::new();
    for pair in pairs {
        let Some((name, value)) = pair.split_once('=') else {
            return Err(AppError::InvalidKeyword(pair.clone()));
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidKeyword(pair.clone()));
        }
        keywords.insert(name.to_owned(), parse_value(value));
    }
    Ok(keywords)
}

/// Explanation of the status codes returned by the job control methods.
pub(crate) fn describe_status(code: i64) -> Option<&'static str> {
    match code {
        255 => Some("neither a job id nor an owner was given"),
        254 => Some("not a valid OWL job id"),
        253 => Some("invalid priority value"),
        _ => None,
    }
}

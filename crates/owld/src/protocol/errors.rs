//! Error types for request decoding.

use thiserror::Error;

/// Errors surfaced while decoding a request line.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The line is empty, not JSON, or not a JSON array.
    #[error("malformed request: {message}")]
    Malformed {
        text: String,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The array does not start with a non-empty method name.
    #[error("invalid request structure: {message}")]
    InvalidStructure { text: String, message: String },
}

impl DecodeError {
    pub(super) fn from_json(line: &[u8], source: serde_json::Error) -> Self {
        Self::Malformed {
            text: String::from_utf8_lossy(line).into_owned(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    pub(super) fn malformed(line: &[u8], message: impl Into<String>) -> Self {
        Self::Malformed {
            text: String::from_utf8_lossy(line).into_owned(),
            message: message.into(),
            source: None,
        }
    }

    pub(super) fn invalid_structure(line: &[u8], message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            text: String::from_utf8_lossy(line).into_owned(),
            message: message.into(),
        }
    }

    /// The request text that failed to decode.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Malformed { text, .. } | Self::InvalidStructure { text, .. } => text,
        }
    }
}

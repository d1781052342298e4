//! Error types for method dispatch.
//!
//! Dispatch failures split into two families. Unknown methods and argument
//! binding errors are protocol-level mistakes answered with a warning string.
//! Failures raised by a handler are answered with a structured error object so
//! that clients can tell them apart from ordinary results.

use serde_json::Value;
use thiserror::Error;

use crate::blackboard::StoreError;
use crate::protocol::reply;
use crate::scheduler::SchedulerError;

/// Errors surfaced while resolving and invoking a method.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The method is not in the registry.
    #[error("unsupported command {method}")]
    UnknownMethod { method: String },

    /// The arguments do not fit the method's parameters.
    #[error("invalid arguments for {method}: {source}")]
    InvalidArguments {
        method: String,
        #[source]
        source: BindError,
    },

    /// The handler ran and failed.
    #[error("{method} failed: {source}")]
    Handler {
        method: String,
        #[source]
        source: HandlerError,
    },
}

impl DispatchError {
    /// Creates an unknown method error.
    pub fn unknown_method(method: impl Into<String>) -> Self {
        Self::UnknownMethod {
            method: method.into(),
        }
    }

    /// The reply sent to the client for this error.
    #[must_use]
    pub fn reply(&self) -> Value {
        match self {
            Self::UnknownMethod { method } => reply::unsupported_command(method),
            Self::InvalidArguments { method, source } => {
                reply::invalid_arguments(method, &source.to_string())
            }
            Self::Handler { method, source } => {
                reply::handler_error(method, source.kind(), &source.to_string())
            }
        }
    }
}

/// Mismatch between supplied arguments and declared parameters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BindError {
    #[error("takes at most {expected} positional arguments but {given} were given")]
    TooManyPositional { expected: usize, given: usize },

    #[error("unexpected keyword argument '{name}'")]
    UnexpectedKeyword { name: String },

    #[error("got multiple values for argument '{name}'")]
    DuplicateArgument { name: String },

    #[error("missing required argument '{name}'")]
    MissingArgument { name: String },
}

/// Failure raised inside an API handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error(transparent)]
    Blackboard(#[from] StoreError),

    #[error("{message}")]
    InvalidArgument { message: String },

    #[error("{message}")]
    Internal { message: String },
}

impl HandlerError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Machine-readable category used in error replies.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scheduler(_) => "scheduler",
            Self::Blackboard(_) => "blackboard",
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::Internal { .. } => "internal",
        }
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(error: serde_json::Error) -> Self {
        Self::internal(format!("failed to serialise reply: {error}"))
    }
}

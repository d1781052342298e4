//! Error types for the client runtime.

use std::io;

use owl_config::EndpointError;
use thiserror::Error;

/// Failures while talking to the daemon.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Resolve(#[from] EndpointError),
    #[error("failed to connect to daemon at {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to send request to daemon: {0}")]
    SendRequest(#[source] io::Error),
    #[error("failed to read reply from daemon: {0}")]
    ReadReply(#[source] io::Error),
    #[error("daemon closed the connection without replying")]
    EmptyReply,
    #[error("failed to parse daemon reply: {0}")]
    ParseReply(#[source] serde_json::Error),
}

/// Failures surfaced by the command line runtime.
#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("keyword arguments take the form NAME=VALUE, got '{0}'")]
    InvalidKeyword(String),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("failed to render reply: {0}")]
    RenderReply(serde_json::Error),
    #[error("failed to write output: {0}")]
    WriteOutput(io::Error),
}

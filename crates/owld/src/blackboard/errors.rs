//! Error types for Blackboard access.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors surfaced while reading the Blackboard.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No snapshot file was configured.
    #[error("no blackboard snapshot is configured (set blackboard_path)")]
    NotConfigured,

    /// The snapshot could not be read.
    #[error("failed to read blackboard snapshot '{path}': {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    /// The snapshot is not a JSON array of job records.
    #[error("failed to decode blackboard snapshot '{path}': {source}")]
    Decode {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

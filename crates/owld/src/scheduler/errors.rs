//! Error types for scheduler commands.

use std::io;
use std::sync::Arc;

use thiserror::Error;

use super::classad::ClassAdError;

/// Errors surfaced while running Condor commands.
#[derive(Debug, Clone, Error)]
pub enum SchedulerError {
    /// The executable could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: Arc<io::Error>,
    },

    /// The command did not finish in time and was killed.
    #[error("{program} timed out after {timeout_secs}s")]
    Timeout { program: String, timeout_secs: u64 },

    /// Waiting for the command or reading its output failed.
    #[error("I/O error while running {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: Arc<io::Error>,
    },

    /// A query command exited unsuccessfully.
    #[error("{program} exited with status {status}")]
    Failed { program: String, status: i32 },

    /// The command output could not be read as ClassAds.
    #[error("unreadable output from {program}: {source}")]
    ClassAd {
        program: String,
        #[source]
        source: ClassAdError,
    },

    /// The command printed nothing where an ad was expected.
    #[error("{program} returned no ClassAd")]
    NoClassAd { program: String },
}

impl SchedulerError {
    pub(crate) fn spawn(program: &str, source: io::Error) -> Self {
        Self::Spawn {
            program: program.to_owned(),
            source: Arc::new(source),
        }
    }

    pub(crate) fn io(program: &str, source: io::Error) -> Self {
        Self::Io {
            program: program.to_owned(),
            source: Arc::new(source),
        }
    }
}

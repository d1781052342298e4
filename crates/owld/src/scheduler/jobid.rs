//! Condor job identifiers.
//!
//! A local id has the form `<ClusterId>.<ProcId>`. A global id adds the submit
//! host and the queue timestamp: `<submit host>#<ClusterId>.<ProcId>#<unix
//! timestamp>`. Commands addressing a global id must be sent to the scheduler
//! running on its submit host.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Reply code: neither a job id nor an owner was supplied.
pub const MISSING_TARGET: i64 = 255;
/// Reply code: the job id is neither a local nor a global id.
pub const INVALID_JOB_ID: i64 = 254;
/// Reply code: the priority is not a non-negative integer.
pub const INVALID_PRIORITY: i64 = 253;

/// A parsed local or global job id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobId {
    schedd: Option<String>,
    cluster: u64,
    proc: u64,
    queued_at: Option<i64>,
}

impl JobId {
    /// Builds a local id.
    #[must_use]
    pub fn local(cluster: u64, proc: u64) -> Self {
        Self {
            schedd: None,
            cluster,
            proc,
            queued_at: None,
        }
    }

    /// Submit host of a global id.
    #[must_use]
    pub fn schedd(&self) -> Option<&str> {
        self.schedd.as_deref()
    }

    #[must_use]
    pub fn cluster(&self) -> u64 {
        self.cluster
    }

    #[must_use]
    pub fn proc(&self) -> u64 {
        self.proc
    }

    /// `<ClusterId>.<ProcId>` form understood by the Condor tools.
    #[must_use]
    pub fn local_id(&self) -> String {
        format!("{}.{}", self.cluster, self.proc)
    }

    #[must_use]
    pub fn is_global(&self) -> bool {
        self.schedd.is_some()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.schedd, self.queued_at) {
            (Some(schedd), Some(queued_at)) => write!(
                formatter,
                "{schedd}#{}.{}#{queued_at}",
                self.cluster, self.proc
            ),
            _ => write!(formatter, "{}.{}", self.cluster, self.proc),
        }
    }
}

/// Error raised for text that is not a job id.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("'{0}' is not a valid Condor job id")]
pub struct JobIdError(pub String);

impl FromStr for JobId {
    type Err = JobIdError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || JobIdError(input.to_owned());
        let trimmed = input.trim();
        if !trimmed.contains('#') {
            let (cluster, proc) = parse_local(trimmed).ok_or_else(invalid)?;
            return Ok(Self::local(cluster, proc));
        }

        let mut tokens = trimmed.split('#');
        let (Some(schedd), Some(local), Some(stamp), None) =
            (tokens.next(), tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(invalid());
        };
        if schedd.is_empty() {
            return Err(invalid());
        }
        let (cluster, proc) = parse_local(local).ok_or_else(invalid)?;
        let queued_at = stamp.parse::<i64>().map_err(|_| invalid())?;
        Ok(Self {
            schedd: Some(schedd.to_owned()),
            cluster,
            proc,
            queued_at: Some(queued_at),
        })
    }
}

fn parse_local(text: &str) -> Option<(u64, u64)> {
    let (cluster, proc) = text.split_once('.')?;
    Some((cluster.parse().ok()?, proc.parse().ok()?))
}

/// Jobs addressed by a control command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobTarget {
    /// A single job.
    Job(JobId),
    /// Every job belonging to the owner.
    Owner(String),
}

impl JobTarget {
    /// Picks the target from the optional job id and owner.
    ///
    /// The job id wins when both are given.
    ///
    /// # Errors
    ///
    /// Returns [`MISSING_TARGET`] when both are absent and
    /// [`INVALID_JOB_ID`] when the job id does not parse.
    pub fn resolve(job_id: Option<&str>, owner: Option<&str>) -> Result<Self, i64> {
        match (job_id, owner) {
            (Some(job_id), _) => job_id
                .parse::<JobId>()
                .map(Self::Job)
                .map_err(|_| INVALID_JOB_ID),
            (None, Some(owner)) => Ok(Self::Owner(owner.to_owned())),
            (None, None) => Err(MISSING_TARGET),
        }
    }

    /// Arguments naming the target, preceded by the scheduler selector for
    /// global ids.
    pub(crate) fn command_args(&self, schedd_flag: &str) -> (Vec<String>, String) {
        match self {
            Self::Job(id) => {
                let selector = id
                    .schedd()
                    .map(|schedd| vec![schedd_flag.to_owned(), schedd.to_owned()])
                    .unwrap_or_default();
                (selector, id.local_id())
            }
            Self::Owner(owner) => (Vec::new(), owner.clone()),
        }
    }
}

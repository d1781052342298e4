//! Access to the Condor batch scheduler.
//!
//! API handlers talk to Condor through the [`Scheduler`] trait. The production
//! implementation, [`CondorScheduler`], shells out to the Condor command line
//! tools with a bounded run time.

mod classad;
mod condor;
mod errors;
mod jobid;

pub use self::classad::{ClassAd, ClassAdError, parse_classad, parse_classads, parse_value};
pub use self::condor::CondorScheduler;
pub use self::errors::SchedulerError;
pub use self::jobid::{
    INVALID_JOB_ID, INVALID_PRIORITY, JobId, JobIdError, JobTarget, MISSING_TARGET,
};

/// Tracing target for scheduler operations.
pub(crate) const SCHEDULER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::scheduler");

/// Job control actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobAction {
    /// Put jobs on hold.
    Hold,
    /// Release held jobs.
    Release,
    /// Remove jobs from the queue.
    Remove,
}

impl JobAction {
    /// Condor executable implementing the action.
    #[must_use]
    pub fn program(self) -> &'static str {
        match self {
            Self::Hold => "condor_hold",
            Self::Release => "condor_release",
            Self::Remove => "condor_rm",
        }
    }
}

/// Operations the API needs from the batch scheduler.
#[cfg_attr(test, mockall::automock)]
pub trait Scheduler: Send + Sync {
    /// Machine ads of every slot in the pool.
    fn pool(&self) -> Result<Vec<ClassAd>, SchedulerError>;

    /// Ad of the named machine, `None` when the pool does not know it.
    fn machine(&self, name: &str) -> Result<Option<ClassAd>, SchedulerError>;

    /// The scheduler daemon's own ad.
    fn schedd_stats(&self) -> Result<ClassAd, SchedulerError>;

    /// Applies `action` to `target` and returns the tool's exit code.
    fn control(&self, action: JobAction, target: &JobTarget) -> Result<i64, SchedulerError>;

    /// Sets the priority of `target` and returns the tool's exit code.
    fn set_priority(&self, priority: u32, target: &JobTarget) -> Result<i64, SchedulerError>;

    /// Current priority of a queued job, `None` when it cannot be found.
    fn priority(&self, job: &JobId) -> Result<Option<i64>, SchedulerError>;
}

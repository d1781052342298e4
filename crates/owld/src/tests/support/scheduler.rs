//! Scheduler stub with canned machine ads.

use crate::scheduler::{
    ClassAd, JobAction, JobId, JobTarget, Scheduler, SchedulerError, parse_classads,
};

/// Answers pool queries from fixed ads and accepts every control command.
pub struct StubScheduler {
    ads: Vec<ClassAd>,
}

impl StubScheduler {
    #[must_use]
    pub fn with_machines(names: &[&str]) -> Self {
        let text = names
            .iter()
            .map(|name| format!("Name = \"{name}\"\nState = \"Unclaimed\"\n"))
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            ads: parse_classads(&text).expect("stub ads"),
        }
    }
}

impl Scheduler for StubScheduler {
    fn pool(&self) -> Result<Vec<ClassAd>, SchedulerError> {
        Ok(self.ads.clone())
    }

    fn machine(&self, name: &str) -> Result<Option<ClassAd>, SchedulerError> {
        Ok(self.ads.iter().find(|ad| ad.name() == Some(name)).cloned())
    }

    fn schedd_stats(&self) -> Result<ClassAd, SchedulerError> {
        Err(SchedulerError::NoClassAd {
            program: "condor_status".to_owned(),
        })
    }

    fn control(&self, _action: JobAction, _target: &JobTarget) -> Result<i64, SchedulerError> {
        Ok(0)
    }

    fn set_priority(&self, _priority: u32, _target: &JobTarget) -> Result<i64, SchedulerError> {
        Ok(0)
    }

    fn priority(&self, _job: &JobId) -> Result<Option<i64>, SchedulerError> {
        Ok(None)
    }
}

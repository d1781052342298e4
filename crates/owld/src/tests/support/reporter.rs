//! Test double for [`HealthReporter`] that records structured events for assertions.

use std::sync::Mutex;

use owl_config::Config;

use crate::bootstrap::BootstrapError;
use crate::health::HealthReporter;
use crate::liveness::LivenessError;

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    WorkerStarted,
    WorkerStopped { processed: u64, dropped: usize },
    LivenessFailed(String),
}

impl HealthEvent {
    /// Event name as emitted by the structured reporter.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::BootstrapStarting => "bootstrap_starting",
            Self::BootstrapSucceeded => "bootstrap_succeeded",
            Self::BootstrapFailed(_) => "bootstrap_failed",
            Self::WorkerStarted => "worker_started",
            Self::WorkerStopped { .. } => "worker_stopped",
            Self::LivenessFailed(_) => "liveness_failed",
        }
    }
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    /// Number of recorded events with the given name.
    #[must_use]
    pub fn count(&self, name: &str) -> usize {
        self.events()
            .iter()
            .filter(|event| event.name() == name)
            .count()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn worker_started(&self) {
        self.record(HealthEvent::WorkerStarted);
    }

    fn worker_stopped(&self, processed: u64, dropped: usize) {
        self.record(HealthEvent::WorkerStopped { processed, dropped });
    }

    fn liveness_failed(&self, error: &LivenessError) {
        self.record(HealthEvent::LivenessFailed(error.to_string()));
    }
}

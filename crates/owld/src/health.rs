//! Structured health reporting for daemon lifecycle events.

use std::sync::Arc;

use owl_config::Config;

use crate::bootstrap::BootstrapError;
use crate::liveness::LivenessError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked when the worker loop begins serving the queue.
    fn worker_started(&self);

    /// Invoked after the worker loop exits.
    fn worker_stopped(&self, processed: u64, dropped: usize);

    /// Invoked when a keepalive datagram could not be sent.
    fn liveness_failed(&self, error: &LivenessError);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn worker_started(&self) {
        (**self).worker_started();
    }

    fn worker_stopped(&self, processed: u64, dropped: usize) {
        (**self).worker_stopped(processed, dropped);
    }

    fn liveness_failed(&self, error: &LivenessError) {
        (**self).liveness_failed(error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting daemon bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            listen = %config.listen_endpoint(),
            monitor = %config.monitor_endpoint(),
            liveness_interval_secs = config.liveness_interval().as_secs(),
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            "daemon bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "daemon bootstrap failed"
        );
    }

    fn worker_started(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "worker_started",
            "worker loop started"
        );
    }

    fn worker_stopped(&self, processed: u64, dropped: usize) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "worker_stopped",
            processed,
            dropped,
            "worker loop stopped"
        );
    }

    fn liveness_failed(&self, error: &LivenessError) {
        tracing::warn!(
            target: HEALTH_TARGET,
            event = "liveness_failed",
            error = %error,
            "failed to send liveness datagram"
        );
    }
}

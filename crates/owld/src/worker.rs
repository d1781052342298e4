//! The single dispatch loop.
//!
//! Each iteration pops at most one command, dispatches it and hands the reply
//! back to the waiting connection, then sends a keepalive datagram when one is
//! due and pauses briefly. All handler work happens on this thread in arrival
//! order.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use owl_config::Config;
use thiserror::Error;
use tracing::{debug, info};

use crate::dispatch::Dispatcher;
use crate::health::HealthReporter;
use crate::liveness::{LivenessSink, build_datagram};
use crate::queue::CommandQueue;

pub(crate) const WORKER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::worker");

/// How long one iteration waits for a command.
pub const QUEUE_TIMEOUT: Duration = Duration::from_millis(100);
/// Pause at the end of each iteration.
pub const LOOP_PAUSE: Duration = Duration::from_millis(100);

/// Timing knobs for the worker loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSettings {
    pub queue_timeout: Duration,
    pub loop_pause: Duration,
    pub liveness_interval: Duration,
    pub liveness_timeout: Duration,
}

impl WorkerSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            queue_timeout: QUEUE_TIMEOUT,
            loop_pause: LOOP_PAUSE,
            liveness_interval: config.liveness_interval(),
            liveness_timeout: config.liveness_timeout(),
        }
    }
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Tracks when the next keepalive is due. The first check is always due.
#[derive(Debug, Clone, Copy)]
struct Heartbeat {
    interval: Duration,
    last: Option<Instant>,
}

impl Heartbeat {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    fn due(&mut self, now: Instant) -> bool {
        let due = self
            .last
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval);
        if due {
            self.last = Some(now);
        }
        due
    }
}

/// Totals reported when the loop exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerSummary {
    /// Commands dispatched.
    pub processed: u64,
    /// Keepalive datagrams sent successfully.
    pub heartbeats: u64,
    /// Commands still queued at shutdown; their connections close unanswered.
    pub dropped: usize,
}

/// Errors surfaced when joining the worker thread.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("worker thread panicked")]
    ThreadPanic,
}

/// The dispatch loop and its collaborators.
pub struct WorkerLoop {
    queue: Arc<CommandQueue>,
    dispatcher: Dispatcher,
    liveness: Option<Box<dyn LivenessSink>>,
    reporter: Arc<dyn HealthReporter>,
    settings: WorkerSettings,
    shutdown: Arc<AtomicBool>,
    heartbeat: Heartbeat,
    datagram: [u8; crate::liveness::DATAGRAM_LEN],
    summary: WorkerSummary,
}

impl WorkerLoop {
    #[must_use]
    pub fn new(
        queue: Arc<CommandQueue>,
        dispatcher: Dispatcher,
        reporter: Arc<dyn HealthReporter>,
        settings: WorkerSettings,
    ) -> Self {
        Self {
            queue,
            dispatcher,
            liveness: None,
            reporter,
            settings,
            shutdown: Arc::new(AtomicBool::new(false)),
            heartbeat: Heartbeat::new(settings.liveness_interval),
            datagram: build_datagram(std::process::id(), settings.liveness_timeout.as_secs()),
            summary: WorkerSummary::default(),
        }
    }

    /// Sends keepalives to `sink` while the loop runs.
    #[must_use]
    pub fn with_liveness(mut self, sink: Box<dyn LivenessSink>) -> Self {
        self.liveness = Some(sink);
        self
    }

    /// Flag that stops the loop once raised.
    #[must_use]
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Runs one iteration and reports whether a command was dispatched.
    pub fn run_once(&mut self) -> bool {
        let dispatched = match self.queue.pop(self.settings.queue_timeout) {
            Some(command) => {
                let reply = self.dispatcher.dispatch(command.id(), command.request());
                let id = command.id();
                if !command.respond(reply) {
                    debug!(
                        target: WORKER_TARGET,
                        command_id = id.get(),
                        "client went away before the reply was ready"
                    );
                }
                self.summary.processed += 1;
                true
            }
            None => false,
        };
        self.beat(Instant::now());
        dispatched
    }

    fn beat(&mut self, now: Instant) {
        if !self.heartbeat.due(now) {
            return;
        }
        let Some(sink) = self.liveness.as_mut() else {
            return;
        };
        match sink.send(&self.datagram) {
            Ok(()) => self.summary.heartbeats += 1,
            Err(error) => self.reporter.liveness_failed(&error),
        }
    }

    /// Runs until the shutdown flag is raised, then closes the queue.
    pub fn run(mut self) -> WorkerSummary {
        self.reporter.worker_started();
        info!(
            target: WORKER_TARGET,
            liveness_interval_ms = self.settings.liveness_interval.as_millis(),
            "worker loop running"
        );
        while !self.shutdown.load(Ordering::SeqCst) {
            self.run_once();
            if !self.settings.loop_pause.is_zero() {
                thread::sleep(self.settings.loop_pause);
            }
        }
        self.stop()
    }

    fn stop(self) -> WorkerSummary {
        let pending = self.queue.close();
        let summary = WorkerSummary {
            dropped: pending.len(),
            ..self.summary
        };
        drop(pending);
        self.reporter
            .worker_stopped(summary.processed, summary.dropped);
        summary
    }

    /// Runs the loop on a dedicated thread.
    #[must_use]
    pub fn spawn(self) -> WorkerHandle {
        let shutdown = self.shutdown_flag();
        let handle = thread::spawn(move || self.run());
        WorkerHandle {
            shutdown,
            handle: Some(handle),
        }
    }
}

/// Handle to the background worker thread.
pub struct WorkerHandle {
    shutdown: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<WorkerSummary>>,
}

impl WorkerHandle {
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Waits for the loop to exit.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::ThreadPanic`] when the worker thread panicked.
    pub fn join(mut self) -> Result<WorkerSummary, WorkerError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| WorkerError::ThreadPanic),
            None => Ok(WorkerSummary::default()),
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

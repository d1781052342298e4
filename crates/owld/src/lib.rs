//! OWL daemon: a JSON command server in front of the Condor batch scheduler.
//!
//! Clients open a TCP connection, send one newline-terminated JSON array
//! `[method, arg, ..., {kwarg: value}?]` and receive one JSON line in reply.
//! Connection threads decode requests and push them onto the
//! [`queue::CommandQueue`]; a single worker thread pops them in arrival order,
//! dispatches them against the fixed method table in [`dispatch`] and hands
//! the reply back to the waiting connection.
//!
//! Between commands the worker sends `DC_CHILDALIVE` datagrams to the Condor
//! master (see [`liveness`]) so that the master keeps the daemon alive.
//!
//! Handlers reach Condor through the [`scheduler::Scheduler`] trait and the
//! job-record store through [`blackboard::JobStore`].

pub mod blackboard;
mod bootstrap;
pub mod dispatch;
mod health;
pub mod liveness;
mod process;
pub mod protocol;
pub mod queue;
pub mod scheduler;
pub mod server;
mod telemetry;
pub mod transport;
pub mod worker;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Daemon, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{
    HealthState, LaunchError, ProcessGuard, ShutdownError, ShutdownSignal, SystemShutdownSignal,
    run_daemon,
};
pub use server::{Server, ServerError, ServerHandle};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;

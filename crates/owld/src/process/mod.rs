//! Process supervision: runtime files, shutdown signals and the launch
//! sequence.
//!
//! The daemon always runs in the foreground; the Condor master starts it and
//! restarts it when it stops sending keepalives.

mod errors;
mod guard;
pub(crate) mod launch;
pub(crate) mod shutdown;

use std::time::Duration;

pub use errors::LaunchError;
pub use guard::{HealthState, ProcessGuard};
pub use launch::run_daemon;
pub use shutdown::{ShutdownError, ShutdownSignal, SystemShutdownSignal};

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
pub(crate) const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

//! Built-in defaults shared by the daemon and the client.
//!
//! The values mirror the conventions of a Condor submit node: the daemon
//! listens on every interface and reports liveness to the local
//! `condor_master` over loopback.

use crate::logging::LogFormat;

/// Default TCP port the daemon listens on.
pub const DEFAULT_PORT: u16 = 9999;

/// Default bind address for the daemon listener.
pub const DEFAULT_LISTEN_HOST: &str = "0.0.0.0";

/// Default host of the scheduler monitor receiving liveness datagrams.
pub const DEFAULT_MONITOR_HOST: &str = "127.0.0.1";

/// Default UDP port of the `condor_master` command socket.
pub const DEFAULT_MONITOR_PORT: u16 = 1271;

/// Seconds between two liveness datagrams.
pub const DEFAULT_LIVENESS_INTERVAL_SECS: u64 = 10;

/// Seconds the monitor waits for the next datagram before killing the daemon.
///
/// The monitor expects a datagram at least every third of this value.
pub const DEFAULT_LIVENESS_TIMEOUT_SECS: u64 = 30;

/// Seconds an external scheduler command may run before it is killed.
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 5;

/// Seconds the daemon waits on a silent client before dropping the connection.
pub const DEFAULT_CLIENT_TIMEOUT_SECS: u64 = 30;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the binaries.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

pub(crate) fn default_listen_host() -> String {
    DEFAULT_LISTEN_HOST.to_owned()
}

pub(crate) const fn default_listen_port() -> u16 {
    DEFAULT_PORT
}

pub(crate) fn default_monitor_host() -> String {
    DEFAULT_MONITOR_HOST.to_owned()
}

pub(crate) const fn default_monitor_port() -> u16 {
    DEFAULT_MONITOR_PORT
}

pub(crate) const fn default_liveness_interval_secs() -> u64 {
    DEFAULT_LIVENESS_INTERVAL_SECS
}

pub(crate) const fn default_liveness_timeout_secs() -> u64 {
    DEFAULT_LIVENESS_TIMEOUT_SECS
}

pub(crate) const fn default_command_timeout_secs() -> u64 {
    DEFAULT_COMMAND_TIMEOUT_SECS
}

pub(crate) const fn default_client_timeout_secs() -> u64 {
    DEFAULT_CLIENT_TIMEOUT_SECS
}

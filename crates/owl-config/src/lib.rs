//! Shared configuration for the OWL daemon and its command line client.
//!
//! Values are layered by `ortho_config`: command line flags win over `OWL_*`
//! environment variables, which win over the configuration file named by
//! `--config-path` or `OWL_CONFIG_PATH`, which wins over the built-in
//! defaults below.

mod defaults;
mod endpoint;
mod logging;
mod runtime;

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::{
    DEFAULT_CLIENT_TIMEOUT_SECS, DEFAULT_COMMAND_TIMEOUT_SECS, DEFAULT_LISTEN_HOST,
    DEFAULT_LIVENESS_INTERVAL_SECS, DEFAULT_LIVENESS_TIMEOUT_SECS, DEFAULT_LOG_FILTER,
    DEFAULT_MONITOR_HOST, DEFAULT_MONITOR_PORT, DEFAULT_PORT, default_log_filter,
    default_log_format,
};
pub use endpoint::{Endpoint, EndpointError};
pub use logging::{LogFormat, LogFormatParseError};
pub use runtime::{RuntimePaths, RuntimePathsError};

use defaults::{
    default_client_timeout_secs, default_command_timeout_secs, default_listen_host,
    default_listen_port, default_liveness_interval_secs, default_liveness_timeout_secs,
    default_log_filter_string, default_monitor_host, default_monitor_port,
};

/// Runtime configuration for `owld` and `owl`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "OWL")]
pub struct Config {
    /// Address the daemon binds its command listener to.
    #[serde(default = "default_listen_host")]
    #[ortho_config(default = default_listen_host())]
    pub listen_host: String,
    /// TCP port of the command listener.
    #[serde(default = "default_listen_port")]
    #[ortho_config(default = DEFAULT_PORT)]
    pub listen_port: u16,
    /// Upper bound on the size of a single request line.
    #[serde(default)]
    pub max_msg_bytes: Option<usize>,
    /// Upper bound on the number of rows returned by an unbounded job listing.
    #[serde(default)]
    pub max_rows: Option<usize>,
    /// Seconds between two keepalive datagrams.
    #[serde(default = "default_liveness_interval_secs")]
    #[ortho_config(default = DEFAULT_LIVENESS_INTERVAL_SECS)]
    pub liveness_interval_secs: u64,
    /// Timeout announced to the Condor master in each keepalive.
    #[serde(default = "default_liveness_timeout_secs")]
    #[ortho_config(default = DEFAULT_LIVENESS_TIMEOUT_SECS)]
    pub liveness_timeout_secs: u64,
    /// Host running the Condor master.
    #[serde(default = "default_monitor_host")]
    #[ortho_config(default = default_monitor_host())]
    pub monitor_host: String,
    /// UDP port of the Condor master.
    #[serde(default = "default_monitor_port")]
    #[ortho_config(default = DEFAULT_MONITOR_PORT)]
    pub monitor_port: u16,
    /// Seconds a Condor command may run before it is killed.
    #[serde(default = "default_command_timeout_secs")]
    #[ortho_config(default = DEFAULT_COMMAND_TIMEOUT_SECS)]
    pub command_timeout_secs: u64,
    /// Seconds a connected client may stay silent before it is dropped.
    #[serde(default = "default_client_timeout_secs")]
    #[ortho_config(default = DEFAULT_CLIENT_TIMEOUT_SECS)]
    pub client_timeout_secs: u64,
    /// Directory holding the Condor executables. `PATH` is searched when unset.
    #[serde(default)]
    pub condor_bin_dir: Option<Utf8PathBuf>,
    /// Blackboard snapshot file.
    #[serde(default)]
    pub blackboard_path: Option<Utf8PathBuf>,
    /// Override for the directory holding lock, pid, and health files.
    #[serde(default)]
    pub runtime_dir: Option<Utf8PathBuf>,
    /// `tracing_subscriber::EnvFilter` expression.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_host: default_listen_host(),
            listen_port: default_listen_port(),
            max_msg_bytes: None,
            max_rows: None,
            liveness_interval_secs: default_liveness_interval_secs(),
            liveness_timeout_secs: default_liveness_timeout_secs(),
            monitor_host: default_monitor_host(),
            monitor_port: default_monitor_port(),
            command_timeout_secs: default_command_timeout_secs(),
            client_timeout_secs: default_client_timeout_secs(),
            condor_bin_dir: None,
            blackboard_path: None,
            runtime_dir: None,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Endpoint the command listener binds to.
    #[must_use]
    pub fn listen_endpoint(&self) -> Endpoint {
        Endpoint::new(self.listen_host.clone(), self.listen_port)
    }

    /// Endpoint of the Condor master receiving keepalives.
    #[must_use]
    pub fn monitor_endpoint(&self) -> Endpoint {
        Endpoint::new(self.monitor_host.clone(), self.monitor_port)
    }

    #[must_use]
    pub fn max_msg_bytes(&self) -> Option<usize> {
        self.max_msg_bytes
    }

    #[must_use]
    pub fn max_rows(&self) -> Option<usize> {
        self.max_rows
    }

    #[must_use]
    pub fn liveness_interval(&self) -> Duration {
        Duration::from_secs(self.liveness_interval_secs)
    }

    #[must_use]
    pub fn liveness_timeout(&self) -> Duration {
        Duration::from_secs(self.liveness_timeout_secs)
    }

    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    /// How long a connection may wait for request bytes.
    #[must_use]
    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.client_timeout_secs)
    }

    #[must_use]
    pub fn condor_bin_dir(&self) -> Option<&Utf8Path> {
        self.condor_bin_dir.as_deref()
    }

    #[must_use]
    pub fn blackboard_path(&self) -> Option<&Utf8Path> {
        self.blackboard_path.as_deref()
    }

    #[must_use]
    pub fn runtime_dir(&self) -> Option<&Utf8Path> {
        self.runtime_dir.as_deref()
    }

    /// Filter expression handed to the tracing subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Rejects settings the daemon cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroDuration`] naming the first duration set to
    /// zero, or [`ConfigError::ZeroMessageLimit`] when `max_msg_bytes` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.liveness_interval_secs == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "liveness_interval_secs",
            });
        }
        if self.liveness_timeout_secs == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "liveness_timeout_secs",
            });
        }
        if self.command_timeout_secs == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "command_timeout_secs",
            });
        }
        if self.client_timeout_secs == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "client_timeout_secs",
            });
        }
        if self.max_msg_bytes == Some(0) {
            return Err(ConfigError::ZeroMessageLimit);
        }
        Ok(())
    }
}

/// Semantic configuration errors detected after loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A duration that must be positive was zero.
    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },
    /// `max_msg_bytes` was zero, which would reject every request.
    #[error("max_msg_bytes must be greater than zero when set")]
    ZeroMessageLimit,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn defaults_match_daemon_conventions() {
        let config = Config::default();
        assert_eq!(config.listen_endpoint(), Endpoint::new("0.0.0.0", 9999));
        assert_eq!(config.monitor_endpoint(), Endpoint::new("127.0.0.1", 1271));
        assert_eq!(config.liveness_interval(), Duration::from_secs(10));
        assert_eq!(config.liveness_timeout(), Duration::from_secs(30));
        assert_eq!(config.command_timeout(), Duration::from_secs(5));
        assert_eq!(config.client_timeout(), Duration::from_secs(30));
        assert_eq!(config.max_msg_bytes(), None);
        assert_eq!(config.max_rows(), None);
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
        assert_eq!(config.log_format(), LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case::interval(Config { liveness_interval_secs: 0, ..Config::default() }, "liveness_interval_secs")]
    #[case::timeout(Config { liveness_timeout_secs: 0, ..Config::default() }, "liveness_timeout_secs")]
    #[case::command(Config { command_timeout_secs: 0, ..Config::default() }, "command_timeout_secs")]
    #[case::client(Config { client_timeout_secs: 0, ..Config::default() }, "client_timeout_secs")]
    fn rejects_zero_durations(#[case] config: Config, #[case] field: &'static str) {
        let error = config.validate().expect_err("zero duration must fail");
        assert_eq!(error, ConfigError::ZeroDuration { field });
    }

    #[test]
    fn rejects_zero_message_limit() {
        let config = Config {
            max_msg_bytes: Some(0),
            ..Config::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroMessageLimit));
    }
}

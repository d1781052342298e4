//! Test configuration loaders for scenarios covering success and failure paths.

use std::ffi::OsString;
use std::sync::Arc;

use camino::Utf8PathBuf;
use ortho_config::{OrthoConfig, OrthoError};
use tempfile::TempDir;

use owl_config::Config;

use crate::bootstrap::ConfigLoader;

/// Loader that listens on an ephemeral loopback port and keeps runtime files
/// under a temporary directory.
pub struct TestConfigLoader {
    runtime_dir: TempDir,
}

impl TestConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            runtime_dir: TempDir::new().expect("failed to create temporary runtime directory"),
        }
    }

    #[must_use]
    pub fn runtime_dir(&self) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.runtime_dir.path().to_path_buf())
            .expect("temporary runtime directory was not valid UTF-8")
    }

    #[must_use]
    pub fn config(&self) -> Config {
        Config {
            listen_host: "127.0.0.1".to_owned(),
            listen_port: 0,
            runtime_dir: Some(self.runtime_dir()),
            log_filter: "owld=debug".to_owned(),
            ..Config::default()
        }
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config())
    }
}

/// Loader that intentionally fails by passing an unparsable CLI value.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("owld"),
            OsString::from("--listen-port"),
            OsString::from("not-a-port"),
        ];
        Config::load_from_iter(args)
    }
}

/// Loader whose configuration parses but fails validation.
pub struct InvalidConfigLoader;

impl ConfigLoader for InvalidConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(Config {
            liveness_interval_secs: 0,
            ..Config::default()
        })
    }
}

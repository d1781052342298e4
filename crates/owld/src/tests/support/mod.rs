//! Test harness utilities shared by the daemon behavioural suites.

mod config_loader;
mod reporter;
mod scheduler;
mod world;

pub use config_loader::{FailingConfigLoader, InvalidConfigLoader, TestConfigLoader};
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use scheduler::StubScheduler;
pub use world::{TestWorld, world};

//! Supervises daemon launch sequencing and runtime orchestration.

use std::sync::Arc;

use owl_config::RuntimePaths;
use tracing::info;

use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::dispatch::ApiContext;
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::server::Server;

use super::errors::LaunchError;
use super::guard::{HealthState, ProcessGuard};
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};
use super::{PROCESS_TARGET, SHUTDOWN_TIMEOUT};

/// Service dependencies required to construct the daemon runtime.
pub(crate) struct ServiceDeps<L> {
    pub(crate) loader: L,
    pub(crate) reporter: Arc<dyn HealthReporter>,
}

/// Collaborators required to launch the daemon runtime.
pub(crate) struct LaunchPlan<L, S> {
    pub(crate) shutdown: S,
    pub(crate) services: ServiceDeps<L>,
}

/// Runs the daemon using the production collaborators.
///
/// # Errors
///
/// Returns the first launch stage that failed.
pub fn run_daemon() -> Result<(), LaunchError> {
    let plan = LaunchPlan {
        shutdown: SystemShutdownSignal::new(SHUTDOWN_TIMEOUT),
        services: ServiceDeps {
            loader: SystemConfigLoader,
            reporter: Arc::new(StructuredHealthReporter::new()),
        },
    };
    run_daemon_with(plan)
}

/// Runs the daemon with injected collaborators.
pub(crate) fn run_daemon_with<L, S>(plan: LaunchPlan<L, S>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    S: ShutdownSignal,
{
    let LaunchPlan { shutdown, services } = plan;
    let ServiceDeps { loader, reporter } = services;

    let daemon = bootstrap_with(&loader, reporter)?;
    let (config, reporter) = daemon.into_parts();
    info!(
        target: PROCESS_TARGET,
        listen = %config.listen_endpoint(),
        "starting daemon runtime"
    );

    let runtime_paths = RuntimePaths::from_config(&config)?;
    let mut guard = ProcessGuard::acquire(runtime_paths)?;
    guard.write_pid(std::process::id())?;
    guard.write_health(HealthState::Starting)?;

    let context = ApiContext::from_config(&config);
    let server = Server::new(&config, context, reporter).start()?;

    guard.write_health(HealthState::Ready)?;
    shutdown.wait()?;
    guard.write_health(HealthState::Stopping)?;
    server.shutdown();
    server.join()?;
    info!(
        target: PROCESS_TARGET,
        "shutdown sequence completed"
    );
    Ok(())
}

//! Wiring of the listener, request channel and worker loop.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use owl_config::{Config, Endpoint};
use thiserror::Error;
use tracing::info;

use crate::dispatch::{ApiContext, ApiRegistry, Dispatcher};
use crate::health::HealthReporter;
use crate::liveness::{LivenessSink, UdpLivenessSink};
use crate::queue::{CommandIdCounter, CommandQueue};
use crate::transport::{ListenerError, ListenerHandle, RequestChannel, SocketListener};
use crate::worker::{WorkerError, WorkerHandle, WorkerLoop, WorkerSettings, WorkerSummary};

const SERVER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::server");

/// Errors surfaced while starting or stopping the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Listener(#[from] ListenerError),
    #[error(transparent)]
    Worker(#[from] WorkerError),
}

/// Liveness destination chosen for a server.
enum Liveness {
    Monitor(Endpoint),
    Sink(Box<dyn LivenessSink>),
    Disabled,
}

/// Builder for a running daemon server.
pub struct Server {
    listen: Endpoint,
    max_msg_bytes: Option<usize>,
    client_timeout: Duration,
    settings: WorkerSettings,
    liveness: Liveness,
    dispatcher: Dispatcher,
    reporter: Arc<dyn HealthReporter>,
}

impl Server {
    /// Server configured from `config`, answering the standard API.
    #[must_use]
    pub fn new(config: &Config, context: ApiContext, reporter: Arc<dyn HealthReporter>) -> Self {
        Self {
            listen: config.listen_endpoint(),
            max_msg_bytes: config.max_msg_bytes(),
            client_timeout: config.client_timeout(),
            settings: WorkerSettings::from_config(config),
            liveness: Liveness::Monitor(config.monitor_endpoint()),
            dispatcher: Dispatcher::new(ApiRegistry::standard(), Arc::new(context)),
            reporter,
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: WorkerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sends keepalives to `sink` instead of the configured monitor.
    #[must_use]
    pub fn with_liveness_sink(mut self, sink: Box<dyn LivenessSink>) -> Self {
        self.liveness = Liveness::Sink(sink);
        self
    }

    /// Runs without keepalives.
    #[must_use]
    pub fn without_liveness(mut self) -> Self {
        self.liveness = Liveness::Disabled;
        self
    }

    /// Binds the listener and starts the worker.
    ///
    /// A monitor endpoint that cannot be opened is reported and the server
    /// runs without keepalives.
    ///
    /// # Errors
    ///
    /// Fails when the listen endpoint cannot be bound.
    pub fn start(self) -> Result<ServerHandle, ServerError> {
        let listener = SocketListener::bind(&self.listen)?;
        let local_addr = listener.local_addr();

        let queue = Arc::new(CommandQueue::new());
        let ids = Arc::new(CommandIdCounter::new());
        let mut worker = WorkerLoop::new(
            Arc::clone(&queue),
            self.dispatcher,
            Arc::clone(&self.reporter),
            self.settings,
        );
        match self.liveness {
            Liveness::Monitor(endpoint) => match UdpLivenessSink::connect(&endpoint) {
                Ok(sink) => worker = worker.with_liveness(Box::new(sink)),
                Err(error) => self.reporter.liveness_failed(&error),
            },
            Liveness::Sink(sink) => worker = worker.with_liveness(sink),
            Liveness::Disabled => {}
        }

        let channel = Arc::new(
            RequestChannel::new(queue, ids, self.max_msg_bytes)
                .with_client_timeout(self.client_timeout),
        );
        let worker = worker.spawn();
        let listener = match listener.start(channel) {
            Ok(handle) => handle,
            Err(error) => {
                worker.shutdown();
                drop(worker.join());
                return Err(error.into());
            }
        };
        info!(target: SERVER_TARGET, addr = %local_addr, "daemon server started");
        Ok(ServerHandle {
            local_addr,
            listener,
            worker,
        })
    }
}

/// Handle to a running server.
pub struct ServerHandle {
    local_addr: SocketAddr,
    listener: ListenerHandle,
    worker: WorkerHandle,
}

impl ServerHandle {
    /// Address the listener is bound to.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting connections and stops the worker.
    pub fn shutdown(&self) {
        self.listener.shutdown();
        self.worker.shutdown();
    }

    /// Waits for both threads.
    ///
    /// # Errors
    ///
    /// Returns the first thread failure.
    pub fn join(self) -> Result<WorkerSummary, ServerError> {
        let Self {
            listener, worker, ..
        } = self;
        listener.join()?;
        let summary = worker.join()?;
        info!(
            target: SERVER_TARGET,
            processed = summary.processed,
            heartbeats = summary.heartbeats,
            "daemon server stopped"
        );
        Ok(summary)
    }
}

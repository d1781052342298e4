//! Method registry and the dispatcher used by the worker loop.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::protocol::Request;
use crate::queue::CommandId;

use super::api::{ApiContext, METHODS};
use super::binding::{BoundArgs, Param, bind};
use super::errors::{DispatchError, HandlerError};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Signature shared by every API handler.
pub type Handler = fn(&ApiContext, &BoundArgs) -> Result<Value, HandlerError>;

/// One entry of the method table.
#[derive(Clone, Copy)]
pub struct ApiMethod {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [Param],
    pub handler: Handler,
}

impl std::fmt::Debug for ApiMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiMethod")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Fixed table of callable methods.
///
/// Only names present in the table can be resolved; there is no fallback
/// lookup.
#[derive(Debug, Clone, Copy)]
pub struct ApiRegistry {
    methods: &'static [ApiMethod],
}

impl ApiRegistry {
    /// Registry over an explicit table.
    #[must_use]
    pub const fn new(methods: &'static [ApiMethod]) -> Self {
        Self { methods }
    }

    /// The daemon's public API.
    #[must_use]
    pub const fn standard() -> Self {
        Self::new(METHODS)
    }

    #[must_use]
    pub fn methods(&self) -> &'static [ApiMethod] {
        self.methods
    }

    /// Looks up a method by exact name.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&'static ApiMethod> {
        self.methods.iter().find(|method| method.name == name)
    }

    /// Resolves, binds and runs the request's method.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownMethod`] without running any handler
    /// when the method is not registered, [`DispatchError::InvalidArguments`]
    /// when the arguments do not fit, and [`DispatchError::Handler`] when the
    /// handler fails.
    pub fn invoke(&self, context: &ApiContext, request: &Request) -> Result<Value, DispatchError> {
        let method = self
            .resolve(request.method())
            .ok_or_else(|| DispatchError::unknown_method(request.method()))?;
        let bound = bind(method.params, request.args(), request.kwargs()).map_err(|source| {
            DispatchError::InvalidArguments {
                method: method.name.to_owned(),
                source,
            }
        })?;
        (method.handler)(context, &bound).map_err(|source| DispatchError::Handler {
            method: method.name.to_owned(),
            source,
        })
    }
}

impl Default for ApiRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Turns requests into replies.
///
/// Every request yields a reply; failures are folded into warning strings or
/// error objects.
#[derive(Clone)]
pub struct Dispatcher {
    registry: ApiRegistry,
    context: Arc<ApiContext>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(registry: ApiRegistry, context: Arc<ApiContext>) -> Self {
        Self { registry, context }
    }

    #[must_use]
    pub fn registry(&self) -> &ApiRegistry {
        &self.registry
    }

    /// Runs one command and returns its reply.
    #[must_use]
    pub fn dispatch(&self, id: CommandId, request: &Request) -> Value {
        debug!(
            target: DISPATCH_TARGET,
            command_id = id.get(),
            method = request.method(),
            "dispatching command"
        );
        match self.registry.invoke(&self.context, request) {
            Ok(reply) => reply,
            Err(error) => {
                warn!(
                    target: DISPATCH_TARGET,
                    command_id = id.get(),
                    method = request.method(),
                    %error,
                    "command failed"
                );
                error.reply()
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

//! Method dispatch for decoded requests.
//!
//! Requests name a method and carry positional and keyword arguments. The
//! [`ApiRegistry`] holds the fixed method table; each entry declares its
//! parameters so that arguments can be bound before the handler runs. The
//! [`Dispatcher`] wraps the registry for the worker loop and turns every
//! outcome into a reply value.
//!
//! ## Replies
//!
//! - success: the handler's JSON value;
//! - unknown method: `"Warning: ignored unsupported command <name>"`;
//! - argument mismatch: `"Warning: invalid arguments for <name>: <detail>"`;
//! - handler failure: `{"error": {"method": ..., "kind": ..., "message": ...}}`.

pub mod api;
mod binding;
mod errors;
mod registry;

pub use self::api::ApiContext;
pub use self::binding::{BoundArgs, Param, ParamDefault, bind};
pub use self::errors::{BindError, DispatchError, HandlerError};
pub use self::registry::{ApiMethod, ApiRegistry, Dispatcher, Handler};
pub(crate) use self::registry::DISPATCH_TARGET;

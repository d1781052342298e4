//! TCP transport for daemon requests.
//!
//! The listener accepts connections on a background thread and hands each one
//! to a [`ConnectionHandler`] on its own short-lived thread. The production
//! handler is the [`RequestChannel`], which reads one request line, queues it
//! for the worker loop and writes the reply back.

mod channel;
mod errors;
mod handler;
mod listener;
#[cfg(test)]
mod test_utils;

pub use self::channel::RequestChannel;
pub use self::errors::ListenerError;
pub use self::handler::ConnectionHandler;
pub use self::listener::{ListenerHandle, SocketListener};
#[cfg(test)]
pub(crate) use self::test_utils::CountingHandler;

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");

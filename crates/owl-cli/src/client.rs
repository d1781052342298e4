//! Blocking client for the daemon's line protocol.
//!
//! Each call opens a fresh connection, writes one JSON array terminated by a
//! newline and reads until the daemon closes the connection.

use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use owl_config::Endpoint;
use serde_json::{Map, Value};

use crate::errors::ClientError;

pub(crate) const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Message sent by [`OwlClient::is_alive`].
const PROBE: &str = "owl-probe";

/// Proxy for a remote daemon.
#[derive(Debug, Clone)]
pub struct OwlClient {
    endpoint: Endpoint,
    timeout: Duration,
}

impl OwlClient {
    #[must_use]
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            timeout: CONNECTION_TIMEOUT,
        }
    }

    /// Overrides the connection timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Encodes a request. The keyword object is always appended so that a
    /// trailing object among `args` is never mistaken for keywords.
    #[must_use]
    pub fn encode_request(method: &str, args: &[Value], kwargs: &Map<String, Value>) -> Vec<u8> {
        let mut items = Vec::with_capacity(args.len() + 2);
        items.push(Value::from(method));
        items.extend(args.iter().cloned());
        items.push(Value::Object(kwargs.clone()));
        let mut line = Value::Array(items).to_string().into_bytes();
        line.push(b'\n');
        line
    }

    /// Calls `method` and returns the decoded reply.
    ///
    /// # Errors
    ///
    /// Fails when the daemon cannot be reached, closes the connection without
    /// replying, or replies with something other than JSON.
    pub fn call(
        &self,
        method: &str,
        args: &[Value],
        kwargs: &Map<String, Value>,
    ) -> Result<Value, ClientError> {
        self.send(&Self::encode_request(method, args, kwargs))
    }

    /// Sends a pre-encoded request line.
    ///
    /// # Errors
    ///
    /// As for [`OwlClient::call`].
    pub fn send(&self, line: &[u8]) -> Result<Value, ClientError> {
        let addr = self.endpoint.resolve()?;
        let mut stream =
            TcpStream::connect_timeout(&addr, self.timeout).map_err(|source| {
                ClientError::Connect {
                    endpoint: self.endpoint.to_string(),
                    source,
                }
            })?;
        stream.write_all(line).map_err(ClientError::SendRequest)?;
        stream.flush().map_err(ClientError::SendRequest)?;
        drop(stream.shutdown(Shutdown::Write));

        let mut raw = Vec::new();
        stream
            .read_to_end(&mut raw)
            .map_err(ClientError::ReadReply)?;
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Err(ClientError::EmptyReply);
        }
        serde_json::from_slice(&raw).map_err(ClientError::ParseReply)
    }

    /// Whether the daemon echoes a probe message back unchanged.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        matches!(
            self.call("echo", &[Value::from(PROBE)], &Map::new()),
            Ok(Value::String(reply)) if reply == PROBE
        )
    }
}

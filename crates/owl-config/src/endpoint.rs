//! Network endpoints used by the daemon and its peers.

use std::fmt;
use std::net::{SocketAddr, ToSocketAddrs};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// A TCP or UDP endpoint expressed as host name and port.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Endpoint {
    /// Host name or IP address.
    pub host: String,
    /// Port number.
    pub port: u16,
}

impl Endpoint {
    /// Builds an endpoint from its parts.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Resolves the endpoint to the first IPv4 or IPv6 socket address.
    pub fn resolve(&self) -> Result<SocketAddr, EndpointError> {
        let mut addrs = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|source| EndpointError::Resolve {
                endpoint: self.to_string(),
                source,
            })?;
        addrs
            .find(|addr| matches!(addr, SocketAddr::V4(_) | SocketAddr::V6(_)))
            .ok_or_else(|| EndpointError::ResolveEmpty {
                endpoint: self.to_string(),
            })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.host, self.port)
    }
}

impl FromStr for Endpoint {
    type Err = EndpointError;

    /// Parses `tcp://host:port`, `udp://host:port` or a bare `host:port`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let candidate = if input.contains("://") {
            input.to_owned()
        } else {
            format!("tcp://{input}")
        };
        let url = Url::parse(&candidate).map_err(|source| EndpointError::Parse {
            input: input.to_owned(),
            source,
        })?;
        match url.scheme() {
            "tcp" | "udp" => {}
            other => return Err(EndpointError::UnsupportedScheme(other.to_owned())),
        }
        let host = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| EndpointError::MissingHost(input.to_owned()))?;
        let port = url
            .port()
            .ok_or_else(|| EndpointError::MissingPort(input.to_owned()))?;
        Ok(Self::new(host.trim_matches(['[', ']']), port))
    }
}

/// Errors raised while parsing or resolving an [`Endpoint`].
#[derive(Debug, Error)]
pub enum EndpointError {
    /// Scheme was not recognised.
    #[error("unsupported endpoint scheme '{0}'")]
    UnsupportedScheme(String),
    /// Host name was missing.
    #[error("missing host in '{0}'")]
    MissingHost(String),
    /// Port was missing from the address.
    #[error("missing port in '{0}'")]
    MissingPort(String),
    /// The text is not a valid endpoint URL.
    #[error("invalid endpoint '{input}': {source}")]
    Parse {
        input: String,
        #[source]
        source: url::ParseError,
    },
    /// Name resolution failed.
    #[error("failed to resolve {endpoint}: {source}")]
    Resolve {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },
    /// Name resolution returned no usable address.
    #[error("no addresses resolved for {endpoint}")]
    ResolveEmpty { endpoint: String },
}

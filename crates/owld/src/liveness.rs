//! Keepalive datagrams for the Condor master.
//!
//! The master kills children that stay silent for longer than the timeout
//! they announced. Each `DC_CHILDALIVE` datagram names the daemon's pid and
//! the timeout in seconds and resets that timer.

use std::io;
use std::net::{SocketAddr, UdpSocket};

use owl_config::{Endpoint, EndpointError};
use thiserror::Error;
use tracing::debug;

/// Daemon-core command number of `DC_CHILDALIVE`.
pub const DC_CHILDALIVE: u64 = 60008;

/// Size of an encoded datagram.
pub const DATAGRAM_LEN: usize = 24;

pub(crate) const LIVENESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::liveness");

/// Encodes `(DC_CHILDALIVE, pid, timeout_secs)` as three big-endian `u64`s.
#[must_use]
pub fn build_datagram(pid: u32, timeout_secs: u64) -> [u8; DATAGRAM_LEN] {
    let mut datagram = [0_u8; DATAGRAM_LEN];
    datagram[..8].copy_from_slice(&DC_CHILDALIVE.to_be_bytes());
    datagram[8..16].copy_from_slice(&u64::from(pid).to_be_bytes());
    datagram[16..].copy_from_slice(&timeout_secs.to_be_bytes());
    datagram
}

/// Errors raised while preparing or sending a keepalive.
#[derive(Debug, Error)]
pub enum LivenessError {
    #[error(transparent)]
    Endpoint(#[from] EndpointError),

    #[error("failed to open liveness socket: {source}")]
    Socket {
        #[source]
        source: io::Error,
    },

    #[error("failed to send liveness datagram to {addr}: {source}")]
    Send {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
}

/// Destination for keepalive datagrams.
pub trait LivenessSink: Send {
    /// Sends one datagram.
    ///
    /// # Errors
    ///
    /// Returns an error when the datagram cannot be sent. Callers treat this
    /// as non-fatal.
    fn send(&mut self, datagram: &[u8; DATAGRAM_LEN]) -> Result<(), LivenessError>;
}

/// Fire-and-forget UDP sink.
#[derive(Debug)]
pub struct UdpLivenessSink {
    socket: UdpSocket,
    addr: SocketAddr,
}

impl UdpLivenessSink {
    /// Resolves `endpoint` and opens an unbound local socket for it.
    ///
    /// # Errors
    ///
    /// Fails when the endpoint does not resolve or no socket can be opened.
    pub fn connect(endpoint: &Endpoint) -> Result<Self, LivenessError> {
        let addr = endpoint.resolve()?;
        let local: SocketAddr = if addr.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0_u16; 8], 0))
        };
        let socket = UdpSocket::bind(local).map_err(|source| LivenessError::Socket { source })?;
        Ok(Self { socket, addr })
    }

    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl LivenessSink for UdpLivenessSink {
    fn send(&mut self, datagram: &[u8; DATAGRAM_LEN]) -> Result<(), LivenessError> {
        self.socket
            .send_to(datagram, self.addr)
            .map_err(|source| LivenessError::Send {
                addr: self.addr,
                source,
            })?;
        debug!(target: LIVENESS_TARGET, addr = %self.addr, "liveness datagram sent");
        Ok(())
    }
}

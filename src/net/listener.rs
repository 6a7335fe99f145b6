//! Loopback TCP listener binding.
//!
//! # Responsibilities
//! - Bind to `127.0.0.1` on the requested port
//! - Tell "port already taken" apart from every other bind failure
//!
//! # Design Decisions
//! - Loopback only; the server is a test double, never exposed
//! - Port 0 asks the OS for an ephemeral port

use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr};

use thiserror::Error;
use tokio::net::TcpListener;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Another socket is already bound to the port.
    #[error("port {port} is already in use: {source}")]
    PortUnavailable {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// Any other bind failure.
    #[error("failed to bind: {0}")]
    Bind(#[source] std::io::Error),
}

impl ListenerError {
    fn classify(port: u16, source: std::io::Error) -> Self {
        match source.kind() {
            ErrorKind::AddrInUse => ListenerError::PortUnavailable { port, source },
            _ => ListenerError::Bind(source),
        }
    }
}

/// Loopback socket address for `port`.
pub fn loopback(port: u16) -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, port))
}

/// Bind a listener on `127.0.0.1:port`.
pub async fn bind_loopback(port: u16) -> Result<TcpListener, ListenerError> {
    let listener = TcpListener::bind(loopback(port))
        .await
        .map_err(|e| ListenerError::classify(port, e))?;

    let local_addr = listener.local_addr().map_err(ListenerError::Bind)?;

    tracing::info!(address = %local_addr, "Listener bound");
    Ok(listener)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ephemeral_port_is_loopback() {
        let listener = bind_loopback(0).await.unwrap();
        let addr = listener.local_addr().unwrap();
        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn taken_port_is_distinguishable() {
        let first = bind_loopback(0).await.unwrap();
        let port = first.local_addr().unwrap().port();

        let err = bind_loopback(port).await.unwrap_err();
        assert!(matches!(err, ListenerError::PortUnavailable { port: p, .. } if p == port));
    }

    #[test]
    fn other_errors_are_bind_errors() {
        let err = ListenerError::classify(1, std::io::Error::from(ErrorKind::PermissionDenied));
        assert!(matches!(err, ListenerError::Bind(_)));
    }
}

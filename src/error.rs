//! Crate-level error type.

use thiserror::Error;

use crate::net::listener::ListenerError;

/// Errors surfaced by the server's programmatic API.
///
/// A request that matches no route is not an error; it is answered by the
/// fallback response.
#[derive(Debug, Error)]
pub enum Error {
    /// Another listener already holds the port.
    #[error("port {port} is unavailable: {source}")]
    PortUnavailable {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// Binding failed for a reason other than the port being taken.
    #[error("failed to bind listener: {0}")]
    Bind(#[source] std::io::Error),

    /// `start` was called on a server that is already listening.
    #[error("server is already started on {0}")]
    AlreadyStarted(std::net::SocketAddr),

    /// The server was stopped and cannot be started again.
    #[error("server has been disposed")]
    Disposed,

    /// An operation that needs a running server was called before `start`.
    #[error("server has not been started")]
    NotStarted,

    /// The cancellation signal fired before the bind completed.
    #[error("server start was cancelled")]
    Cancelled,

    /// I/O failure while serving.
    #[error("transport error: {0}")]
    Transport(#[source] std::io::Error),

    /// The server URI could not be built.
    #[error("invalid server uri: {0}")]
    Uri(#[from] url::ParseError),

    /// A JSON body could not be serialized.
    #[error("failed to serialize JSON body: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// True when the failure was caused by the port already being bound.
    pub fn is_port_unavailable(&self) -> bool {
        matches!(self, Error::PortUnavailable { .. })
    }
}

impl From<ListenerError> for Error {
    fn from(err: ListenerError) -> Self {
        match err {
            ListenerError::PortUnavailable { port, source } => Error::PortUnavailable { port, source },
            ListenerError::Bind(source) => Error::Bind(source),
        }
    }
}

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::PortUnavailable { source, .. } => source,
            Error::Bind(source) | Error::Transport(source) => source,
            other => std::io::Error::other(other),
        }
    }
}

/// Convenience alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! StubServer::start(port)
//!     → listener.rs (bind 127.0.0.1:port, classify failures)
//!     → axum::serve (accept loop, HTTP/1.1 framing)
//!     → connection.rs (in-flight tracking per request)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - Bind errors are classified before they leave this layer
//! - In-flight requests are tracked so shutdown can drain them

pub mod connection;
pub mod listener;

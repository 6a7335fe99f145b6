//! HTTP handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (axum / hyper)
//!     → handler.rs (buffer body, build CapturedRequest)
//!     → dispatcher.rs (capture → route lookup → Matched | Unmatched)
//!     → handler.rs (render configured response or 404 fallback)
//!     → Send to client
//!
//! server.rs owns the whole pipeline: bind, serve task, stop.
//! ```

pub mod dispatcher;
pub mod handler;
pub mod server;

pub use dispatcher::{Dispatch, DispatchError, Dispatcher};
pub use server::StubServer;

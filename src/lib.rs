//! Programmable local HTTP server for tests.
//!
//! Register routes with canned responses, point the code under test at the
//! server, then inspect every request it received.

pub mod capture;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use capture::{CaptureLog, CapturedRequest};
pub use config::ServerConfig;
pub use error::{Error, Result};
pub use http::StubServer;
pub use routing::{ResponseConfig, RouteTable};

//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! StubServer::start:
//!     bind (cancellable) → spawn serve task watching a stop flag
//!
//! StubServer::stop:
//!     set flag → stop accepting → drain in-flight → join or abort task
//!
//! Binary (signals.rs):
//!     SIGINT/SIGTERM → StubServer::stop
//! ```
//!
//! # Design Decisions
//! - Stop is idempotent and terminal for the instance
//! - Drain and join share one deadline; the serve task is aborted after it

pub mod signals;

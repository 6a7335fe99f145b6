//! Request capture subsystem.
//!
//! # Data Flow
//! ```text
//! Transport adapter (method, path, headers, buffered body)
//!     → record.rs CapturedRequest    (immutable snapshot)
//!     → log.rs CaptureLog::append    (before any routing decision)
//!
//! Test code
//!     → CaptureLog::snapshot         (copy, safe while traffic continues)
//! ```
//!
//! # Design Decisions
//! - One log per server instance; no process-wide state
//! - Every request is captured, matched or not
//! - Capture is never rolled back, even if writing the response fails

pub mod log;
pub mod record;

pub use log::CaptureLog;
pub use record::CapturedRequest;

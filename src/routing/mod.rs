//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Test code
//!     → table.rs add_route(path)        (register / replace)
//!     → response.rs with_*(..)          (customize, any time)
//!
//! Incoming request (path, method)
//!     → table.rs lookup                 (exact path, method ignoring case)
//!     → Return: current ResponseSnapshot or None
//! ```
//!
//! # Design Decisions
//! - Exact path equality only; no prefixes, wildcards or parameters
//! - Routes stay mutable at runtime; later requests see later values
//! - Miss is an ordinary outcome, not an error

pub mod response;
pub mod table;

pub use response::{ResponseConfig, ResponseSnapshot, APPLICATION_JSON, TEXT_PLAIN};
pub use table::RouteTable;

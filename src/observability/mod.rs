//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Lifecycle and dispatch code produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout via tracing-subscriber (binary only)
//!     → Prometheus scrape endpoint (binary only, optional)
//! ```

pub mod logging;
pub mod metrics;

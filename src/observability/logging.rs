//! Structured logging.
//!
//! # Design Decisions
//! - Uses the `tracing` crate throughout the library
//! - Only the binary installs a subscriber; tests and embedding code keep
//!   whatever subscriber they already have
//! - `RUST_LOG` wins over the configured level

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive for the given level.
pub fn default_directive(level: &str) -> String {
    format!("local_web_server={level},tower_http={level}")
}

/// Install the global subscriber. Returns an error if one is already set.
pub fn init(level: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}

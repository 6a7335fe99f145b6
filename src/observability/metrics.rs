//! Metrics collection and exposition.
//!
//! # Metrics
//! - `stub_requests_total` (counter): requests by dispatch outcome
//!   (`matched`, `unmatched`, `invalid`)
//! - `stub_request_duration_seconds` (histogram): time spent in the handler
//! - `stub_captured_requests_total` (counter): records appended to any
//!   capture log in the process
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so library users
//!   pay nothing unless the binary enables the Prometheus endpoint

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one dispatched request.
pub fn record_request(outcome: &'static str, start: Instant) {
    metrics::counter!("stub_requests_total", "outcome" => outcome).increment(1);
    metrics::histogram!("stub_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Count one captured request.
pub fn record_capture() {
    metrics::counter!("stub_captured_requests_total").increment(1);
}

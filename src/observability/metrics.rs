//! Metrics collection and exposition.
//!
//! # Metrics
//! - `calc_requests_total` (counter): requests by method, status
//! - `calc_request_duration_seconds` (histogram): latency distribution
//! - `calc_bootstrap_attempts_total` (counter): startup probes by outcome
//! - `calc_sessions_total` (counter): transactions by outcome
//!
//! Recording is a no-op until `init_metrics` installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// `status` is the numeric code, or `N/A` when no response was produced.
pub fn record_request(method: &str, status: &str, elapsed: Duration) {
    counter!(
        "calc_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("calc_request_duration_seconds").record(elapsed.as_secs_f64());
}

pub fn record_bootstrap_attempt(outcome: &'static str) {
    counter!("calc_bootstrap_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_session(outcome: &'static str) {
    counter!("calc_sessions_total", "outcome" => outcome).increment(1);
}

//! Metrics collection and exposition.
//!
//! # Metrics
//! - `glz_proxy_invocations_total` (counter): invocations by route, status
//! - `glz_proxy_invocation_duration_seconds` (histogram): end-to-end latency
//! - `glz_proxy_upstream_attempts_total` (counter): attempts by outcome
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Exporter is optional and off by default

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_counter!(
                "glz_proxy_invocations_total",
                "Invocations handled, by route and status code"
            );
            describe_histogram!(
                "glz_proxy_invocation_duration_seconds",
                "End-to-end invocation latency in seconds"
            );
            describe_counter!(
                "glz_proxy_upstream_attempts_total",
                "Upstream attempts, by outcome"
            );
            tracing::info!(address = %addr, "Metrics endpoint listening");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Prometheus recorder");
        }
    }
}

/// Record a finished invocation.
pub fn record_invocation(route: &'static str, status: u16, start: Instant) {
    counter!(
        "glz_proxy_invocations_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("glz_proxy_invocation_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

/// Record one upstream attempt.
pub fn record_attempt(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("glz_proxy_upstream_attempts_total", "outcome" => outcome).increment(1);
}

//! Metrics collection and exposition.
//!
//! # Metrics
//! - `devfetch_proxy_requests_total` (counter): proxied calls by method, status
//! - `devfetch_upstream_duration_seconds` (histogram): outbound latency
//! - `devfetch_transport_errors_total` (counter): failures by error type
//! - `devfetch_history_writes_total` (counter): request log writes by outcome

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

use crate::transport::ErrorType;

/// Start the Prometheus scrape endpoint. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_proxy_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "devfetch_proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("devfetch_upstream_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_transport_error(error_type: ErrorType) {
    metrics::counter!("devfetch_transport_errors_total", "error_type" => error_type.as_str())
        .increment(1);
}

pub fn record_history_write(ok: bool) {
    let outcome = if ok { "ok" } else { "failed" };
    metrics::counter!("devfetch_history_writes_total", "outcome" => outcome).increment(1);
}

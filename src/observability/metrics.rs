//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define API metrics (requests, latency, validation failures)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `restful_requests_total` (counter): requests by method, status
//! - `restful_request_duration_seconds` (histogram): latency distribution
//! - `restful_validation_failures_total` (counter): rejected inputs by presenter
//! - `restful_errors_total` (counter): error responses by status
//!
//! # Design Decisions
//! - Recording without an installed exporter is a no-op
//! - Labels are bounded: method, status code, presenter name

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe();
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

fn describe() {
    metrics::describe_counter!("restful_requests_total", "Requests handled by the API pipeline");
    metrics::describe_histogram!(
        "restful_request_duration_seconds",
        metrics::Unit::Seconds,
        "Time spent in the API pipeline"
    );
    metrics::describe_counter!(
        "restful_validation_failures_total",
        "Requests rejected by input validation"
    );
    metrics::describe_counter!("restful_errors_total", "Error responses sent");
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let status = status.to_string();
    metrics::counter!(
        "restful_requests_total",
        "method" => method.to_string(),
        "status" => status.clone()
    )
    .increment(1);
    metrics::histogram!(
        "restful_request_duration_seconds",
        "method" => method.to_string(),
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_validation_failure(presenter: &str) {
    metrics::counter!("restful_validation_failures_total", "presenter" => presenter.to_string())
        .increment(1);
}

pub fn record_error(status: u16) {
    metrics::counter!("restful_errors_total", "status" => status.to_string()).increment(1);
}

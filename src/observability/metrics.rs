//! Metrics collection and exposition.
//!
//! # Metrics
//! - `guard_requests_total` (counter): completed requests by method, status
//! - `guard_request_duration_seconds` (histogram): request latency
//! - `guard_server_errors_total` (counter): 5xx responses
//! - `guard_auth_failures_total` (counter): recorded login failures
//! - `guard_lockouts_total` (counter): lockouts armed
//! - `guard_store_fallbacks_total` (counter): durable calls served in-process, by op
//! - `guard_error_budget_consumed_pct` (gauge): last computed budget consumption
//! - `guard_quality_score` (gauge): last composite score, 0–100
//!
//! # Design Decisions
//! - Metric updates are fire-and-forget; without an installed recorder they are no-ops
//! - Prometheus exposition on a dedicated listener

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    ::metrics::counter!(
        "guard_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("guard_request_duration_seconds").record(start.elapsed().as_secs_f64());
    if status >= 500 {
        ::metrics::counter!("guard_server_errors_total").increment(1);
    }
}

pub fn record_auth_failure() {
    ::metrics::counter!("guard_auth_failures_total").increment(1);
}

pub fn record_lockout() {
    ::metrics::counter!("guard_lockouts_total").increment(1);
}

pub fn record_store_fallback(op: &'static str) {
    ::metrics::counter!("guard_store_fallbacks_total", "op" => op).increment(1);
}

pub fn record_error_budget(consumed_pct: f64) {
    ::metrics::gauge!("guard_error_budget_consumed_pct").set(consumed_pct);
}

/// Composite scores are published on a 0–100 scale.
pub fn record_quality_score(composite: f64) {
    ::metrics::gauge!("guard_quality_score").set(composite * 100.0);
}

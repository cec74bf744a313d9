//! Per-request telemetry.
//!
//! Runs once per request after the inner service has produced its final
//! status: feeds the error budget, the correlation-coverage signal and the
//! request metrics. Coverage counts only IDs the client sent; generated IDs
//! are still logged.

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::http::request::{client_supplied_id, request_id};
use crate::http::server::AppState;
use crate::observability::metrics;

pub async fn telemetry_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let correlation_id = request_id(&request).map(str::to_owned);
    let client_correlated = client_supplied_id(&request);

    let response = next.run(request).await;
    let status = response.status().as_u16();

    state.error_budget.record(status).await;
    state.signals.record_log(client_correlated);
    metrics::record_request(&method, status, start);

    tracing::debug!(
        request_id = correlation_id.as_deref().unwrap_or("unknown"),
        method = %method,
        path = %path,
        status,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );

    response
}

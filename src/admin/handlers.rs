use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::http::server::AppState;
use crate::security::redact_identifier;
use crate::store::BackendKind;
use crate::telemetry::{DiagnosticsReport, DiagnosticsSources};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub store: BackendKind,
    pub sla_target: f64,
}

#[derive(Serialize)]
pub struct LockoutView {
    pub identifier: String,
    pub locked: bool,
    /// Unix timestamp (seconds) the lock lifts at.
    pub locked_until: Option<u64>,
}

#[derive(Serialize)]
pub struct ActionResult {
    pub status: &'static str,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        store: state.store.backend(),
        sla_target: state.error_budget.sla_target(),
    })
}

/// Audit counts come from an external audit service; none is wired in, so
/// they report "no data".
pub async fn get_diagnostics(State(state): State<AppState>) -> Json<DiagnosticsReport> {
    let report = DiagnosticsReport::collect(DiagnosticsSources {
        tracker: &state.error_budget,
        calculator: &state.quality,
        signals: &state.signals,
        audit_events_recorded: 0,
        audit_events_expected: 0,
    })
    .await;
    Json(report)
}

/// Read-only: does not count as an authentication check.
pub async fn get_lockout(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Json<LockoutView> {
    let locked_until = state.guard.locked_until(&identifier).await;
    Json(LockoutView {
        identifier,
        locked: locked_until.is_some(),
        locked_until,
    })
}

pub async fn clear_lockout(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Json<ActionResult> {
    state.guard.clear(&identifier).await;
    tracing::info!(
        identifier = %redact_identifier(&identifier),
        "Lockout cleared by operator"
    );
    Json(ActionResult { status: "cleared" })
}

pub async fn reset_error_budget(State(state): State<AppState>) -> Json<ActionResult> {
    state.error_budget.reset().await;
    Json(ActionResult { status: "reset" })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::GuardConfig;
    use crate::http::server::{AppState, HttpServer};
    use crate::store::TieredCounterStore;

    const KEY: &str = "test-admin-key";

    fn app() -> (Router, AppState) {
        let mut config = GuardConfig::default();
        config.admin.enabled = true;
        config.admin.api_key = KEY.to_string();
        let store = Arc::new(TieredCounterStore::in_process());
        let state = AppState::with_store(store, &config).unwrap();
        (HttpServer::build_router(&config, state.clone()), state)
    }

    fn admin_request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", format!("Bearer {}", KEY))
            .body(Body::empty())
            .unwrap()
    }

    async fn json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_requires_bearer_key() {
        let (app, _) = app();
        let missing = app
            .clone()
            .oneshot(Request::builder().uri("/admin/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let wrong = app
            .oneshot(
                Request::builder()
                    .uri("/admin/status")
                    .header("authorization", "Bearer nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_status() {
        let (app, _) = app();
        let response = app.oneshot(admin_request(Method::GET, "/admin/status")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["store"], "in-process");
        assert_eq!(body["sla_target"], 0.999);
    }

    #[tokio::test]
    async fn test_diagnostics_payload() {
        let (app, state) = app();
        state.error_budget.record(500).await;

        let response = app
            .oneshot(admin_request(Method::GET, "/admin/diagnostics"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["error_budget"]["failed_requests"], 1);
        assert_eq!(body["error_budget"]["budget_exhausted"], true);
        assert_eq!(body["slo_alerts"]["error_rate_breached"], true);
        assert!(body["quality_score"]["composite"].is_number());
    }

    #[tokio::test]
    async fn test_lockout_inspect_and_clear() {
        let (app, state) = app();
        for _ in 0..5 {
            state.guard.record_failure("victim@example.com").await;
        }

        let response = app
            .clone()
            .oneshot(admin_request(Method::GET, "/admin/lockouts/victim@example.com"))
            .await
            .unwrap();
        let body = json(response).await;
        assert_eq!(body["locked"], true);
        assert!(body["locked_until"].is_u64());

        let response = app
            .clone()
            .oneshot(admin_request(Method::DELETE, "/admin/lockouts/victim@example.com"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!state.guard.check("victim@example.com").await.is_locked());

        let body = json(
            app.oneshot(admin_request(Method::GET, "/admin/lockouts/victim@example.com"))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(body["locked"], false);
        assert!(body["locked_until"].is_null());
    }

    #[tokio::test]
    async fn test_lockout_lookup_does_not_touch_auth_signals() {
        let (app, state) = app();
        app.oneshot(admin_request(Method::GET, "/admin/lockouts/someone"))
            .await
            .unwrap();
        assert_eq!(state.signals.counts().auth_checks_total, 0);
    }

    #[tokio::test]
    async fn test_reset_error_budget() {
        let (app, state) = app();
        state.error_budget.record(503).await;

        let response = app
            .oneshot(admin_request(Method::POST, "/admin/error-budget/reset"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Only the reset request itself, recorded after the window was cleared.
        let snapshot = state.error_budget.snapshot().await;
        assert_eq!(snapshot.failed_requests, 0);
        assert_eq!(snapshot.total_requests, 1);
    }
}

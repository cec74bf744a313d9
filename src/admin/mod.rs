//! Admin API.
//!
//! Bearer-key protected operator endpoints, mounted on the main listener only
//! when `admin.enabled` is set.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

pub fn setup_admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/diagnostics", get(get_diagnostics))
        .route(
            "/admin/lockouts/{identifier}",
            get(get_lockout).delete(clear_lockout),
        )
        .route("/admin/error-budget/reset", post(reset_error_budget))
        .route_layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}

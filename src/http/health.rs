//! Liveness and readiness probes.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{extract::State, Json};
use serde::Serialize;

use crate::http::server::AppState;
use crate::store::BackendKind;

#[derive(Debug, Serialize)]
pub struct Liveness {
    pub status: &'static str,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
}

#[derive(Debug, Serialize)]
pub struct Readiness {
    pub status: &'static str,
    /// Counter tier selected at startup.
    pub store: BackendKind,
}

pub async fn liveness() -> Json<Liveness> {
    Json(Liveness {
        status: "ok",
        timestamp: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
    })
}

/// Always ready: the in-process tier keeps the service functional without the
/// durable store.
pub async fn readiness(State(state): State<AppState>) -> Json<Readiness> {
    Json(Readiness {
        status: "ok",
        store: state.store.backend(),
    })
}

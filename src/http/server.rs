//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the shared application state from configuration
//! - Create the Axum Router with health and admin handlers
//! - Wire up middleware (tracing, timeout, request ID, telemetry)
//! - Serve on a listener until shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::admin::setup_admin_router;
use crate::config::validation::ConfigurationError;
use crate::config::GuardConfig;
use crate::http::health;
use crate::http::middleware::telemetry_middleware;
use crate::http::request::{
    mark_client_correlation, propagate_request_id_layer, set_request_id_layer,
};
use crate::security::BruteForceGuard;
use crate::store::TieredCounterStore;
use crate::telemetry::{ErrorBudgetTracker, QualityScoreCalculator, QualitySignals};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TieredCounterStore>,
    pub error_budget: Arc<ErrorBudgetTracker>,
    pub quality: QualityScoreCalculator,
    pub guard: Arc<BruteForceGuard>,
    pub signals: Arc<QualitySignals>,
    /// Bearer key for the admin API; `None` when admin is disabled.
    pub admin_api_key: Option<Arc<str>>,
}

impl AppState {
    /// Connect the counter store and build every component on top of it.
    pub async fn from_config(config: &GuardConfig) -> Result<Self, ConfigurationError> {
        let store = Arc::new(TieredCounterStore::connect(&config.store).await);
        Self::with_store(store, config)
    }

    /// Build the components over an existing store.
    pub fn with_store(
        store: Arc<TieredCounterStore>,
        config: &GuardConfig,
    ) -> Result<Self, ConfigurationError> {
        let signals = Arc::new(QualitySignals::new());
        let error_budget = ErrorBudgetTracker::from_config(store.clone(), &config.error_budget)?;
        let guard = BruteForceGuard::from_config(store.clone(), &config.brute_force)?
            .with_signals(signals.clone());

        Ok(Self {
            store,
            error_budget: Arc::new(error_budget),
            quality: QualityScoreCalculator::from_config(&config.quality),
            guard: Arc::new(guard),
            signals,
            admin_api_key: config
                .admin
                .enabled
                .then(|| Arc::from(config.admin.api_key.as_str())),
        })
    }
}

/// HTTP server for the guard service.
pub struct HttpServer {
    router: Router,
    config: GuardConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and state.
    pub fn new(config: GuardConfig, state: AppState) -> Self {
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(config: &GuardConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/health", get(health::liveness))
            .route("/health/ready", get(health::readiness));

        if state.admin_api_key.is_some() {
            router = router.merge(setup_admin_router(state.clone()));
        }

        Self::with_layers(router, config, state)
    }

    /// Wrap `routes` in the middleware stack.
    ///
    /// Outermost last: the client-correlation marker runs before an ID is
    /// generated, the ID is assigned before tracing and telemetry see the
    /// request, and timeouts answer 503 so telemetry counts them as failures.
    fn with_layers(routes: Router<AppState>, config: &GuardConfig, state: AppState) -> Router {
        let timeout = Duration::from_secs(config.timeouts.request_secs);
        routes
            .with_state(state.clone())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::SERVICE_UNAVAILABLE,
                timeout,
            ))
            .layer(middleware::from_fn_with_state(state, telemetry_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
            .layer(middleware::from_fn(mark_client_correlation))
    }

    /// Clone of the fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server on `listener` until Ctrl+C or a shutdown broadcast.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            admin_enabled = self.config.admin.enabled,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }
}

/// Resolve on Ctrl+C or when the shutdown coordinator fires (or is dropped).
async fn shutdown_signal(mut shutdown: broadcast::Receiver<()>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = ctrl_c => {}
        _ = shutdown.recv() => {}
    }
    tracing::info!("Shutdown signal received");
}

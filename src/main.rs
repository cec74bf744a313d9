//! Reliability guard service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request id ─▶ trace ─▶ telemetry ─▶ timeout ─▶ handler
//!                                              │
//!                                              ▼
//!                                     ErrorBudgetTracker ──┐
//!                                     BruteForceGuard ─────┤
//!                                                          ▼
//!                                              TieredCounterStore
//!                                              ┌──────────┬────────────┐
//!                                              │ durable  │ in-process │
//!                                              │ (RESP)   │ (fallback) │
//!                                              └──────────┴────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use reliability_guard::config::loader::{apply_env_overrides, load_config};
use reliability_guard::config::GuardConfig;
use reliability_guard::observability::{logging, metrics};
use reliability_guard::{AppState, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "reliability-guard")]
#[command(about = "Error budget, quality score and login lockout service", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GuardConfig::default(),
    };
    let config = apply_env_overrides(config)?;

    logging::init_logging(&config.observability);
    tracing::info!("reliability-guard v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        sla_target = config.error_budget.sla_target,
        max_attempts = config.brute_force.max_attempts,
        lockout_secs = config.brute_force.lockout_secs,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let state = AppState::from_config(&config).await?;
    tracing::info!(store = %state.store.backend(), "Counter store ready");

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening");

    let shutdown = Shutdown::default();
    let server = HttpServer::new(config, state);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

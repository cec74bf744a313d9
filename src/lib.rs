//! Reliability guard library.
//!
//! Error-budget tracking, quality scoring and brute-force lockout over a
//! durable-first counter store that silently degrades to in-process state.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod store;
pub mod telemetry;

pub use config::schema::GuardConfig;
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;
pub use security::{BruteForceGuard, LockoutStatus};
pub use store::TieredCounterStore;
pub use telemetry::{DiagnosticsReport, ErrorBudgetTracker, QualityScoreCalculator};

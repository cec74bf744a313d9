//! HTTP surface.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers)
//!     → request.rs (assign / propagate x-request-id)
//!     → middleware/telemetry.rs (error budget, metrics, correlation coverage)
//!     → health.rs | admin handlers
//!     → Send to client
//! ```

pub mod health;
pub mod middleware;
pub mod request;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};

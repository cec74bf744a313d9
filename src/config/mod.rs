//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → GuardConfig (validated, immutable)
//!     → handed to component constructors at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; thresholds never change under a running tracker
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::GuardConfig;
pub use schema::{
    AdminConfig, BruteForceConfig, ErrorBudgetConfig, ListenerConfig, ObservabilityConfig,
    QualityConfig, StoreConfig, TimeoutConfig,
};
pub use validation::ConfigurationError;

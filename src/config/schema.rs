//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GuardConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Counter store (durable backend + fallback) settings.
    pub store: StoreConfig,

    /// Error budget settings.
    pub error_budget: ErrorBudgetConfig,

    /// Latency inputs for the quality score.
    pub quality: QualityConfig,

    /// Login lockout policy.
    pub brute_force: BruteForceConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Counter store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Durable backend URL (e.g., "redis://127.0.0.1:6379/0").
    /// Absent means in-process counters only.
    pub url: Option<String>,

    /// Deadline for the construction-time liveness probe in milliseconds.
    pub probe_timeout_ms: u64,

    /// Deadline for each durable operation in milliseconds.
    pub op_timeout_ms: u64,

    /// Maximum idle connections kept to the durable backend.
    pub pool_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            probe_timeout_ms: 500,
            op_timeout_ms: 500,
            pool_size: 8,
        }
    }
}

/// Error budget configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ErrorBudgetConfig {
    /// Availability target, strictly between 0 and 1 (e.g., 0.999).
    pub sla_target: f64,

    /// Namespace for this tracker's keys in the durable store.
    pub key_prefix: String,
}

impl Default for ErrorBudgetConfig {
    fn default() -> Self {
        Self {
            sla_target: 0.999,
            key_prefix: "app".to_string(),
        }
    }
}

/// Measured latencies fed into the quality score and SLO alerts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Current p95 latency in milliseconds.
    pub current_p95_ms: f64,

    /// Latency at which the performance pillar reaches zero.
    pub target_latency_ms: f64,

    /// Current p99 latency in milliseconds.
    pub current_p99_ms: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            current_p95_ms: 200.0,
            target_latency_ms: 500.0,
            current_p99_ms: 0.0,
        }
    }
}

/// Brute-force lockout policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BruteForceConfig {
    /// Failures within the window that trigger a lockout.
    pub max_attempts: u32,

    /// Lockout duration, also the rolling failure window, in seconds.
    pub lockout_secs: u64,
}

impl Default for BruteForceConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lockout_secs: 900,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Placeholder key shipped in the defaults; refused when admin is enabled.
pub const PLACEHOLDER_API_KEY: &str = "CHANGE_ME_IN_PRODUCTION";

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: PLACEHOLDER_API_KEY.to_string(),
        }
    }
}

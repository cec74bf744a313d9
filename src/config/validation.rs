//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (SLA target, timeouts, lockout policy)
//! - Check addresses and URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GuardConfig → Result<(), Vec<ConfigurationError>>
//! - The same checks back the component constructors, so an invalid value is
//!   fatal whether it comes from a file or from code

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{GuardConfig, PLACEHOLDER_API_KEY};
use crate::store::resp::ServerAddr;

/// Upper bound for store deadlines; the request path must never stall longer.
pub const MAX_STORE_TIMEOUT_MS: u64 = 5_000;

/// A configuration value that cannot be accepted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("sla_target must be between 0 and 1 exclusive, got {0}")]
    InvalidSlaTarget(f64),

    #[error("{field} must be between 1 and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u64,
        max: u64,
    },

    #[error("{field} must be a finite, non-negative number, got {value}")]
    InvalidLatency { field: &'static str, value: f64 },

    #[error("{field} '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("store.url is invalid: {0}")]
    InvalidStoreUrl(String),

    #[error("error_budget.key_prefix must not be empty")]
    EmptyKeyPrefix,

    #[error("admin.api_key must be changed before enabling the admin API")]
    PlaceholderApiKey,
}

/// Check an SLA target lies strictly inside (0, 1).
pub fn validate_sla_target(sla_target: f64) -> Result<f64, ConfigurationError> {
    if sla_target > 0.0 && sla_target < 1.0 {
        Ok(sla_target)
    } else {
        Err(ConfigurationError::InvalidSlaTarget(sla_target))
    }
}

fn check_range(
    errors: &mut Vec<ConfigurationError>,
    field: &'static str,
    value: u64,
    max: u64,
) {
    if value == 0 || value > max {
        errors.push(ConfigurationError::OutOfRange { field, value, max });
    }
}

fn check_latency(errors: &mut Vec<ConfigurationError>, field: &'static str, value: f64) {
    if !value.is_finite() || value < 0.0 {
        errors.push(ConfigurationError::InvalidLatency { field, value });
    }
}

fn check_address(errors: &mut Vec<ConfigurationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ConfigurationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GuardConfig) -> Result<(), Vec<ConfigurationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);

    if let Some(url) = config.store.url.as_deref().filter(|u| !u.trim().is_empty()) {
        if let Err(e) = ServerAddr::parse(url) {
            errors.push(ConfigurationError::InvalidStoreUrl(e.to_string()));
        }
    }
    let store = &config.store;
    let max_ms = MAX_STORE_TIMEOUT_MS;
    check_range(&mut errors, "store.probe_timeout_ms", store.probe_timeout_ms, max_ms);
    check_range(&mut errors, "store.op_timeout_ms", store.op_timeout_ms, max_ms);
    check_range(&mut errors, "store.pool_size", store.pool_size as u64, 1_024);

    if let Err(e) = validate_sla_target(config.error_budget.sla_target) {
        errors.push(e);
    }
    if config.error_budget.key_prefix.trim().is_empty() {
        errors.push(ConfigurationError::EmptyKeyPrefix);
    }

    check_latency(&mut errors, "quality.current_p95_ms", config.quality.current_p95_ms);
    check_latency(&mut errors, "quality.target_latency_ms", config.quality.target_latency_ms);
    check_latency(&mut errors, "quality.current_p99_ms", config.quality.current_p99_ms);

    let max_attempts = u64::from(config.brute_force.max_attempts);
    check_range(&mut errors, "brute_force.max_attempts", max_attempts, 1_000);
    check_range(&mut errors, "brute_force.lockout_secs", config.brute_force.lockout_secs, 86_400);

    check_range(&mut errors, "timeouts.request_secs", config.timeouts.request_secs, 3_600);

    if config.observability.metrics_enabled {
        let address = &config.observability.metrics_address;
        check_address(&mut errors, "observability.metrics_address", address);
    }

    if config.admin.enabled && config.admin.api_key == PLACEHOLDER_API_KEY {
        errors.push(ConfigurationError::PlaceholderApiKey);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

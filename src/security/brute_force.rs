//! Brute-force login protection.
//!
//! # States
//! - Clean: no record for the identifier
//! - Accumulating: 1..max_attempts-1 failures inside the rolling window
//! - Locked: lock timestamp armed, failure counter deleted
//!
//! # State Transitions
//! ```text
//! Clean → Accumulating: record_failure
//! Accumulating → Locked: failures reach max_attempts
//! Locked → Clean: clear(), or the lock timestamp passes (checked lazily)
//! ```
//!
//! # Design Decisions
//! - Every failure re-arms the counter expiry (rolling window)
//! - Storage trouble degrades to the in-process tier, never to "no lockout"
//! - A lock is reported as a value, not an error; the caller picks the response

use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::config::validation::ConfigurationError;
use crate::config::BruteForceConfig;
use crate::observability::metrics;
use crate::store::TieredCounterStore;
use crate::telemetry::QualitySignals;

const KEY_PREFIX: &str = "brute_force:";

/// Stable machine-readable code for a locked account.
pub const ACCOUNT_LOCKED: &str = "ACCOUNT_LOCKED";

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

fn count_key(identifier: &str) -> String {
    format!("{}{}:count", KEY_PREFIX, identifier)
}

fn lock_key(identifier: &str) -> String {
    format!("{}{}:locked_until", KEY_PREFIX, identifier)
}

/// Log-safe stand-in for a login identifier.
///
/// Identifiers are usually emails; logs get a short fingerprint that is
/// stable within a process, enough to correlate events for one account.
pub fn redact_identifier(identifier: &str) -> String {
    let mut hasher = DefaultHasher::new();
    identifier.hash(&mut hasher);
    format!("id#{:08x}", hasher.finish() as u32)
}

/// Outcome of a lockout check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LockoutStatus {
    Allowed,
    /// Locked until the given Unix timestamp (seconds).
    Locked { until: u64 },
}

impl LockoutStatus {
    pub fn is_locked(&self) -> bool {
        matches!(self, LockoutStatus::Locked { .. })
    }

    /// `Err(AccountLocked)` when locked, so login handlers can use `?`.
    pub fn into_result(self) -> Result<(), AccountLocked> {
        match self {
            LockoutStatus::Allowed => Ok(()),
            LockoutStatus::Locked { .. } => Err(AccountLocked),
        }
    }
}

/// Rejection rendered as 429 with the `ACCOUNT_LOCKED` code and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountLocked;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: &'static str,
}

impl IntoResponse for AccountLocked {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: ACCOUNT_LOCKED,
                message: "Too many failed attempts. Account temporarily locked.",
            },
        };
        (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response()
    }
}

/// Per-identifier failure counter and lockout.
#[derive(Debug)]
pub struct BruteForceGuard {
    store: Arc<TieredCounterStore>,
    max_attempts: u32,
    lockout: Duration,
    signals: Option<Arc<QualitySignals>>,
}

impl BruteForceGuard {
    /// Guard with the default policy: 5 failures, 15 minute lockout.
    pub fn new(store: Arc<TieredCounterStore>) -> Self {
        Self {
            store,
            max_attempts: 5,
            lockout: Duration::from_secs(900),
            signals: None,
        }
    }

    pub fn from_config(
        store: Arc<TieredCounterStore>,
        config: &BruteForceConfig,
    ) -> Result<Self, ConfigurationError> {
        if config.max_attempts == 0 {
            return Err(ConfigurationError::OutOfRange {
                field: "brute_force.max_attempts",
                value: 0,
                max: 1_000,
            });
        }
        if config.lockout_secs == 0 {
            return Err(ConfigurationError::OutOfRange {
                field: "brute_force.lockout_secs",
                value: 0,
                max: 86_400,
            });
        }
        Ok(Self {
            store,
            max_attempts: config.max_attempts,
            lockout: Duration::from_secs(config.lockout_secs),
            signals: None,
        })
    }

    /// Report every `check` outcome into `signals`.
    pub fn with_signals(mut self, signals: Arc<QualitySignals>) -> Self {
        self.signals = Some(signals);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Lock expiry for `identifier`, if a lock is currently in force.
    pub async fn locked_until(&self, identifier: &str) -> Option<u64> {
        self.store
            .get(&lock_key(identifier))
            .await
            .filter(|until| *until > now_secs())
            .map(|until| until as u64)
    }

    /// Call before verifying credentials.
    pub async fn check(&self, identifier: &str) -> LockoutStatus {
        let status = match self.locked_until(identifier).await {
            Some(until) => LockoutStatus::Locked { until },
            None => LockoutStatus::Allowed,
        };
        if let Some(signals) = &self.signals {
            signals.record_auth_check(!status.is_locked());
        }
        status
    }

    /// Call after a failed credential check. Returns `Locked` when this
    /// failure armed the lockout.
    pub async fn record_failure(&self, identifier: &str) -> LockoutStatus {
        metrics::record_auth_failure();
        let count_key = count_key(identifier);
        let failures = self.store.incr_with_expiry(&count_key, self.lockout).await;

        if failures < i64::from(self.max_attempts) {
            tracing::debug!(failures, max_attempts = self.max_attempts, "Login failure recorded");
            return LockoutStatus::Allowed;
        }

        let until = now_secs() + self.lockout.as_secs() as i64;
        self.store
            .set_with_expiry(&lock_key(identifier), until, self.lockout)
            .await;
        self.store.delete(&[&count_key]).await;

        metrics::record_lockout();
        tracing::warn!(
            failures,
            lockout_secs = self.lockout.as_secs(),
            "Account locked after repeated login failures"
        );
        LockoutStatus::Locked { until: until as u64 }
    }

    /// Call after a successful login. Idempotent.
    pub async fn clear(&self, identifier: &str) {
        self.store
            .delete(&[&count_key(identifier), &lock_key(identifier)])
            .await;
    }
}

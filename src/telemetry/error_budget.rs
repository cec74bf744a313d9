//! Error budget tracking against an availability target.
//!
//! Every completed request is counted; 5xx responses consume the budget,
//! 4xx responses are counted separately so abuse spikes can be alerted on
//! without being mistaken for unavailability.
//!
//! ```text
//! SLA      allowed downtime per month
//! 99.9%    43.8 min
//! 99.95%   21.9 min
//! 99.99%    4.4 min
//! ```

use std::sync::Arc;

use serde::Serialize;

use crate::config::validation::{validate_sla_target, ConfigurationError};
use crate::config::ErrorBudgetConfig;
use crate::store::{BackendKind, TieredCounterStore};
use crate::telemetry::round_to;

/// Point-in-time view of SLA health.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetSnapshot {
    pub sla_target: f64,
    pub total_requests: u64,
    /// 5xx responses; these consume the budget.
    pub failed_requests: u64,
    /// 4xx responses; tracked, never consume the budget.
    pub client_errors: u64,
    pub observed_availability: f64,
    /// Share of the allowed errors already used, 0–100.
    pub budget_consumed_pct: f64,
    pub budget_exhausted: bool,
    /// Tier that served the counter reads.
    pub backend: BackendKind,
}

/// Keys of one tracker's counters in the shared keyspace.
#[derive(Debug, Clone)]
struct BudgetKeys {
    total: String,
    failed: String,
    client_errors: String,
}

impl BudgetKeys {
    fn new(prefix: &str) -> Self {
        Self {
            total: format!("error_budget:{}:total", prefix),
            failed: format!("error_budget:{}:failed", prefix),
            client_errors: format!("error_budget:{}:client_errors", prefix),
        }
    }
}

/// Counts request outcomes and reports error budget consumption.
#[derive(Debug)]
pub struct ErrorBudgetTracker {
    store: Arc<TieredCounterStore>,
    sla_target: f64,
    keys: BudgetKeys,
}

impl ErrorBudgetTracker {
    /// Create a tracker. Fails when `sla_target` is not strictly inside (0, 1).
    pub fn new(
        store: Arc<TieredCounterStore>,
        sla_target: f64,
        key_prefix: &str,
    ) -> Result<Self, ConfigurationError> {
        let sla_target = validate_sla_target(sla_target)?;
        Ok(Self {
            store,
            sla_target,
            keys: BudgetKeys::new(key_prefix),
        })
    }

    pub fn from_config(
        store: Arc<TieredCounterStore>,
        config: &ErrorBudgetConfig,
    ) -> Result<Self, ConfigurationError> {
        Self::new(store, config.sla_target, &config.key_prefix)
    }

    pub fn sla_target(&self) -> f64 {
        self.sla_target
    }

    /// Record one completed request by its final status code.
    pub async fn record(&self, status_code: u16) {
        // Total first, so a concurrent snapshot never sees failed > total.
        self.store.incr(&self.keys.total).await;
        match status_code {
            500.. => {
                self.store.incr(&self.keys.failed).await;
            }
            400..=499 => {
                self.store.incr(&self.keys.client_errors).await;
            }
            _ => {}
        }
    }

    /// Compute the current budget state.
    pub async fn snapshot(&self) -> BudgetSnapshot {
        // Read the subsets before the total, mirroring the write order in `record`.
        let failed = self.read_counter(&self.keys.failed).await.0;
        let client_errors = self.read_counter(&self.keys.client_errors).await.0;
        let (total, backend) = self.read_counter(&self.keys.total).await;

        if total == 0 {
            return BudgetSnapshot {
                sla_target: self.sla_target,
                total_requests: 0,
                failed_requests: 0,
                client_errors: 0,
                observed_availability: 1.0,
                budget_consumed_pct: 0.0,
                budget_exhausted: false,
                backend,
            };
        }

        let failed = failed.min(total);
        let client_errors = client_errors.min(total - failed);

        let total_f = total as f64;
        let availability = (total - failed) as f64 / total_f;
        let allowed_error_rate = 1.0 - self.sla_target;
        let actual_error_rate = failed as f64 / total_f;
        let consumed = (actual_error_rate / allowed_error_rate * 100.0).min(100.0);
        let budget_consumed_pct = round_to(consumed, 2);

        BudgetSnapshot {
            sla_target: self.sla_target,
            total_requests: total,
            failed_requests: failed,
            client_errors,
            observed_availability: round_to(availability, 6),
            budget_consumed_pct,
            budget_exhausted: budget_consumed_pct >= 100.0,
            backend,
        }
    }

    /// Zero all counters in both tiers, starting a new SLA window.
    pub async fn reset(&self) {
        self.store
            .delete(&[&self.keys.total, &self.keys.failed, &self.keys.client_errors])
            .await;
        tracing::info!(sla_target = self.sla_target, "Error budget window reset");
    }

    async fn read_counter(&self, key: &str) -> (u64, BackendKind) {
        let (value, backend) = self.store.read(key).await;
        (value.unwrap_or(0).max(0) as u64, backend)
    }
}

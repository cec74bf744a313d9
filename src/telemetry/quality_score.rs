//! Risk-weighted quality score and SLO breach evaluation.
//!
//! ```text
//! Pillar           Weight
//! security          40%
//! data_integrity    20%
//! reliability       15%
//! auditability      15%
//! performance        5%
//! (reserved)         5%
//! ```
//!
//! The composite is normalised by the 95% actually assigned, so a perfect run
//! scores 1.0. A composite below 0.70 should block production deployments.

use serde::Serialize;

use crate::config::QualityConfig;
use crate::telemetry::round_to;

/// Composite score required to pass the production gate.
pub const PRODUCTION_GATE: f64 = 0.70;

pub const SLO_P95_LATENCY_MS: f64 = 200.0;
pub const SLO_P99_LATENCY_MS: f64 = 500.0;
pub const SLO_ERROR_RATE_PCT: f64 = 0.1;
pub const CLIENT_ERROR_SPIKE_PCT: f64 = 5.0;

const WEIGHT_SECURITY: f64 = 0.40;
const WEIGHT_DATA_INTEGRITY: f64 = 0.20;
const WEIGHT_RELIABILITY: f64 = 0.15;
const WEIGHT_AUDITABILITY: f64 = 0.15;
const WEIGHT_PERFORMANCE: f64 = 0.05;
const WEIGHT_SUM: f64 = 0.95;

/// Runtime signals feeding the score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityInput {
    pub auth_checks_passed: u64,
    pub auth_checks_total: u64,
    pub audit_events_recorded: u64,
    pub audit_events_expected: u64,
    /// Observed availability, normally taken from a budget snapshot.
    pub availability: f64,
    pub logs_with_correlation_id: u64,
    pub total_logs: u64,
}

impl Default for QualityInput {
    /// No data anywhere: every pillar reads as compliant.
    fn default() -> Self {
        Self {
            auth_checks_passed: 0,
            auth_checks_total: 0,
            audit_events_recorded: 0,
            audit_events_expected: 0,
            availability: 1.0,
            logs_with_correlation_id: 0,
            total_logs: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PillarScore {
    pub score: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pillars {
    pub security: PillarScore,
    pub data_integrity: PillarScore,
    pub reliability: PillarScore,
    pub auditability: PillarScore,
    pub performance: PillarScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityScoreResult {
    pub composite: f64,
    pub passes_gate: bool,
    pub production_gate_threshold: f64,
    pub pillars: Pillars,
}

/// Independent SLO breach flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SloAlert {
    pub any_breach: bool,
    pub p95_latency_breached: bool,
    pub p99_latency_breached: bool,
    pub error_rate_breached: bool,
    pub client_error_spike: bool,
}

impl SloAlert {
    pub fn new(
        p95_latency_breached: bool,
        p99_latency_breached: bool,
        error_rate_breached: bool,
        client_error_spike: bool,
    ) -> Self {
        Self {
            any_breach: p95_latency_breached
                || p99_latency_breached
                || error_rate_breached
                || client_error_spike,
            p95_latency_breached,
            p99_latency_breached,
            error_rate_breached,
            client_error_spike,
        }
    }
}

/// Stateless scorer parameterised by measured latencies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityScoreCalculator {
    current_p95_ms: f64,
    target_latency_ms: f64,
    current_p99_ms: f64,
}

impl Default for QualityScoreCalculator {
    fn default() -> Self {
        Self::new(200.0, 500.0, 0.0)
    }
}

impl QualityScoreCalculator {
    pub fn new(current_p95_ms: f64, target_latency_ms: f64, current_p99_ms: f64) -> Self {
        Self {
            current_p95_ms,
            target_latency_ms,
            current_p99_ms,
        }
    }

    pub fn from_config(config: &QualityConfig) -> Self {
        Self::new(
            config.current_p95_ms,
            config.target_latency_ms,
            config.current_p99_ms,
        )
    }

    /// `numerator / denominator` clamped to [0, 1]; no data counts as compliant.
    pub fn ratio(numerator: f64, denominator: f64) -> f64 {
        if denominator <= 0.0 {
            return 1.0;
        }
        (numerator / denominator).clamp(0.0, 1.0)
    }

    /// 1.0 at zero latency, falling linearly to 0.0 at the target.
    pub fn latency_score(&self) -> f64 {
        if self.target_latency_ms <= 0.0 {
            return 1.0;
        }
        (1.0 - self.current_p95_ms / self.target_latency_ms).clamp(0.0, 1.0)
    }

    pub fn calculate(&self, input: &QualityInput) -> QualityScoreResult {
        let security = Self::ratio(
            input.auth_checks_passed as f64,
            input.auth_checks_total as f64,
        );
        let data_integrity = Self::ratio(
            input.audit_events_recorded as f64,
            input.audit_events_expected as f64,
        );
        let reliability = if input.availability.is_nan() {
            0.0
        } else {
            input.availability.clamp(0.0, 1.0)
        };
        let auditability = Self::ratio(
            input.logs_with_correlation_id as f64,
            input.total_logs as f64,
        );
        let performance = self.latency_score();

        let raw = security * WEIGHT_SECURITY
            + data_integrity * WEIGHT_DATA_INTEGRITY
            + reliability * WEIGHT_RELIABILITY
            + auditability * WEIGHT_AUDITABILITY
            + performance * WEIGHT_PERFORMANCE;
        let composite = round_to(raw / WEIGHT_SUM, 4);

        QualityScoreResult {
            composite,
            passes_gate: composite >= PRODUCTION_GATE,
            production_gate_threshold: PRODUCTION_GATE,
            pillars: Pillars {
                security: PillarScore {
                    score: security,
                    weight: WEIGHT_SECURITY,
                },
                data_integrity: PillarScore {
                    score: data_integrity,
                    weight: WEIGHT_DATA_INTEGRITY,
                },
                reliability: PillarScore {
                    score: reliability,
                    weight: WEIGHT_RELIABILITY,
                },
                auditability: PillarScore {
                    score: auditability,
                    weight: WEIGHT_AUDITABILITY,
                },
                performance: PillarScore {
                    score: performance,
                    weight: WEIGHT_PERFORMANCE,
                },
            },
        }
    }

    /// Compare counters and the configured latencies against fixed SLOs.
    pub fn slo_alert(
        &self,
        failed_requests: u64,
        client_errors: u64,
        total_requests: u64,
    ) -> SloAlert {
        let (error_rate_pct, client_error_pct) = if total_requests > 0 {
            let total = total_requests as f64;
            (
                failed_requests as f64 / total * 100.0,
                client_errors as f64 / total * 100.0,
            )
        } else {
            (0.0, 0.0)
        };

        SloAlert::new(
            self.current_p95_ms > SLO_P95_LATENCY_MS,
            self.current_p99_ms > SLO_P99_LATENCY_MS,
            error_rate_pct > SLO_ERROR_RATE_PCT,
            client_error_pct > CLIENT_ERROR_SPIKE_PCT,
        )
    }
}

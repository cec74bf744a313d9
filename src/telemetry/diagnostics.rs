//! Diagnostics payload assembly.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::observability::metrics;
use crate::telemetry::error_budget::{BudgetSnapshot, ErrorBudgetTracker};
use crate::telemetry::quality_score::{
    QualityInput, QualityScoreCalculator, QualityScoreResult, SloAlert,
};
use crate::telemetry::signals::QualitySignals;

/// Everything a diagnostics report is computed from.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticsSources<'a> {
    pub tracker: &'a ErrorBudgetTracker,
    pub calculator: &'a QualityScoreCalculator,
    pub signals: &'a QualitySignals,
    /// Audit events written, as reported by the audit service.
    pub audit_events_recorded: u64,
    /// Audit events that should have been written.
    pub audit_events_expected: u64,
}

/// Serialized body of the admin diagnostics endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticsReport {
    pub status: &'static str,
    /// Seconds since the Unix epoch.
    pub generated_at: u64,
    pub error_budget: BudgetSnapshot,
    pub quality_score: QualityScoreResult,
    pub slo_alerts: SloAlert,
}

impl DiagnosticsReport {
    /// Snapshot the tracker, score it, and publish the headline gauges.
    pub async fn collect(sources: DiagnosticsSources<'_>) -> Self {
        let snapshot = sources.tracker.snapshot().await;
        let counts = sources.signals.counts();

        let input = QualityInput {
            auth_checks_passed: counts.auth_checks_passed,
            auth_checks_total: counts.auth_checks_total,
            audit_events_recorded: sources.audit_events_recorded,
            audit_events_expected: sources.audit_events_expected,
            availability: snapshot.observed_availability,
            logs_with_correlation_id: counts.logs_with_correlation_id,
            total_logs: counts.total_logs,
        };
        let quality_score = sources.calculator.calculate(&input);
        let slo_alerts = sources.calculator.slo_alert(
            snapshot.failed_requests,
            snapshot.client_errors,
            snapshot.total_requests,
        );

        metrics::record_error_budget(snapshot.budget_consumed_pct);
        metrics::record_quality_score(quality_score.composite);
        if slo_alerts.any_breach {
            tracing::warn!(
                error_rate = slo_alerts.error_rate_breached,
                client_errors = slo_alerts.client_error_spike,
                p95 = slo_alerts.p95_latency_breached,
                p99 = slo_alerts.p99_latency_breached,
                "SLO breach detected"
            );
        }

        Self {
            status: "ok",
            generated_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            error_budget: snapshot,
            quality_score,
            slo_alerts,
        }
    }
}

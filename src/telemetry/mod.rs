//! Reliability telemetry.
//!
//! # Data Flow
//! ```text
//! completed request
//!     → error_budget.rs (record status into tiered counters)
//!
//! diagnostics request
//!     → error_budget.rs (snapshot)
//!     → quality_score.rs (composite score, gate, SLO alerts)
//!     → diagnostics.rs (serializable report)
//! ```
//!
//! # Design Decisions
//! - Snapshots are recomputed on every call, never cached
//! - Quality scoring is a pure function of its inputs
//! - Absence of data reads as compliant, avoiding cold-start false alarms

pub mod diagnostics;
pub mod error_budget;
pub mod quality_score;
pub mod signals;

pub use diagnostics::{DiagnosticsReport, DiagnosticsSources};
pub use error_budget::{BudgetSnapshot, ErrorBudgetTracker};
pub use quality_score::{QualityInput, QualityScoreCalculator, QualityScoreResult, SloAlert};
pub use signals::QualitySignals;

/// Round half away from zero to `places` decimal places.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::round_to;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(99.99999999999991, 2), 100.0);
        assert_eq!(round_to(0.57894736, 4), 0.5789);
        assert_eq!(round_to(0.9989994, 6), 0.998999);
    }
}

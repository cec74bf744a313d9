//! Live counters feeding the quality score pillars.

use std::sync::atomic::{AtomicU64, Ordering};

/// Process-local compliance signals.
///
/// Relaxed ordering is sufficient: each counter is read independently and
/// only feeds a best-effort ratio.
#[derive(Debug, Default)]
pub struct QualitySignals {
    auth_checks_passed: AtomicU64,
    auth_checks_total: AtomicU64,
    logs_with_correlation_id: AtomicU64,
    total_logs: AtomicU64,
}

/// A consistent-enough copy of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalCounts {
    pub auth_checks_passed: u64,
    pub auth_checks_total: u64,
    pub logs_with_correlation_id: u64,
    pub total_logs: u64,
}

impl QualitySignals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a pre-authentication lockout check.
    pub fn record_auth_check(&self, passed: bool) {
        self.auth_checks_total.fetch_add(1, Ordering::Relaxed);
        if passed {
            self.auth_checks_passed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record one request log line and whether it carried a correlation ID.
    pub fn record_log(&self, has_correlation_id: bool) {
        self.total_logs.fetch_add(1, Ordering::Relaxed);
        if has_correlation_id {
            self.logs_with_correlation_id.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn counts(&self) -> SignalCounts {
        SignalCounts {
            auth_checks_passed: self.auth_checks_passed.load(Ordering::Relaxed),
            auth_checks_total: self.auth_checks_total.load(Ordering::Relaxed),
            logs_with_correlation_id: self.logs_with_correlation_id.load(Ordering::Relaxed),
            total_logs: self.total_logs.load(Ordering::Relaxed),
        }
    }
}

//! Durable backend contract.

use std::time::Duration;

use crate::store::types::StoreResult;

/// Operations a cross-process counter backend must provide.
///
/// Implementations are expected to be atomic per operation, in particular
/// `incr_with_expiry` must increment and refresh the expiry as one step.
#[async_trait::async_trait]
pub trait CounterBackend: Send + Sync {
    /// Lightweight liveness check used by the construction-time probe.
    async fn ping(&self) -> StoreResult<()>;

    /// Increment a counter, creating it at zero first. Existing expiry is kept.
    async fn incr(&self, key: &str) -> StoreResult<i64>;

    /// Increment a counter and (re)arm its expiry.
    async fn incr_with_expiry(&self, key: &str, ttl: Duration) -> StoreResult<i64>;

    /// Read a counter. Absent or expired keys read as `None`.
    async fn get(&self, key: &str) -> StoreResult<Option<i64>>;

    /// Overwrite a value with an expiry.
    async fn set_with_expiry(&self, key: &str, value: i64, ttl: Duration) -> StoreResult<()>;

    /// Delete keys. Missing keys are not an error.
    async fn delete(&self, keys: &[&str]) -> StoreResult<()>;
}

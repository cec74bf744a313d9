//! Durable-first counter store with silent in-process fallback.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::config::StoreConfig;
use crate::observability::metrics;
use crate::store::backend::CounterBackend;
use crate::store::local::LocalStore;
use crate::store::resp::RespBackend;
use crate::store::types::{BackendKind, StoreError, StoreResult};

/// Counter store shared by the error-budget tracker and the brute-force guard.
///
/// When a durable backend passed the construction-time probe, every operation
/// first tries it under `op_timeout`. Any error or timeout falls through to the
/// in-process tier for that one call; the next call tries the durable backend
/// again. Construction and operations never fail.
pub struct TieredCounterStore {
    durable: Option<Arc<dyn CounterBackend>>,
    local: LocalStore,
    op_timeout: Duration,
}

impl TieredCounterStore {
    /// A store that only ever uses in-process state.
    pub fn in_process() -> Self {
        Self {
            durable: None,
            local: LocalStore::new(),
            op_timeout: Duration::ZERO,
        }
    }

    /// Build a store from configuration, probing the durable backend if a URL
    /// is configured.
    pub async fn connect(config: &StoreConfig) -> Self {
        let Some(url) = config.url.as_deref().filter(|u| !u.trim().is_empty()) else {
            tracing::info!(backend = %BackendKind::InProcess, "No durable store configured");
            return Self::in_process();
        };

        match RespBackend::from_url(url, config.pool_size) {
            Ok(backend) => {
                Self::with_backend(
                    Arc::new(backend),
                    Duration::from_millis(config.probe_timeout_ms),
                    Duration::from_millis(config.op_timeout_ms),
                )
                .await
            }
            Err(e) => {
                tracing::warn!(error = %e, "Durable store URL rejected, using in-process counters");
                Self::in_process()
            }
        }
    }

    /// Probe `backend` and keep it if it answers within `probe_timeout`.
    pub async fn with_backend(
        backend: Arc<dyn CounterBackend>,
        probe_timeout: Duration,
        op_timeout: Duration,
    ) -> Self {
        let probe = match timeout(probe_timeout, backend.ping()).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(probe_timeout.as_millis() as u64)),
        };

        let durable = match probe {
            Ok(()) => {
                tracing::info!(backend = %BackendKind::Durable, "Durable store reachable");
                Some(backend)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Durable store probe failed, using in-process counters");
                None
            }
        };

        Self {
            durable,
            local: LocalStore::new(),
            op_timeout,
        }
    }

    /// The tier selected at construction.
    pub fn backend(&self) -> BackendKind {
        if self.durable.is_some() {
            BackendKind::Durable
        } else {
            BackendKind::InProcess
        }
    }

    /// Direct access to the fallback tier.
    pub fn local(&self) -> &LocalStore {
        &self.local
    }

    /// Run one durable operation under the deadline. `None` means fall back.
    async fn attempt<T, F>(&self, op: &'static str, fut: F) -> Option<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        let error = match timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => return Some(value),
            Ok(Err(e)) => e,
            Err(_) => StoreError::Timeout(self.op_timeout.as_millis() as u64),
        };
        tracing::debug!(
            op,
            error = %error,
            "Durable store call failed, falling back to in-process tier"
        );
        metrics::record_store_fallback(op);
        None
    }

    /// Increment `key`, keeping any existing expiry.
    pub async fn incr(&self, key: &str) -> i64 {
        if let Some(durable) = &self.durable {
            if let Some(n) = self.attempt("incr", durable.incr(key)).await {
                return n;
            }
        }
        self.local.incr(key, None)
    }

    /// Atomically increment `key` and re-arm its expiry.
    pub async fn incr_with_expiry(&self, key: &str, ttl: Duration) -> i64 {
        if let Some(durable) = &self.durable {
            if let Some(n) = self
                .attempt("incr_with_expiry", durable.incr_with_expiry(key, ttl))
                .await
            {
                return n;
            }
        }
        self.local.incr(key, Some(ttl))
    }

    /// Read `key` and report which tier answered.
    pub async fn read(&self, key: &str) -> (Option<i64>, BackendKind) {
        if let Some(durable) = &self.durable {
            if let Some(value) = self.attempt("get", durable.get(key)).await {
                return (value, BackendKind::Durable);
            }
        }
        (self.local.get(key), BackendKind::InProcess)
    }

    /// Read `key`.
    pub async fn get(&self, key: &str) -> Option<i64> {
        self.read(key).await.0
    }

    /// Overwrite `key` with `value` for `ttl`.
    pub async fn set_with_expiry(&self, key: &str, value: i64, ttl: Duration) {
        if let Some(durable) = &self.durable {
            if self
                .attempt("set_with_expiry", durable.set_with_expiry(key, value, ttl))
                .await
                .is_some()
            {
                return;
            }
        }
        self.local.set(key, value, Some(ttl));
    }

    /// Delete keys from both tiers.
    ///
    /// Earlier fallbacks may have left state in the in-process tier, so it is
    /// purged even when the durable delete succeeds.
    pub async fn delete(&self, keys: &[&str]) {
        if let Some(durable) = &self.durable {
            self.attempt("delete", durable.delete(keys)).await;
        }
        self.local.delete(keys);
    }
}

impl std::fmt::Debug for TieredCounterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredCounterStore")
            .field("backend", &self.backend())
            .field("op_timeout", &self.op_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Backend that answers the probe, then fails while `down` is set.
    struct SwitchableBackend {
        local: LocalStore,
        down: AtomicBool,
    }

    impl SwitchableBackend {
        fn new() -> Self {
            Self {
                local: LocalStore::new(),
                down: AtomicBool::new(false),
            }
        }

        fn check(&self) -> StoreResult<()> {
            if self.down.load(Ordering::SeqCst) {
                Err(StoreError::Closed)
            } else {
                Ok(())
            }
        }
    }

    #[async_trait::async_trait]
    impl CounterBackend for SwitchableBackend {
        async fn ping(&self) -> StoreResult<()> {
            self.check()
        }
        async fn incr(&self, key: &str) -> StoreResult<i64> {
            self.check()?;
            Ok(self.local.incr(key, None))
        }
        async fn incr_with_expiry(&self, key: &str, ttl: Duration) -> StoreResult<i64> {
            self.check()?;
            Ok(self.local.incr(key, Some(ttl)))
        }
        async fn get(&self, key: &str) -> StoreResult<Option<i64>> {
            self.check()?;
            Ok(self.local.get(key))
        }
        async fn set_with_expiry(&self, key: &str, value: i64, ttl: Duration) -> StoreResult<()> {
            self.check()?;
            self.local.set(key, value, Some(ttl));
            Ok(())
        }
        async fn delete(&self, keys: &[&str]) -> StoreResult<()> {
            self.check()?;
            self.local.delete(keys);
            Ok(())
        }
    }

    /// Backend whose calls never complete.
    struct HangingBackend;

    #[async_trait::async_trait]
    impl CounterBackend for HangingBackend {
        async fn ping(&self) -> StoreResult<()> {
            Ok(())
        }
        async fn incr(&self, _key: &str) -> StoreResult<i64> {
            std::future::pending().await
        }
        async fn incr_with_expiry(&self, _key: &str, _ttl: Duration) -> StoreResult<i64> {
            std::future::pending().await
        }
        async fn get(&self, _key: &str) -> StoreResult<Option<i64>> {
            std::future::pending().await
        }
        async fn set_with_expiry(
            &self,
            _key: &str,
            _value: i64,
            _ttl: Duration,
        ) -> StoreResult<()> {
            std::future::pending().await
        }
        async fn delete(&self, _keys: &[&str]) -> StoreResult<()> {
            std::future::pending().await
        }
    }

    fn millis(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[tokio::test]
    async fn test_in_process_store() {
        let store = TieredCounterStore::in_process();
        assert_eq!(store.backend(), BackendKind::InProcess);
        assert_eq!(store.incr("k").await, 1);
        assert_eq!(store.read("k").await, (Some(1), BackendKind::InProcess));
    }

    #[tokio::test]
    async fn test_unconfigured_url_selects_in_process() {
        let config = StoreConfig::default();
        let store = TieredCounterStore::connect(&config).await;
        assert_eq!(store.backend(), BackendKind::InProcess);
    }

    #[tokio::test]
    async fn test_bad_url_selects_in_process() {
        let config = StoreConfig {
            url: Some("http://not-redis".into()),
            ..StoreConfig::default()
        };
        let store = TieredCounterStore::connect(&config).await;
        assert_eq!(store.backend(), BackendKind::InProcess);
    }

    #[tokio::test]
    async fn test_durable_preferred_when_healthy() {
        let backend = Arc::new(SwitchableBackend::new());
        let store =
            TieredCounterStore::with_backend(backend.clone(), millis(100), millis(100)).await;
        assert_eq!(store.backend(), BackendKind::Durable);

        store.incr("k").await;
        store.incr("k").await;
        assert_eq!(backend.local.get("k"), Some(2));
        assert_eq!(store.local().get("k"), None);
        assert_eq!(store.read("k").await, (Some(2), BackendKind::Durable));
    }

    #[tokio::test]
    async fn test_failed_probe_selects_in_process() {
        let backend = Arc::new(SwitchableBackend::new());
        backend.down.store(true, Ordering::SeqCst);
        let store = TieredCounterStore::with_backend(backend, millis(100), millis(100)).await;
        assert_eq!(store.backend(), BackendKind::InProcess);
    }

    #[tokio::test]
    async fn test_per_call_fallback_and_recovery() {
        let backend = Arc::new(SwitchableBackend::new());
        let store =
            TieredCounterStore::with_backend(backend.clone(), millis(100), millis(100)).await;

        backend.down.store(true, Ordering::SeqCst);
        assert_eq!(store.incr("k").await, 1);
        assert_eq!(store.local().get("k"), Some(1));
        assert_eq!(store.read("k").await, (Some(1), BackendKind::InProcess));

        // The durable tier is retried on the next call, not abandoned.
        backend.down.store(false, Ordering::SeqCst);
        assert_eq!(store.incr("k").await, 1);
        assert_eq!(store.read("k").await, (Some(1), BackendKind::Durable));
        assert_eq!(store.backend(), BackendKind::Durable);
    }

    #[tokio::test]
    async fn test_hanging_backend_times_out() {
        let store =
            TieredCounterStore::with_backend(Arc::new(HangingBackend), millis(100), millis(50))
                .await;
        assert_eq!(store.backend(), BackendKind::Durable);

        let started = std::time::Instant::now();
        assert_eq!(store.incr_with_expiry("k", Duration::from_secs(60)).await, 1);
        store.set_with_expiry("lock", 7, Duration::from_secs(60)).await;
        assert_eq!(store.get("lock").await, Some(7));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_delete_purges_both_tiers() {
        let backend = Arc::new(SwitchableBackend::new());
        let store =
            TieredCounterStore::with_backend(backend.clone(), millis(100), millis(100)).await;

        backend.down.store(true, Ordering::SeqCst);
        store.incr("k").await;
        backend.down.store(false, Ordering::SeqCst);
        store.incr("k").await;

        store.delete(&["k"]).await;
        assert_eq!(backend.local.get("k"), None);
        assert_eq!(store.local().get("k"), None);
    }
}

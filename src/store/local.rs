//! In-process fallback tier.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Writes between sweeps of expired entries.
const PURGE_INTERVAL: u64 = 256;

#[derive(Debug, Clone, Copy)]
struct Entry {
    value: i64,
    expires_at: Option<Instant>,
}

impl Entry {
    fn empty() -> Self {
        Self {
            value: 0,
            expires_at: None,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// A thread-safe counter map private to this process.
///
/// Every mutation goes through the map's entry API, which holds the shard lock
/// for the key, so concurrent increments on the same key are never lost and
/// operations on keys in different shards never contend. Expired entries
/// are treated as absent, dropped when next touched, and swept every
/// `PURGE_INTERVAL` writes so keys that are never read again do not pile up.
#[derive(Debug, Default)]
pub struct LocalStore {
    entries: DashMap<String, Entry>,
    writes: AtomicU64,
}

impl LocalStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment `key`. With a `ttl` the expiry is re-armed, otherwise the
    /// existing expiry (if any) is kept.
    pub fn incr(&self, key: &str, ttl: Option<Duration>) -> i64 {
        let now = Instant::now();
        let value = {
            let mut entry = self
                .entries
                .entry(key.to_string())
                .or_insert_with(Entry::empty);

            if entry.is_expired(now) {
                *entry = Entry::empty();
            }
            entry.value += 1;
            if let Some(ttl) = ttl {
                entry.expires_at = Some(now + ttl);
            }
            entry.value
        };
        // The shard guard must be released before sweeping.
        self.note_write();
        value
    }

    /// Read `key`, treating expired entries as absent.
    pub fn get(&self, key: &str) -> Option<i64> {
        let now = Instant::now();
        let live = self
            .entries
            .get(key)
            .map(|entry| (!entry.is_expired(now)).then_some(entry.value));

        match live {
            Some(Some(value)) => Some(value),
            Some(None) => {
                self.entries.remove_if(key, |_, entry| entry.is_expired(now));
                None
            }
            None => None,
        }
    }

    /// Overwrite `key` with `value`, expiring after `ttl` when given.
    pub fn set(&self, key: &str, value: i64, ttl: Option<Duration>) {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        self.entries
            .insert(key.to_string(), Entry { value, expires_at });
        self.note_write();
    }

    /// Delete keys. Missing keys are ignored.
    pub fn delete(&self, keys: &[&str]) {
        for key in keys {
            self.entries.remove(*key);
        }
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            tracing::debug!(removed, "Purged expired in-process entries");
        }
        removed
    }

    fn note_write(&self) {
        let writes = self.writes.fetch_add(1, Ordering::Relaxed) + 1;
        if writes % PURGE_INTERVAL == 0 {
            self.purge_expired();
        }
    }

    /// Number of entries currently held, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

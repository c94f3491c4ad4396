//! A small TTL cache with per-key single-flight refresh.
//!
//! Entries are never evicted on expiry: a stale value stays retrievable via
//! [`SnapshotCache::get_any`] so callers can degrade to the last known
//! snapshot when the upstream is unreachable. Freshness is always judged
//! against the TTL the caller passes in.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::time::{Duration, Instant};

struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

/// Shared-read, single-writer-per-key snapshot store.
pub struct SnapshotCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    refresh_locks: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K, V> SnapshotCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            refresh_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the value for `key` if it is younger than `ttl`.
    pub async fn get_fresh(&self, key: &K, ttl: Duration) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < ttl)
            .map(|entry| entry.value.clone())
    }

    /// Returns the value for `key` regardless of age.
    pub async fn get_any(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        entries.get(key).map(|entry| entry.value.clone())
    }

    /// Stores a freshly computed value under `key`.
    pub async fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Returns the refresh mutex for `key`.
    ///
    /// Callers hold the guard across a refresh so concurrent misses for the
    /// same key coalesce onto one upstream call instead of stampeding. After
    /// acquiring it, re-check freshness: the previous holder may have
    /// repopulated the entry already.
    pub async fn refresh_guard(&self, key: &K) -> Arc<Mutex<()>> {
        let mut locks = self.refresh_locks.lock().await;
        locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

impl<K, V> Default for SnapshotCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

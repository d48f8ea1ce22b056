use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;
use tracing::debug;

use super::{CacheEntry, MAX_SHARED_CACHE_ENTRIES};

/// Cross-user cache keyed by bucket, bounded by capacity.
///
/// Eviction follows write order only: reads never move a key, so the
/// oldest-written key goes first even if it was just read. Expiry plays no
/// part in eviction.
pub struct SharedCache {
    state: RwLock<SharedState>,
    capacity: usize,
}

#[derive(Default)]
struct SharedState {
    entries: HashMap<String, CacheEntry>,
    write_order: VecDeque<String>,
}

impl SharedCache {
    pub fn new() -> Self {
        Self::with_capacity(MAX_SHARED_CACHE_ENTRIES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: RwLock::new(SharedState::default()),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn get(&self, bucket_key: &str) -> Option<CacheEntry> {
        let state = self.state.read().await;
        state.entries.get(bucket_key).cloned()
    }

    /// Insert or overwrite the slot for `entry.bucket_key`, then evict the
    /// oldest-written keys while over capacity.
    pub async fn put(&self, entry: CacheEntry) {
        let mut state = self.state.write().await;
        let key = entry.bucket_key.clone();

        if state.entries.insert(key.clone(), entry).is_some() {
            state.write_order.retain(|k| k != &key);
        }
        state.write_order.push_back(key);

        while state.entries.len() > self.capacity {
            let Some(oldest) = state.write_order.pop_front() else {
                break;
            };
            state.entries.remove(&oldest);
            debug!(bucket_key = %oldest, "Evicted shared cache entry");
        }
    }

    pub async fn contains(&self, bucket_key: &str) -> bool {
        self.state.read().await.entries.contains_key(bucket_key)
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.entries.is_empty()
    }

    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        state.entries.clear();
        state.write_order.clear();
    }
}

impl Default for SharedCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use common::models::WeatherSummary;

    fn entry(key: &str) -> CacheEntry {
        CacheEntry::new(
            key.to_string(),
            0.0,
            0.0,
            WeatherSummary::from_celsius("Clear", 15.0),
            DateTime::<Utc>::UNIX_EPOCH,
        )
    }

    #[tokio::test]
    async fn evicts_oldest_written_first() {
        let cache = SharedCache::new();
        for i in 0..=MAX_SHARED_CACHE_ENTRIES {
            cache.put(entry(&format!("k{i}"))).await;
            assert!(cache.len().await <= MAX_SHARED_CACHE_ENTRIES);
        }

        assert_eq!(cache.len().await, MAX_SHARED_CACHE_ENTRIES);
        assert!(!cache.contains("k0").await);
        assert!(cache.contains("k1").await);
        assert!(cache.contains(&format!("k{MAX_SHARED_CACHE_ENTRIES}")).await);

        cache.put(entry("extra")).await;
        assert!(!cache.contains("k1").await);
        assert!(cache.contains("k2").await);
    }

    #[tokio::test]
    async fn rewrite_moves_key_to_newest() {
        let cache = SharedCache::with_capacity(3);
        cache.put(entry("a")).await;
        cache.put(entry("b")).await;
        cache.put(entry("c")).await;
        cache.put(entry("a")).await;
        cache.put(entry("d")).await;

        assert!(cache.contains("a").await);
        assert!(!cache.contains("b").await);
        assert!(cache.contains("c").await);
        assert!(cache.contains("d").await);
        assert_eq!(cache.len().await, 3);
    }

    #[tokio::test]
    async fn reads_do_not_refresh_position() {
        let cache = SharedCache::with_capacity(2);
        cache.put(entry("a")).await;
        cache.put(entry("b")).await;

        assert!(cache.get("a").await.is_some());
        cache.put(entry("c")).await;

        assert!(!cache.contains("a").await);
        assert!(cache.contains("b").await);
        assert!(cache.contains("c").await);
    }

    #[tokio::test]
    async fn expired_entries_are_kept_until_pushed_out() {
        let cache = SharedCache::with_capacity(2);
        // Epoch-stamped entries are long expired by any real clock.
        cache.put(entry("old")).await;
        cache.put(entry("new")).await;
        assert_eq!(cache.len().await, 2);
        assert!(cache.get("old").await.is_some());
    }

    #[tokio::test]
    async fn reset_clears_everything() {
        let cache = SharedCache::with_capacity(2);
        cache.put(entry("a")).await;
        cache.reset().await;
        assert!(cache.is_empty().await);

        cache.put(entry("b")).await;
        cache.put(entry("c")).await;
        cache.put(entry("d")).await;
        assert_eq!(cache.len().await, 2);
        assert!(!cache.contains("b").await);
    }
}

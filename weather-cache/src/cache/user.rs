use std::collections::HashMap;
use tokio::sync::RwLock;

use super::CacheEntry;

/// Most recent resolution per user. Unbounded, one slot per user id.
///
/// Freshness is the caller's concern; nothing is swept here.
#[derive(Default)]
pub struct UserCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl UserCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, user_id: &str) -> Option<CacheEntry> {
        let entries = self.entries.read().await;
        entries.get(user_id).cloned()
    }

    /// Replace whatever the user had with `entry`.
    pub async fn put(&self, user_id: &str, entry: CacheEntry) {
        let mut entries = self.entries.write().await;
        entries.insert(user_id.to_string(), entry);
    }

    /// Returns true if the user had an entry.
    pub async fn clear(&self, user_id: &str) -> bool {
        let mut entries = self.entries.write().await;
        entries.remove(user_id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn reset(&self) {
        self.entries.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use common::models::WeatherSummary;

    fn entry(key: &str, celsius: f64) -> CacheEntry {
        CacheEntry::new(
            key.to_string(),
            1.0,
            2.0,
            WeatherSummary::from_celsius("Clear", celsius),
            DateTime::<Utc>::UNIX_EPOCH,
        )
    }

    #[tokio::test]
    async fn put_overwrites_in_full() {
        let cache = UserCache::new();
        cache.put("alice", entry("aaaaa", 10.0)).await;
        cache.put("alice", entry("bbbbb", 11.0)).await;

        let stored = cache.get("alice").await.unwrap();
        assert_eq!(stored.bucket_key, "bbbbb");
        assert_eq!(stored.weather_summary.temp_c, 11);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn users_are_isolated() {
        let cache = UserCache::new();
        cache.put("alice", entry("aaaaa", 10.0)).await;
        assert!(cache.get("bob").await.is_none());
    }

    #[tokio::test]
    async fn clear_removes_only_that_user() {
        let cache = UserCache::new();
        cache.put("alice", entry("aaaaa", 10.0)).await;
        cache.put("bob", entry("bbbbb", 12.0)).await;

        assert!(cache.clear("alice").await);
        assert!(!cache.clear("alice").await);
        assert!(cache.get("alice").await.is_none());
        assert!(cache.get("bob").await.is_some());

        cache.reset().await;
        assert!(cache.is_empty().await);
    }
}

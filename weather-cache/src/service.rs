use chrono::{DateTime, Utc};
use common::models::{CacheStats, WeatherSummary};
use std::sync::Arc;
use tracing::{Instrument, Span, debug, error, info, info_span, warn};

use crate::api_client::WeatherProvider;
use crate::bucket::{bucket_key, neighbor_keys};
use crate::cache::{CacheEntry, SharedCache, UserCache};
use crate::clock::{Clock, SystemClock};

/// Logging scope for a single lookup.
///
/// Everything the service logs while handling a call is emitted inside
/// `span`, so hosts can attach whatever session fields they have.
#[derive(Debug, Clone)]
pub struct RequestContext {
    span: Span,
}

impl RequestContext {
    pub fn new(session_id: &str) -> Self {
        Self {
            span: info_span!("weather_request", session_id = %session_id),
        }
    }

    pub fn from_span(span: Span) -> Self {
        Self { span }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::from_span(Span::current())
    }
}

/// Which shared-cache cell answered a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    OwnCell,
    NeighborCell,
}

/// Proximity-aware weather lookups in front of a rate-limited provider.
///
/// Lookups try the caller's last result, then the shared cache for the
/// caller's cell and its neighbors, and only then the provider. Concurrent
/// misses for the same place each go upstream; nothing is coalesced.
pub struct WeatherService {
    provider: Option<Arc<dyn WeatherProvider>>,
    user_cache: UserCache,
    shared_cache: SharedCache,
    clock: Arc<dyn Clock>,
}

impl WeatherService {
    /// `provider` is `None` when no API credential is configured; lookups
    /// then only ever answer from cache.
    pub fn new(provider: Option<Arc<dyn WeatherProvider>>, clock: Arc<dyn Clock>) -> Self {
        Self::with_shared_cache(provider, clock, SharedCache::new())
    }

    pub fn with_shared_cache(
        provider: Option<Arc<dyn WeatherProvider>>,
        clock: Arc<dyn Clock>,
        shared_cache: SharedCache,
    ) -> Self {
        Self {
            provider,
            user_cache: UserCache::new(),
            shared_cache,
            clock,
        }
    }

    pub fn with_system_clock(provider: Option<Arc<dyn WeatherProvider>>) -> Self {
        Self::new(provider, Arc::new(SystemClock))
    }

    /// Weather for `user_id` at (`lat`, `lon`), or `None` if nothing cached
    /// applies and the provider is unavailable or fails. Failures are only
    /// visible in the logs.
    pub async fn get_weather(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        lat: f64,
        lon: f64,
    ) -> Option<WeatherSummary> {
        self.resolve(user_id, lat, lon)
            .instrument(ctx.span().clone())
            .await
    }

    async fn resolve(&self, user_id: &str, lat: f64, lon: f64) -> Option<WeatherSummary> {
        let now = self.clock.now();

        if let Some(entry) = self.user_cache.get(user_id).await
            && entry.serves(lat, lon, now)
        {
            debug!(
                user_id = %user_id,
                distance_km = entry.distance_km(lat, lon),
                "User cache hit"
            );
            return Some(entry.weather_summary);
        }

        let key = bucket_key(lat, lon);

        if let Some(entry) = self.find_shared(&key, lat, lon, now).await {
            self.user_cache.put(user_id, entry.clone()).await;
            return Some(entry.weather_summary);
        }

        self.fetch_and_store(user_id, key, lat, lon).await
    }

    /// Own cell first, then neighbors in [`neighbor_keys`] order. The first
    /// qualifying neighbor wins, even if a later one is closer.
    async fn find_shared(
        &self,
        key: &str,
        lat: f64,
        lon: f64,
        now: DateTime<Utc>,
    ) -> Option<CacheEntry> {
        let candidates = std::iter::once((key.to_string(), Source::OwnCell)).chain(
            neighbor_keys(key)
                .into_iter()
                .map(|k| (k, Source::NeighborCell)),
        );

        for (candidate, source) in candidates {
            if let Some(entry) = self.shared_cache.get(&candidate).await
                && entry.serves(lat, lon, now)
            {
                debug!(
                    bucket_key = %candidate,
                    source = ?source,
                    distance_km = entry.distance_km(lat, lon),
                    "Shared cache hit"
                );
                return Some(entry);
            }
        }

        None
    }

    async fn fetch_and_store(
        &self,
        user_id: &str,
        key: String,
        lat: f64,
        lon: f64,
    ) -> Option<WeatherSummary> {
        let Some(provider) = &self.provider else {
            warn!(user_id = %user_id, "No weather API key configured, skipping fetch");
            return None;
        };

        info!(
            user_id = %user_id,
            bucket_key = %key,
            provider = provider.name(),
            "Cache miss, fetching weather"
        );

        let summary = match provider.current_weather(lat, lon).await {
            Ok(summary) => summary,
            Err(e) => {
                error!(
                    user_id = %user_id,
                    bucket_key = %key,
                    upstream = e.is_upstream(),
                    error = %e,
                    "Weather fetch failed"
                );
                return None;
            }
        };

        let entry = CacheEntry::new(key, lat, lon, summary.clone(), self.clock.now());
        self.shared_cache.put(entry.clone()).await;
        self.user_cache.put(user_id, entry).await;

        Some(summary)
    }

    /// Forget a user's last result, e.g. on logout.
    pub async fn clear_user(&self, user_id: &str) {
        if self.user_cache.clear(user_id).await {
            debug!(user_id = %user_id, "Cleared user cache entry");
        }
    }

    /// Drop everything in both tiers.
    pub async fn reset(&self) {
        self.user_cache.reset().await;
        self.shared_cache.reset().await;
    }

    pub async fn shared_cache_size(&self) -> usize {
        self.shared_cache.len().await
    }

    pub async fn user_cache_size(&self) -> usize {
        self.user_cache.len().await
    }

    /// Whether the shared cache holds an entry, fresh or not, for the cell
    /// containing (`lat`, `lon`).
    pub async fn has_shared_entry(&self, lat: f64, lon: f64) -> bool {
        self.shared_cache.contains(&bucket_key(lat, lon)).await
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            shared_entries: self.shared_cache.len().await,
            shared_capacity: self.shared_cache.capacity(),
            user_entries: self.user_cache.len().await,
        }
    }
}

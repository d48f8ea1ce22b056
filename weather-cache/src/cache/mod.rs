//! The two cache tiers and the entry type they share.

mod shared;
mod user;

pub use shared::SharedCache;
pub use user::UserCache;

use chrono::{DateTime, TimeDelta, Utc};
use common::models::WeatherSummary;

use crate::distance::haversine_km;

/// Maximum distance between a cached coordinate and a query for reuse.
pub const PROXIMITY_KM: f64 = 5.0;

/// Freshness window: 10 minutes.
pub const FRESH_TTL_MS: i64 = 10 * 60 * 1000;

pub const MAX_SHARED_CACHE_ENTRIES: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub bucket_key: String,
    pub lat: f64,
    pub lon: f64,
    pub weather_summary: WeatherSummary,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(
        bucket_key: String,
        lat: f64,
        lon: f64,
        weather_summary: WeatherSummary,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            bucket_key,
            lat,
            lon,
            weather_summary,
            fetched_at,
            expires_at: fetched_at + TimeDelta::milliseconds(FRESH_TTL_MS),
        }
    }

    /// An expired entry is treated exactly like a missing one.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    /// Distance from the entry's stored coordinate, not its cell.
    pub fn distance_km(&self, lat: f64, lon: f64) -> f64 {
        haversine_km(self.lat, self.lon, lat, lon)
    }

    /// Valid at `now` and within [`PROXIMITY_KM`] of the query.
    pub fn serves(&self, lat: f64, lon: f64, now: DateTime<Utc>) -> bool {
        self.is_valid(now) && self.distance_km(lat, lon) <= PROXIMITY_KM
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_at(fetched_at: DateTime<Utc>) -> CacheEntry {
        CacheEntry::new(
            "9q8yy".to_string(),
            37.7749,
            -122.4194,
            WeatherSummary::from_celsius("Clouds", 20.0),
            fetched_at,
        )
    }

    #[test]
    fn expiry_is_fetch_time_plus_ttl() {
        let fetched_at = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        let entry = entry_at(fetched_at);
        assert_eq!(
            (entry.expires_at - entry.fetched_at).num_milliseconds(),
            FRESH_TTL_MS
        );
    }

    #[test]
    fn validity_boundary() {
        let fetched_at = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let entry = entry_at(fetched_at);
        let ttl = TimeDelta::milliseconds(FRESH_TTL_MS);

        assert!(entry.is_valid(fetched_at));
        assert!(entry.is_valid(fetched_at + ttl - TimeDelta::milliseconds(1)));
        assert!(!entry.is_valid(fetched_at + ttl));
        assert!(!entry.is_valid(fetched_at + ttl + TimeDelta::milliseconds(1)));
    }

    #[test]
    fn proximity_uses_stored_coordinate() {
        let now = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let entry = entry_at(now);
        // ~3.3 km north
        assert!(entry.serves(37.8046, -122.4194, now));
        // ~6.7 km north
        assert!(!entry.serves(37.8351, -122.4194, now));
    }
}

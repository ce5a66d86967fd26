//! Time-limited cache of the signed-in user's profile
//!
//! Entries are stored as `{ "payload": ..., "fetchedAt": <epoch-ms> }`. Anything stale or
//! unreadable is treated exactly like a miss and evicted on the read that finds it.

use crate::store::KeyValueStore;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const PROFILE_KEY: &str = "user_profile";

/// Cached payload with the time it was fetched
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedProfile<T> {
    pub payload: T,
    /// Milliseconds since the Unix epoch
    pub fetched_at: i64,
}

impl<T> CachedProfile<T> {
    pub fn age_ms(&self, now: DateTime<Utc>) -> i64 {
        now.timestamp_millis() - self.fetched_at
    }
}

#[derive(Clone)]
pub struct ProfileCache {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl ProfileCache {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn load<T: DeserializeOwned>(&self) -> Option<T> {
        self.load_at(Utc::now())
    }

    /// Read the cached profile as of `now`
    pub fn load_at<T: DeserializeOwned>(&self, now: DateTime<Utc>) -> Option<T> {
        let raw = match self.store.get(PROFILE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Profile cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str::<CachedProfile<T>>(&raw) {
            Ok(entry) if entry.age_ms(now) <= self.ttl_ms() => {
                debug!(age_ms = entry.age_ms(now), "Profile cache hit");
                Some(entry.payload)
            }
            Ok(entry) => {
                debug!(age_ms = entry.age_ms(now), "Profile cache entry expired");
                self.evict();
                None
            }
            Err(e) => {
                warn!(error = %e, "Unreadable profile cache entry");
                self.evict();
                None
            }
        }
    }

    pub fn store<T: Serialize>(&self, payload: &T) {
        self.store_at(payload, Utc::now())
    }

    /// Cache `payload` as fetched at `now`. Failures are logged and leave a miss behind.
    pub fn store_at<T: Serialize>(&self, payload: &T, now: DateTime<Utc>) {
        let entry = CachedProfile {
            payload,
            fetched_at: now.timestamp_millis(),
        };

        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize profile for cache");
                return;
            }
        };

        if let Err(e) = self.store.set(PROFILE_KEY, &json) {
            warn!(error = %e, "Failed to write profile cache");
        }
    }

    pub fn clear(&self) -> crate::store::StoreResult<()> {
        self.store.remove(PROFILE_KEY)
    }

    fn evict(&self) {
        if let Err(e) = self.store.remove(PROFILE_KEY) {
            warn!(error = %e, "Failed to evict profile cache entry");
        }
    }

    fn ttl_ms(&self) -> i64 {
        i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeZone;
    use serde_json::json;

    fn cache() -> (Arc<MemoryStore>, ProfileCache) {
        let store = Arc::new(MemoryStore::new());
        let cache = ProfileCache::new(store.clone(), Duration::from_secs(30 * 60));
        (store, cache)
    }

    #[test]
    fn test_hit_within_window_and_eviction_after() {
        let (store, cache) = cache();
        let written = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        cache.store_at(&json!({"id": 7}), written);

        let just_before = written + chrono::Duration::seconds(29 * 60 + 59);
        let hit: Option<serde_json::Value> = cache.load_at(just_before);
        assert_eq!(hit, Some(json!({"id": 7})));

        let just_after = written + chrono::Duration::seconds(30 * 60 + 1);
        let miss: Option<serde_json::Value> = cache.load_at(just_after);
        assert_eq!(miss, None);
        assert_eq!(store.get(PROFILE_KEY).unwrap(), None);
    }

    #[test]
    fn test_exact_expiry_is_still_a_hit() {
        let (_, cache) = cache();
        let written = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        cache.store_at(&json!("p"), written);

        let boundary = written + chrono::Duration::minutes(30);
        assert_eq!(cache.load_at::<String>(boundary).as_deref(), Some("p"));
    }

    #[test]
    fn test_corrupt_entry_is_evicted() {
        let (store, cache) = cache();
        store.set(PROFILE_KEY, "{broken").unwrap();

        assert_eq!(cache.load::<serde_json::Value>(), None);
        assert_eq!(store.get(PROFILE_KEY).unwrap(), None);
    }

    #[test]
    fn test_layout_uses_camel_case_keys() {
        let (store, cache) = cache();
        let written = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        cache.store_at(&json!({"first_name": "Awa"}), written);

        let raw: serde_json::Value =
            serde_json::from_str(&store.get(PROFILE_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(raw["fetchedAt"], json!(1_700_000_000_000_i64));
        assert_eq!(raw["payload"]["first_name"], json!("Awa"));
    }
}

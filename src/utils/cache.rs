use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::debug;

use crate::utils::clock::Clock;

/// Cache key for a repository: `owner/repo`.
pub fn cache_key(owner: &str, repo: &str) -> String {
    format!("{}/{}", owner, repo)
}

struct CacheEntry<V> {
    value: V,
    stored_at: DateTime<Utc>,
}

/// In-memory store holding one value per key until its time-to-live runs
/// out. Expired entries are dropped when looked up and on every insert.
pub struct ResponseCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> ResponseCache<V> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        ResponseCache {
            entries: Mutex::new(HashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
            clock,
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.entries();

        let entry = entries.get(key)?;
        if now - entry.stored_at < self.ttl {
            return Some(entry.value.clone());
        }

        debug!("cache entry for {} expired", key);
        entries.remove(key);
        None
    }

    /// Stores `value` under `key` and drops every entry that has expired.
    pub fn insert(&self, key: String, value: V) {
        let stored_at = self.clock.now();
        let mut entries = self.entries();

        let before = entries.len();
        entries.retain(|_, entry| stored_at - entry.stored_at < self.ttl);
        if entries.len() < before {
            debug!("swept {} expired cache entries", before - entries.len());
        }

        debug!("caching result for {}", key);
        entries.insert(key, CacheEntry { value, stored_at });
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::fixtures::now;
    use crate::utils::clock::FixedClock;

    fn cache(clock: &Arc<FixedClock>) -> ResponseCache<u32> {
        ResponseCache::new(Duration::from_secs(600), Arc::clone(clock) as Arc<dyn Clock>)
    }

    #[test]
    fn test_cache_key_format() {
        assert_eq!(cache_key("rust-lang", "rust"), "rust-lang/rust");
    }

    #[test]
    fn test_entry_served_within_ttl() {
        let clock = Arc::new(FixedClock::new(now()));
        let cache = cache(&clock);
        cache.insert("acme/widget".to_string(), 7);

        clock.advance(chrono::Duration::seconds(599));
        assert_eq!(cache.get("acme/widget"), Some(7));
    }

    #[test]
    fn test_entry_evicted_after_ttl() {
        let clock = Arc::new(FixedClock::new(now()));
        let cache = cache(&clock);
        cache.insert("acme/widget".to_string(), 7);

        clock.advance(chrono::Duration::seconds(600));
        assert_eq!(cache.get("acme/widget"), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_insert_sweeps_expired_entries() {
        let clock = Arc::new(FixedClock::new(now()));
        let cache = cache(&clock);
        cache.insert("acme/widget".to_string(), 1);
        clock.advance(chrono::Duration::seconds(300));
        cache.insert("acme/gadget".to_string(), 2);

        clock.advance(chrono::Duration::seconds(300));
        cache.insert("acme/gizmo".to_string(), 3);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("acme/gadget"), Some(2));
        assert_eq!(cache.get("acme/widget"), None);
    }

    #[test]
    fn test_one_entry_per_key() {
        let clock = Arc::new(FixedClock::new(now()));
        let cache = cache(&clock);
        cache.insert("acme/widget".to_string(), 1);
        cache.insert("acme/widget".to_string(), 2);
        cache.insert("acme/gadget".to_string(), 3);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("acme/widget"), Some(2));
        assert_eq!(cache.get("acme/unknown"), None);
    }
}

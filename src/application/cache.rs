//! Explicit TTL cache with an injected clock.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::domain::foundation::Timestamp;
use crate::ports::Clock;

/// One cached value and the instant it stops being served.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Timestamp,
}

/// Process-wide cache keyed by `K`.
///
/// Entries are never invalidated by writers; they simply expire. Two
/// concurrent misses for the same key both fetch and the later insert wins.
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Returns the cached value if it has not expired.
    pub async fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| now.is_before(&entry.expires_at))
            .map(|entry| entry.value.clone())
    }

    pub async fn insert(&self, key: K, value: V) {
        let ttl_secs = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let expires_at = self.clock.now().plus_secs(ttl_secs);
        let mut entries = self.entries.write().await;
        // Opportunistic sweep keeps the map bounded by live tenants.
        let now = self.clock.now();
        entries.retain(|_, entry| now.is_before(&entry.expires_at));
        entries.insert(key, CacheEntry { value, expires_at });
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ManualClock;

    fn cache(ttl_secs: u64) -> (TtlCache<String, u32>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Timestamp::now()));
        let cache = TtlCache::new(Duration::from_secs(ttl_secs), clock.clone());
        (cache, clock)
    }

    #[tokio::test]
    async fn serves_value_before_expiry() {
        let (cache, clock) = cache(300);
        cache.insert("t1".to_string(), 7).await;

        clock.advance_secs(299);

        assert_eq!(cache.get(&"t1".to_string()).await, Some(7));
    }

    #[tokio::test]
    async fn expires_value_at_ttl() {
        let (cache, clock) = cache(300);
        cache.insert("t1".to_string(), 7).await;

        clock.advance_secs(300);

        assert_eq!(cache.get(&"t1".to_string()).await, None);
    }

    #[tokio::test]
    async fn insert_sweeps_expired_entries() {
        let (cache, clock) = cache(10);
        cache.insert("old".to_string(), 1).await;
        clock.advance_secs(11);

        cache.insert("new".to_string(), 2).await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get(&"new".to_string()).await, Some(2));
    }

    #[tokio::test]
    async fn insert_replaces_existing_value() {
        let (cache, _clock) = cache(60);
        cache.insert("t1".to_string(), 1).await;
        cache.insert("t1".to_string(), 2).await;

        assert_eq!(cache.get(&"t1".to_string()).await, Some(2));
    }
}

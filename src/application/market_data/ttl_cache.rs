use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::RwLock;
use std::time::Duration;
use tokio::time::Instant;

/// Map whose entries expire `ttl` after insertion.
///
/// Shared by `Arc` between concurrent symbol tasks. A zero TTL disables caching.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, (Instant, V)>>,
}

impl<K, V> fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("ttl", &self.ttl)
            .field("entries", &"<RwLock>")
            .finish()
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `key`, if any.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let guard = match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::error!("TtlCache: Lock poisoned during read, recovering");
                poisoned.into_inner()
            }
        };
        guard
            .get(key)
            .filter(|(stored_at, _)| now.duration_since(*stored_at) < self.ttl)
            .map(|(_, value)| value.clone())
    }

    pub fn insert(&self, key: K, value: V) {
        if self.ttl.is_zero() {
            return;
        }
        let now = Instant::now();
        let ttl = self.ttl;
        let mut guard = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::error!("TtlCache: Lock poisoned during write, recovering");
                poisoned.into_inner()
            }
        };
        // Drop stale entries so the map only holds what a cycle can reuse.
        guard.retain(|_, (stored_at, _)| now.duration_since(*stored_at) < ttl);
        guard.insert(key, (now, value));
    }

    pub fn invalidate(&self, key: &K) {
        match self.entries.write() {
            Ok(mut guard) => {
                guard.remove(key);
            }
            Err(poisoned) => {
                poisoned.into_inner().remove(key);
            }
        }
    }

    pub fn len(&self) -> usize {
        match self.entries.read() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_ttl() {
        let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_secs(60));
        cache.insert("BTC-USD".to_string(), 1);
        assert_eq!(cache.get(&"BTC-USD".to_string()), Some(1));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get(&"BTC-USD".to_string()), Some(1));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get(&"BTC-USD".to_string()), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_prunes_stale_entries() {
        let cache: TtlCache<&'static str, u32> = TtlCache::new(Duration::from_secs(10));
        cache.insert("a", 1);
        tokio::time::advance(Duration::from_secs(11)).await;
        cache.insert("b", 2);
        assert_eq!(cache.len(), 1);
        cache.invalidate(&"b");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_ttl_disables_cache() {
        let cache: TtlCache<u8, u8> = TtlCache::new(Duration::ZERO);
        cache.insert(1, 1);
        assert_eq!(cache.get(&1), None);
        assert!(cache.is_empty());
    }
}

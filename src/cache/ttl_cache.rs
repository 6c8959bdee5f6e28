use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// In-memory map whose entries expire a fixed `ttl` after insertion.
///
/// An entry is never handed out at or after its expiry instant. Entries are
/// replaced wholesale on insert, never updated in place. Concurrent inserts
/// for the same key resolve as last write wins.
#[derive(Clone)]
pub struct TtlCache<K, V> {
    entries: Arc<RwLock<HashMap<K, CacheEntry<V>>>>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Returns the live value for `key`, evicting it if it has expired.
    pub async fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.is_live(now) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        let mut entries = self.entries.write().await;
        // Another writer may have refreshed the entry between the two locks.
        if entries.get(key).is_some_and(|entry| !entry.is_live(now)) {
            entries.remove(key);
        }
        None
    }

    /// Stores `value` under `key`. A ttl too large to represent as an
    /// instant leaves the cache unchanged.
    pub async fn insert(&self, key: K, value: V) {
        let Some(expires_at) = Instant::now().checked_add(self.ttl) else {
            warn!(ttl_secs = self.ttl.as_secs(), "cache ttl overflows the clock, not caching");
            return;
        };

        let entry = CacheEntry { value, expires_at };
        self.entries.write().await.insert(key, entry);
    }

    /// Removes every expired entry and returns how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Start the background task that purges expired entries every `every`.
    pub fn start_background_task(&self, every: Duration) -> JoinHandle<()> {
        let cache = self.clone();

        tokio::spawn(async move {
            loop {
                tokio::time::sleep(every).await;

                let purged = cache.purge_expired().await;
                if purged > 0 {
                    debug!(purged, "purged expired cache entries");
                }
            }
        })
    }
}

use crate::core::clock::Clock;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Insert-only map shared between tasks. Entries live as long as the cache.
#[derive(Clone)]
pub struct Cache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Mutex<HashMap<K, V>>>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let cache = self.inner.lock().await;
        let value = cache.get(key).cloned();
        if value.is_some() {
            debug!("Cache HIT");
        } else {
            debug!("Cache MISS");
        }
        value
    }

    pub async fn put(&self, key: K, value: V) {
        let mut cache = self.inner.lock().await;
        debug!("Cache PUT");
        cache.insert(key, value);
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    pub value: T,
    pub fetched_at: DateTime<Utc>,
}

/// Single slot holding the latest good value and when it was fetched.
///
/// The slot is only ever replaced whole. Reads return the value while it is
/// younger than the freshness window; older snapshots stay in the slot but
/// are not served.
pub struct SnapshotCache<T: Clone + Send + Sync> {
    slot: Mutex<Option<Snapshot<T>>>,
    freshness: Duration,
    clock: Arc<dyn Clock>,
}

impl<T: Clone + Send + Sync> SnapshotCache<T> {
    pub fn new(freshness: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            slot: Mutex::new(None),
            freshness,
            clock,
        }
    }

    pub async fn fresh(&self) -> Option<T> {
        let slot = self.slot.lock().await;
        let now = self.clock.now();
        match slot.as_ref() {
            Some(snapshot) if now - snapshot.fetched_at < self.freshness => {
                debug!(fetched_at = %snapshot.fetched_at, "Snapshot HIT");
                Some(snapshot.value.clone())
            }
            Some(snapshot) => {
                debug!(fetched_at = %snapshot.fetched_at, "Snapshot STALE");
                None
            }
            None => {
                debug!("Snapshot MISS");
                None
            }
        }
    }

    pub async fn replace(&self, value: T) {
        let fetched_at = self.clock.now();
        *self.slot.lock().await = Some(Snapshot { value, fetched_at });
        debug!(%fetched_at, "Snapshot PUT");
    }

    /// The stored snapshot regardless of age.
    pub async fn latest(&self) -> Option<Snapshot<T>> {
        self.slot.lock().await.clone()
    }
}

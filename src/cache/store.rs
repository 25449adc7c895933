//! Query Cache Module
//!
//! Memoizing cache combining HashMap storage with LRU tracking, TTL expiration
//! and per-key single-flight loading.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::{CacheEntry, CachePolicy, CacheStats, LruTracker};

// == Cache State ==
/// Everything behind the cache lock.
struct CacheState<K, V> {
    /// Completed entries
    entries: HashMap<K, CacheEntry<V>>,
    /// LRU access tracker
    lru: LruTracker<K>,
    /// Performance statistics
    stats: CacheStats,
}

impl<K, V> CacheState<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
        }
    }

    // == Live Lookup ==
    /// Returns a live value, dropping the entry if it has gone stale.
    fn live_value(&mut self, key: &K) -> Option<V> {
        let entry = self.entries.get(key)?;
        if entry.is_expired() {
            self.entries.remove(key);
            self.lru.remove(key);
            self.stats.record_expiration();
            self.stats.set_total_entries(self.entries.len());
            return None;
        }
        debug!("Serving cached entry, {:?} left", entry.ttl_remaining());
        let value = entry.value.clone();
        self.lru.touch(key);
        Some(value)
    }

    // == Insert ==
    /// Stores a freshly computed value, evicting the least recently used entry when full.
    fn insert(&mut self, key: K, value: V, capacity: usize, ttl: Duration) {
        if !self.entries.contains_key(&key) && self.entries.len() >= capacity {
            if let Some(evicted) = self.lru.evict_oldest() {
                self.entries.remove(&evicted);
                self.stats.record_eviction();
                debug!("Evicted least recently used cache entry");
            }
        }

        self.entries.insert(key.clone(), CacheEntry::new(value, ttl));
        self.lru.touch(&key);
        self.stats.record_load();
        self.stats.set_total_entries(self.entries.len());
    }
}

// == Flights ==
/// Loader lock for one key, shared by every caller that missed on it.
struct Flight {
    lock: Arc<Mutex<()>>,
    callers: usize,
}

type Flights<K> = StdMutex<HashMap<K, Flight>>;

/// Membership in a key's flight, released when dropped.
///
/// The marker is removed with its last member, including members whose
/// future was dropped mid-load.
struct FlightGuard<'a, K: Eq + Hash> {
    flights: &'a Flights<K>,
    key: K,
    lock: Arc<Mutex<()>>,
}

impl<'a, K: Eq + Hash + Clone> FlightGuard<'a, K> {
    fn join(flights: &'a Flights<K>, key: K) -> Self {
        let mut map = flights.lock().unwrap_or_else(PoisonError::into_inner);
        let flight = map.entry(key.clone()).or_insert_with(|| Flight {
            lock: Arc::new(Mutex::new(())),
            callers: 0,
        });
        flight.callers += 1;
        let lock = flight.lock.clone();
        drop(map);

        Self { flights, key, lock }
    }
}

impl<K: Eq + Hash> Drop for FlightGuard<'_, K> {
    fn drop(&mut self) {
        let mut map = self.flights.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(flight) = map.get_mut(&self.key) {
            if Arc::ptr_eq(&flight.lock, &self.lock) {
                flight.callers -= 1;
                if flight.callers == 0 {
                    map.remove(&self.key);
                }
            }
        }
    }
}

// == Query Cache ==
/// Bounded, expiring memoizer keyed by query parameters.
///
/// For each key the loader runs at most once while a live entry exists.
/// Concurrent misses on one key are serialized: the first caller runs the
/// loader and the others wait and then read its stored value. A loader that
/// fails or is cancelled leaves nothing behind, and each waiting caller then
/// tries its own loader in turn. Stale entries are dropped when next touched,
/// never swept.
pub struct QueryCache<K, V> {
    policy: CachePolicy,
    state: Mutex<CacheState<K, V>>,
    /// Keys with at least one caller waiting on or running a loader
    in_flight: Flights<K>,
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates a cache with the given policy.
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            state: Mutex::new(CacheState::new()),
            in_flight: StdMutex::new(HashMap::new()),
        }
    }

    /// Creates a pass-through cache that never stores anything.
    pub fn disabled() -> Self {
        Self::new(CachePolicy::Disabled)
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    // == Get Or Try Insert ==
    /// Returns the live value for `key`, or runs `loader` and stores its `Ok` result.
    ///
    /// Errors from `loader` are returned to this caller only.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, loader: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let (capacity, ttl) = match self.policy {
            CachePolicy::Enabled { capacity, ttl } if capacity > 0 => (capacity, ttl),
            _ => return loader().await,
        };

        let flight = {
            let mut state = self.state.lock().await;
            if let Some(value) = state.live_value(&key) {
                state.stats.record_hit();
                debug!("Cache hit");
                return Ok(value);
            }
            state.stats.record_miss();
            FlightGuard::join(&self.in_flight, key.clone())
        };

        let _loading = flight.lock.lock().await;

        // A previous holder of the flight lock may have stored the value.
        if let Some(value) = self.state.lock().await.live_value(&key) {
            return Ok(value);
        }

        debug!("Cache miss, running loader");
        let outcome = loader().await;

        let mut state = self.state.lock().await;
        match &outcome {
            Ok(value) => state.insert(key, value.clone(), capacity, ttl),
            Err(_) => {
                state.stats.record_load_failure();
                debug!("Loader failed, nothing cached");
            }
        }
        outcome
    }

    // == Get With ==
    /// Infallible form of [`get_or_try_insert_with`](Self::get_or_try_insert_with).
    pub async fn get_with<F, Fut>(&self, key: K, loader: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        let outcome: Result<V, std::convert::Infallible> = self
            .get_or_try_insert_with(key, || async move { Ok(loader().await) })
            .await;
        match outcome {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    // == Inspection ==
    /// Number of stored entries, stale ones included until they are next touched.
    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    /// Alias of [`len`](Self::len).
    pub async fn size(&self) -> usize {
        self.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Stored values, most recently used first.
    pub async fn values(&self) -> Vec<V> {
        let state = self.state.lock().await;
        state
            .lru
            .iter()
            .filter_map(|key| state.entries.get(key))
            .map(|entry| entry.value.clone())
            .collect()
    }

    /// Number of keys with a loader running or queued.
    pub fn loading(&self) -> usize {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let state = self.state.lock().await;
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.entries.len());
        stats.in_flight = self.loading();
        stats
    }

    // == Clear ==
    /// Removes every stored entry. Loaders already running still store their result.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.entries.clear();
        state.lru.clear();
        state.stats.set_total_entries(0);
    }
}

impl<K, V> fmt::Debug for QueryCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cache(capacity: usize, ttl_secs: u64) -> QueryCache<String, String> {
        QueryCache::new(CachePolicy::enabled(capacity, Duration::from_secs(ttl_secs)))
    }

    async fn load(cache: &QueryCache<String, String>, key: &str, calls: &AtomicUsize) -> String {
        cache
            .get_with(key.to_string(), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                format!("value-{}", key)
            })
            .await
    }

    #[tokio::test]
    async fn test_second_get_is_served_from_cache() {
        let cache = cache(100, 300);
        let calls = AtomicUsize::new(0);

        let first = load(&cache, "key1", &calls).await;
        let second = load(&cache, "key1", &calls).await;

        assert_eq!(first, "value-key1");
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.size().await, 1);
    }

    #[tokio::test]
    async fn test_distinct_keys_each_load() {
        let cache = cache(100, 300);
        let calls = AtomicUsize::new(0);

        load(&cache, "a", &calls).await;
        load(&cache, "b", &calls).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.size().await, 2);
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recently_used() {
        let cache = cache(3, 300);
        let calls = AtomicUsize::new(0);

        load(&cache, "key1", &calls).await;
        load(&cache, "key2", &calls).await;
        load(&cache, "key3", &calls).await;
        // key1 becomes most recently used, so key2 is evicted next
        load(&cache, "key1", &calls).await;
        load(&cache, "key4", &calls).await;

        assert_eq!(cache.size().await, 3);
        assert_eq!(
            cache.values().await,
            vec!["value-key4", "value-key1", "value-key3"]
        );
        assert_eq!(cache.stats().await.evictions, 1);

        load(&cache, "key2", &calls).await;
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_recomputed() {
        let cache = cache(10, 600);
        let calls = AtomicUsize::new(0);

        load(&cache, "key", &calls).await;
        tokio::time::advance(Duration::from_secs(599)).await;
        load(&cache, "key", &calls).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(1)).await;
        load(&cache, "key", &calls).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.size().await, 1);

        let stats = cache.stats().await;
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_entries_count_until_touched() {
        let cache = cache(10, 1);
        let calls = AtomicUsize::new(0);

        load(&cache, "key", &calls).await;
        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(cache.size().await, 1);
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let cache = cache(10, 300);
        let calls = AtomicUsize::new(0);

        let failed: Result<String, String> = cache
            .get_or_try_insert_with("key".to_string(), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("boom".to_string())
            })
            .await;
        assert_eq!(failed, Err("boom".to_string()));
        assert_eq!(cache.size().await, 0);

        let value = load(&cache, "key", &calls).await;
        assert_eq!(value, "value-key");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.stats().await.load_failures, 1);
    }

    #[tokio::test]
    async fn test_disabled_cache_always_loads() {
        let cache: QueryCache<String, String> = QueryCache::disabled();
        let calls = AtomicUsize::new(0);

        for _ in 0..5 {
            load(&cache, "key", &calls).await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(cache.size().await, 0);
        assert!(cache.values().await.is_empty());
    }

    #[tokio::test]
    async fn test_zero_capacity_stores_nothing() {
        let cache = cache(0, 300);
        let calls = AtomicUsize::new(0);

        load(&cache, "key", &calls).await;
        load(&cache, "key", &calls).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = cache(10, 300);
        let calls = AtomicUsize::new(0);

        load(&cache, "a", &calls).await;
        load(&cache, "b", &calls).await;
        cache.clear().await;

        assert!(cache.is_empty().await);
        load(&cache, "a", &calls).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_misses_load_once() {
        let cache = Arc::new(cache(10, 300));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_with("shared".to_string(), || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        "computed".to_string()
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), "computed");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.size().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_waiters_retry_after_failed_leader() {
        let cache = Arc::new(cache(10, 300));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_try_insert_with("flaky".to_string(), || async move {
                        let attempt = calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        if attempt == 0 {
                            Err("first attempt fails")
                        } else {
                            Ok("recovered".to_string())
                        }
                    })
                    .await
            }));
        }

        let mut failures = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(value) => assert_eq!(value, "recovered"),
                Err(_) => failures += 1,
            }
        }
        assert_eq!(failures, 1);
        assert_eq!(cache.size().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_loads_release_flights() {
        let cache = Arc::new(cache(10, 300));

        let mut handles = Vec::new();
        for i in 0..200 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_with(format!("key-{}", i), || async {
                        tokio::time::sleep(Duration::from_secs(3600)).await;
                        "never".to_string()
                    })
                    .await
            }));
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(cache.loading(), 200);

        for handle in handles {
            handle.abort();
            assert!(handle.await.unwrap_err().is_cancelled());
        }

        assert_eq!(cache.loading(), 0);
        assert_eq!(cache.stats().await.in_flight, 0);
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_waiter_keeps_leader_flight() {
        let cache = Arc::new(cache(10, 300));
        let calls = Arc::new(AtomicUsize::new(0));

        let spawn_get = |cache: Arc<QueryCache<String, String>>, calls: Arc<AtomicUsize>| {
            tokio::spawn(async move {
                cache
                    .get_with("shared".to_string(), || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_secs(1)).await;
                        "computed".to_string()
                    })
                    .await
            })
        };

        let leader = spawn_get(cache.clone(), calls.clone());
        let waiter = spawn_get(cache.clone(), calls.clone());
        tokio::time::sleep(Duration::from_millis(10)).await;

        waiter.abort();
        assert!(waiter.await.unwrap_err().is_cancelled());
        assert_eq!(cache.loading(), 1);

        let late = spawn_get(cache.clone(), calls.clone());
        assert_eq!(leader.await.unwrap(), "computed");
        assert_eq!(late.await.unwrap(), "computed");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.loading(), 0);
    }
}

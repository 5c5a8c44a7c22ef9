//! Main cache store implementation with background reaping

use crate::cache::{
    config::CacheConfig,
    entry::CacheEntry,
    reaper::{self, ReaperHandle},
    types::{CacheKey, CacheStats, CacheValue},
};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// In-memory TTL cache whose entries are removed by a background reaper.
///
/// Every entry shares the same TTL. A dedicated task sweeps the map once per
/// reap interval and deletes entries older than the TTL. Lookups do not check
/// freshness themselves, so an expired entry stays visible until the next
/// sweep (at most one reap interval past its TTL).
///
/// The reaper stops when [`close`](Self::close) or
/// [`shutdown`](Self::shutdown) is called, or when the cache is dropped.
/// Share the cache between tasks with an `Arc`.
pub struct ReapingCache {
    config: CacheConfig,

    /// State shared with the reaper
    shared: Arc<Shared>,

    /// Stop signal for the reaper
    shutdown_tx: watch::Sender<bool>,

    reaper: Mutex<Option<ReaperHandle>>,
}

/// State shared between cache handles and the reaper
pub(crate) struct Shared {
    ttl: Duration,
    store: RwLock<CacheStore>,
    hits: AtomicU64,
    misses: AtomicU64,
    reaped: AtomicU64,
    reap_passes: AtomicU64,
}

/// Lock-guarded storage
struct CacheStore {
    entries: HashMap<CacheKey, CacheEntry>,
    last_reap_at: Option<DateTime<Utc>>,
}

impl Shared {
    fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            store: RwLock::new(CacheStore {
                entries: HashMap::new(),
                last_reap_at: None,
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            reaped: AtomicU64::new(0),
            reap_passes: AtomicU64::new(0),
        }
    }

    /// Remove every entry older than the TTL, returning how many went
    pub(crate) fn reap_expired(&self) -> usize {
        let now = Instant::now();
        let ttl = self.ttl;

        let removed = {
            let mut store = self.store.write();
            let before = store.entries.len();
            store.entries.retain(|_, entry| !entry.is_expired_at(ttl, now));
            store.last_reap_at = Some(Utc::now());
            before - store.entries.len()
        };

        self.reaped.fetch_add(removed as u64, Ordering::Relaxed);
        self.reap_passes.fetch_add(1, Ordering::Relaxed);
        removed
    }
}

impl ReapingCache {
    /// Create a cache whose reap interval equals `ttl`.
    ///
    /// Any duration is accepted; a zero TTL reaps on the first sweep.
    pub fn new(ttl: Duration) -> Self {
        Self::with_config(CacheConfig::new(ttl))
    }

    /// Create a cache with an independently configured reap interval.
    ///
    /// Inside a tokio runtime the reaper is spawned as a task on it. Without
    /// one it runs on its own thread with a single-threaded runtime.
    pub fn with_config(config: CacheConfig) -> Self {
        info!("Initializing reaping cache with config: {:?}", config);

        let shared = Arc::new(Shared::new(config.ttl));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = reaper::spawn(
            shared.clone(),
            config.effective_reap_interval(),
            shutdown_rx,
        );

        Self {
            config,
            shared,
            shutdown_tx,
            reaper: Mutex::new(Some(handle)),
        }
    }

    /// Insert or overwrite the entry for `key`.
    ///
    /// The entry gets a fresh creation time; an overwritten entry is replaced
    /// as a whole.
    pub fn add(&self, key: impl Into<CacheKey>, value: impl Into<CacheValue>) {
        let entry = CacheEntry::new(value.into());
        let mut store = self.shared.store.write();

        match store.entries.entry(key.into()) {
            Entry::Occupied(mut occupied) => {
                debug!("Replacing cache entry: {}", occupied.key());
                occupied.insert(entry);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(entry);
            }
        }
    }

    /// Look up `key`, returning a copy of the stored bytes.
    ///
    /// Freshness is left to the reaper: an entry past its TTL that has not
    /// been swept yet is still returned.
    pub fn get(&self, key: &str) -> Option<CacheValue> {
        let store = self.shared.store.read();

        match store.entries.get(key) {
            Some(entry) => {
                self.shared.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value().to_vec())
            }
            None => {
                self.shared.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Check if a key is present (without counting a hit or miss)
    pub fn contains_key(&self, key: &str) -> bool {
        self.shared.store.read().entries.contains_key(key)
    }

    /// Number of stored entries, including stale ones not yet reaped
    pub fn len(&self) -> usize {
        self.shared.store.read().entries.len()
    }

    /// Check if the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.shared.store.read().entries.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }

    pub fn reap_interval(&self) -> Duration {
        self.config.effective_reap_interval()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let (entries, last_reap_at) = {
            let store = self.shared.store.read();
            (store.entries.len(), store.last_reap_at)
        };

        CacheStats {
            entries,
            hits: self.shared.hits.load(Ordering::Relaxed),
            misses: self.shared.misses.load(Ordering::Relaxed),
            reaped: self.shared.reaped.load(Ordering::Relaxed),
            reap_passes: self.shared.reap_passes.load(Ordering::Relaxed),
            last_reap_at,
        }
    }

    /// Signal the reaper to stop. Idempotent and non-blocking.
    ///
    /// The cache stays usable afterwards, but entries no longer expire.
    pub fn close(&self) {
        if !self.shutdown_tx.send_replace(true) {
            info!("Stopping cache reaper");
        }
    }

    /// Whether [`close`](Self::close) or [`shutdown`](Self::shutdown) was called
    pub fn is_closed(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Stop the reaper and wait for it to finish.
    ///
    /// A reaper thread started outside a runtime is joined on the blocking
    /// pool of the current runtime; without one it is left to exit on its own.
    pub async fn shutdown(&self) {
        self.close();

        let handle = self.reaper.lock().take();
        match handle {
            Some(ReaperHandle::Task(task)) => {
                if let Err(e) = task.await {
                    warn!("Cache reaper task ended abnormally: {}", e);
                }
            }
            Some(ReaperHandle::Thread(thread)) => match Handle::try_current() {
                Ok(runtime) => match runtime.spawn_blocking(move || thread.join()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(_)) => warn!("Cache reaper thread panicked"),
                    Err(e) => warn!("Failed to join cache reaper thread: {}", e),
                },
                Err(_) => debug!("No runtime to join the cache reaper thread on"),
            },
            Some(ReaperHandle::Unavailable) | None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_basic_add_and_get() {
        let cache = ReapingCache::new(Duration::from_secs(5));

        cache.add("test", b"value".to_vec());

        assert_eq!(cache.get("test"), Some(b"value".to_vec()));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test]
    async fn test_cache_miss() {
        let cache = ReapingCache::new(Duration::from_secs(5));

        assert_eq!(cache.get("nonexistent"), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[tokio::test]
    async fn test_empty_key_and_value() {
        let cache = ReapingCache::new(Duration::from_secs(5));

        cache.add("", Vec::new());

        assert_eq!(cache.get(""), Some(Vec::new()));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overwrite_resets_creation_time() {
        let ttl = Duration::from_millis(100);
        let config = CacheConfig::builder()
            .ttl(ttl)
            .reap_interval(Duration::from_millis(10))
            .build();
        let cache = ReapingCache::with_config(config);

        cache.add("key", "v1");
        tokio::time::sleep(Duration::from_millis(80)).await;
        cache.add("key", "v2");
        tokio::time::sleep(Duration::from_millis(80)).await;

        // 160ms after the first add, 80ms after the overwrite
        assert_eq!(cache.get("key"), Some(b"v2".to_vec()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reap_removes_expired() {
        let config = CacheConfig::builder()
            .ttl(Duration::from_millis(50))
            .reap_interval(Duration::from_secs(3600))
            .build();
        let cache = ReapingCache::with_config(config);

        cache.add("old", "1");
        tokio::time::sleep(Duration::from_millis(60)).await;
        cache.add("new", "2");

        let removed = cache.shared.reap_expired();
        assert_eq!(removed, 1);
        assert!(!cache.contains_key("old"));
        assert!(cache.contains_key("new"));

        let stats = cache.stats();
        assert_eq!(stats.reaped, 1);
        assert_eq!(stats.reap_passes, 1);
        assert!(stats.last_reap_at.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_at_boundary_survives_sweep() {
        let config = CacheConfig::builder()
            .ttl(Duration::from_millis(50))
            .reap_interval(Duration::from_secs(3600))
            .build();
        let cache = ReapingCache::with_config(config);

        cache.add("edge", "1");
        tokio::time::advance(Duration::from_millis(50)).await;

        assert_eq!(cache.shared.reap_expired(), 0);
        assert!(cache.contains_key("edge"));
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let cache = ReapingCache::new(Duration::from_secs(5));
        assert!(!cache.is_closed());

        cache.close();
        cache.close();
        assert!(cache.is_closed());

        cache.shutdown().await;
        cache.shutdown().await;

        cache.add("after", "close");
        assert_eq!(cache.get("after"), Some(b"close".to_vec()));
    }

    #[tokio::test]
    async fn test_contains_key_does_not_count() {
        let cache = ReapingCache::new(Duration::from_secs(5));
        cache.add("key", "value");

        assert!(cache.contains_key("key"));
        assert!(!cache.contains_key("other"));

        let stats = cache.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
    }

    #[tokio::test]
    async fn test_unbounded_ttl_keeps_reaper_alive() {
        let cache = ReapingCache::new(Duration::MAX);

        cache.add("forever", "value");
        tokio::task::yield_now().await;
        assert_eq!(cache.get("forever"), Some(b"value".to_vec()));

        cache.close();
        let handle = cache.reaper.lock().take();
        match handle {
            Some(ReaperHandle::Task(task)) => assert!(task.await.is_ok()),
            _ => panic!("reaper should run as a task inside a runtime"),
        }

        assert_eq!(cache.stats().reap_passes, 0);
        assert_eq!(cache.get("forever"), Some(b"value".to_vec()));
    }

    #[tokio::test]
    async fn test_shutdown_with_unbounded_ttl() {
        let cache = ReapingCache::new(Duration::MAX);

        cache.add("forever", "value");
        tokio::task::yield_now().await;
        cache.shutdown().await;

        assert!(cache.is_closed());
        assert!(cache.reaper.lock().is_none());
        assert_eq!(cache.get("forever"), Some(b"value".to_vec()));
    }

    #[test]
    fn test_shutdown_joins_reaper_thread() {
        let config = CacheConfig::builder()
            .ttl(Duration::from_secs(60))
            .reap_interval(Duration::from_millis(1))
            .build();
        let cache = ReapingCache::with_config(config);
        assert!(matches!(
            *cache.reaper.lock(),
            Some(ReaperHandle::Thread(_))
        ));

        std::thread::sleep(Duration::from_millis(20));

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(cache.shutdown());

        // The thread has exited, so no sweep can follow
        let passes = cache.stats().reap_passes;
        assert!(passes > 0);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.stats().reap_passes, passes);
    }

    #[tokio::test]
    async fn test_zero_ttl_interval_is_clamped() {
        let cache = ReapingCache::new(Duration::ZERO);
        assert_eq!(cache.ttl(), Duration::ZERO);
        assert_eq!(cache.reap_interval(), Duration::from_millis(1));
    }
}

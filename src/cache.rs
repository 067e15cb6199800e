//! Time-boxed memoization of the aggregated feed.
//!
//! The cache is either **cold** (no entry) or **warm** (one entry with an
//! age). A warm entry whose age has reached the TTL is **stale** and is treated
//! exactly like a cold cache.
//!
//! On a cold or stale read the caller runs the producer itself and the result,
//! even an empty one, replaces the entry wholesale. Only one producer runs at a
//! time per cache: callers that miss while a refresh is in flight wait for it
//! and then read the entry it published.

use crate::config::DEFAULT_CACHE_TTL;
use crate::models::Article;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument};

/// Source of "now" for freshness decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: StdMutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: StdMutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let by = chrono::Duration::from_std(by).unwrap_or(chrono::Duration::MAX);
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now = now.checked_add_signed(by).unwrap_or(DateTime::<Utc>::MAX_UTC);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// One published aggregation result.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub data: Arc<[Article]>,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Age at `now`; zero if the clock went backwards.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.fetched_at).to_std().unwrap_or(Duration::ZERO)
    }
}

/// Process-lifetime cache of the last aggregation result.
pub struct FreshnessCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entry: RwLock<Option<Arc<CacheEntry>>>,
    refresh: Mutex<()>,
}

impl Default for FreshnessCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl FreshnessCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entry: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The current entry, fresh or not.
    pub async fn entry(&self) -> Option<Arc<CacheEntry>> {
        self.entry.read().await.clone()
    }

    /// Cached data if still fresh, otherwise the result of `producer`.
    pub async fn get<F, Fut>(&self, producer: F) -> Arc<[Article]>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Vec<Article>>,
    {
        if let Some(data) = self.fresh_data().await {
            return data;
        }
        self.refresh_with(producer).await
    }

    #[instrument(level = "info", skip_all, fields(ttl_secs = self.ttl.as_secs()))]
    async fn refresh_with<F, Fut>(&self, producer: F) -> Arc<[Article]>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Vec<Article>>,
    {
        let _in_flight = self.refresh.lock().await;

        // Someone else may have refreshed while we waited for the guard.
        if let Some(data) = self.fresh_data().await {
            debug!("Refresh already completed by another caller");
            return data;
        }

        let fetched_at = self.clock.now();
        let data: Arc<[Article]> = producer().await.into();
        let entry = Arc::new(CacheEntry {
            data: Arc::clone(&data),
            fetched_at,
        });
        *self.entry.write().await = Some(entry);

        info!(count = data.len(), %fetched_at, "Cache refreshed");
        data
    }

    async fn fresh_data(&self) -> Option<Arc<[Article]>> {
        let guard = self.entry.read().await;
        let entry = guard.as_ref()?;
        let age = entry.age(self.clock.now());
        if age < self.ttl {
            debug!(age_secs = age.as_secs(), "Cache hit");
            Some(Arc::clone(&entry.data))
        } else {
            debug!(age_secs = age.as_secs(), "Cache stale");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::article;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(15 * 60);

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn cache_with_clock() -> (FreshnessCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start()));
        (FreshnessCache::with_clock(TTL, clock.clone()), clock)
    }

    fn producer(calls: &AtomicUsize, titles: &[&str]) -> Vec<Article> {
        calls.fetch_add(1, Ordering::SeqCst);
        titles
            .iter()
            .enumerate()
            .map(|(i, t)| article("P", &format!("p_{i}"), t, start()))
            .collect()
    }

    #[tokio::test]
    async fn test_cold_cache_runs_producer() {
        let (cache, _clock) = cache_with_clock();
        let calls = AtomicUsize::new(0);

        assert!(cache.entry().await.is_none());
        let data = cache.get(|| async { producer(&calls, &["One"]) }).await;

        assert_eq!(data.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let entry = cache.entry().await.unwrap();
        assert_eq!(entry.fetched_at, start());
    }

    #[tokio::test]
    async fn test_warm_cache_skips_producer() {
        let (cache, clock) = cache_with_clock();
        let calls = AtomicUsize::new(0);

        let first = cache.get(|| async { producer(&calls, &["One"]) }).await;
        clock.advance(Duration::from_secs(14 * 60 + 59));
        let second = cache.get(|| async { producer(&calls, &["Two"]) }).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_stale_cache_refreshes_once() {
        let (cache, clock) = cache_with_clock();
        let calls = AtomicUsize::new(0);

        cache.get(|| async { producer(&calls, &["One"]) }).await;
        clock.advance(TTL);
        let refreshed = cache.get(|| async { producer(&calls, &["Two"]) }).await;
        let again = cache.get(|| async { producer(&calls, &["Three"]) }).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(refreshed[0].title, "Two");
        assert_eq!(again[0].title, "Two");
        assert_eq!(cache.entry().await.unwrap().fetched_at, start() + chrono::Duration::minutes(15));
    }

    #[tokio::test]
    async fn test_empty_result_is_cached() {
        let (cache, clock) = cache_with_clock();
        let calls = AtomicUsize::new(0);

        let empty = cache.get(|| async { producer(&calls, &[]) }).await;
        clock.advance(Duration::from_secs(60));
        let still_empty = cache.get(|| async { producer(&calls, &["Late"]) }).await;

        assert!(empty.is_empty());
        assert!(still_empty.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_refresh() {
        let cache = Arc::new(FreshnessCache::new(TTL));
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    cache
                        .get(|| async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(50)).await;
                            vec![article("P", "p_0", "Only once", start())]
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            let data = task.await.unwrap();
            assert_eq!(data.len(), 1);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_entry_age_never_negative() {
        let entry = CacheEntry {
            data: Arc::from(Vec::new()),
            fetched_at: start(),
        };
        assert_eq!(entry.age(start() - chrono::Duration::minutes(5)), Duration::ZERO);
        assert_eq!(entry.age(start() + chrono::Duration::minutes(5)), Duration::from_secs(300));
    }

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new(start());
        clock.advance(Duration::from_secs(90));
        assert_eq!(clock.now(), start() + chrono::Duration::seconds(90));
    }
}

// Read-through cache for loaded range tables
use crate::domain::range_table::LoadedRanges;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

struct CacheEntry {
    key: Vec<String>,
    stored_at: Instant,
    value: Arc<LoadedRanges>,
}

/// Holds the most recent successful load for `ttl`.
///
/// The lock is held while a load runs, so overlapping callers wait for the
/// in-flight fetch instead of starting their own.
pub struct TableCache {
    ttl: Duration,
    entry: Mutex<Option<CacheEntry>>,
}

impl TableCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: Mutex::new(None),
        }
    }

    pub async fn get_or_load<F, Fut>(&self, key: &[String], load: F) -> Arc<LoadedRanges>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = LoadedRanges>,
    {
        let mut entry = self.entry.lock().await;

        if let Some(cached) = entry.as_ref() {
            if cached.key == key && cached.stored_at.elapsed() < self.ttl {
                tracing::debug!(ranges = key.len(), "range cache hit");
                return cached.value.clone();
            }
        }

        tracing::debug!(ranges = key.len(), "range cache miss");
        let value = Arc::new(load().await);

        // Degraded loads are not kept so the next caller retries
        *entry = if value.is_degraded() {
            None
        } else {
            Some(CacheEntry {
                key: key.to_vec(),
                stored_at: Instant::now(),
                value: value.clone(),
            })
        };

        value
    }

    pub async fn invalidate(&self) {
        let mut entry = self.entry.lock().await;
        if entry.take().is_some() {
            tracing::debug!("range cache invalidated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::range_table::{RangeRow, RangeTable};
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn key() -> Vec<String> {
        vec!["Induct 101 Min".to_string()]
    }

    fn loaded() -> LoadedRanges {
        let mut tables = BTreeMap::new();
        tables.insert(
            "Induct 101 Min".to_string(),
            RangeTable::new(vec![RangeRow::new("08:00", "Tote_util", 1.0)]),
        );
        LoadedRanges::new(tables)
    }

    async fn counted(cache: &TableCache, calls: &AtomicUsize, key: &[String]) -> Arc<LoadedRanges> {
        cache
            .get_or_load(key, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                loaded()
            })
            .await
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_within_ttl_returns_same_value() {
        let cache = TableCache::new(Duration::from_secs(300));
        let calls = AtomicUsize::new(0);

        let first = counted(&cache, &calls, &key()).await;
        tokio::time::advance(Duration::from_secs(299)).await;
        let second = counted(&cache, &calls, &key()).await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_triggers_new_load() {
        let cache = TableCache::new(Duration::from_secs(300));
        let calls = AtomicUsize::new(0);

        let first = counted(&cache, &calls, &key()).await;
        tokio::time::advance(Duration::from_secs(300)).await;
        let second = counted(&cache, &calls, &key()).await;

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_forces_reload() {
        let cache = TableCache::new(Duration::from_secs(300));
        let calls = AtomicUsize::new(0);

        counted(&cache, &calls, &key()).await;
        cache.invalidate().await;
        counted(&cache, &calls, &key()).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_different_key_misses() {
        let cache = TableCache::new(Duration::from_secs(300));
        let calls = AtomicUsize::new(0);

        counted(&cache, &calls, &key()).await;
        counted(&cache, &calls, &["Induct 102 Min".to_string()]).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_degraded_result_is_not_cached() {
        let cache = TableCache::new(Duration::from_secs(300));
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            cache
                .get_or_load(&key(), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    LoadedRanges::degraded(&key(), "down")
                })
                .await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}

//! Cached query results.
//!
//! Whole result sets are stored under `{kind}_queryset_{suffix}` so that a
//! repeated listing or aggregate query skips the database entirely. Writers
//! invalidate by the same key; there is no partial update of a cached set.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::types::EntityKind;

use super::backend::CacheBackend;
use super::config::CacheConfig;
use super::keys::queryset_key;
use super::object::{decode, encode};

const METRIC_QUERYSET_HIT: &str = "kontur_cache_queryset_hit_total";
const METRIC_QUERYSET_MISS: &str = "kontur_cache_queryset_miss_total";

#[derive(Clone)]
pub struct QuerysetCache {
    backend: Arc<dyn CacheBackend>,
    enabled: bool,
    default_ttl: Duration,
}

impl QuerysetCache {
    pub fn new(backend: Arc<dyn CacheBackend>, config: &CacheConfig) -> Self {
        Self {
            backend,
            enabled: config.enable_object_cache,
            default_ttl: config.default_ttl(),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Return the cached result set for `{kind}_queryset_{suffix}`, running
    /// the producer and caching its output on a miss. The producer is not
    /// evaluated when the cache already holds an entry.
    pub async fn get_cached_queryset<T, E, F, Fut>(
        &self,
        kind: EntityKind,
        suffix: &str,
        ttl: Duration,
        producer: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = queryset_key(kind, suffix);

        if self.enabled {
            if let Some(bytes) = self.backend.get(&key) {
                if let Some(cached) = decode(&key, &bytes) {
                    counter!(METRIC_QUERYSET_HIT).increment(1);
                    return Ok(cached);
                }
                self.backend.delete(&key);
            }
            counter!(METRIC_QUERYSET_MISS).increment(1);
        }

        let produced = producer().await?;
        if self.enabled {
            if let Some(bytes) = encode(&key, &produced) {
                self.backend.set(&key, bytes, ttl);
            }
        }
        Ok(produced)
    }

    /// Drop the cached result set so the next read recomputes it.
    pub fn invalidate_queryset_cache(&self, kind: EntityKind, suffix: &str) {
        self.backend.delete(&queryset_key(kind, suffix));
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::cache::backend::MemoryBackend;

    use super::*;

    fn cache() -> QuerysetCache {
        QuerysetCache::new(Arc::new(MemoryBackend::new()), &CacheConfig::default())
    }

    #[tokio::test]
    async fn producer_is_skipped_on_hit() {
        let cache = cache();
        let ttl = cache.default_ttl();
        let runs = AtomicU32::new(0);

        for _ in 0..3 {
            let rows: Vec<i64> = cache
                .get_cached_queryset(EntityKind::Advertisement, "statistics", ttl, || async {
                    runs.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, Infallible>(vec![1, 2, 3])
                })
                .await
                .expect("producer is infallible");
            assert_eq!(rows, vec![1, 2, 3]);
        }

        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidation_forces_recompute() {
        let cache = cache();
        let ttl = cache.default_ttl();
        let runs = AtomicU32::new(0);

        let produce = || async {
            let n = runs.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Infallible>(vec![i64::from(n)])
        };

        let first: Vec<i64> = cache
            .get_cached_queryset(EntityKind::Lead, "all", ttl, produce)
            .await
            .expect("producer is infallible");
        assert_eq!(first, vec![0]);

        cache.invalidate_queryset_cache(EntityKind::Lead, "all");

        let second: Vec<i64> = cache
            .get_cached_queryset(EntityKind::Lead, "all", ttl, produce)
            .await
            .expect("producer is infallible");
        assert_eq!(second, vec![1]);
    }

    #[tokio::test]
    async fn producer_error_is_propagated_and_nothing_cached() {
        let cache = cache();
        let ttl = cache.default_ttl();

        let result: Result<Vec<i64>, &str> = cache
            .get_cached_queryset(EntityKind::Contract, "all", ttl, || async { Err("boom") })
            .await;
        assert_eq!(result, Err("boom"));

        // A later successful producer still runs.
        let rows: Vec<i64> = cache
            .get_cached_queryset(EntityKind::Contract, "all", ttl, || async {
                Ok::<_, &str>(vec![7])
            })
            .await
            .expect("second producer succeeds");
        assert_eq!(rows, vec![7]);
    }
}

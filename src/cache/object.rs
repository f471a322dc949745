//! Per-instance object cache.
//!
//! Entries are keyed by entity kind and primary key (`{kind}_{pk}`) and hold
//! the serde_json-encoded record. Decode failures are treated as misses: the
//! cache is an optimization and must never fail the surrounding request.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use metrics::counter;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::domain::types::EntityKind;

use super::backend::CacheBackend;
use super::config::CacheConfig;
use super::keys::object_key;

const METRIC_OBJECT_HIT: &str = "kontur_cache_object_hit_total";
const METRIC_OBJECT_MISS: &str = "kontur_cache_object_miss_total";

#[derive(Clone)]
pub struct ObjectCache {
    backend: Arc<dyn CacheBackend>,
    enabled: bool,
    default_ttl: Duration,
}

impl ObjectCache {
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

    /// Look up a cached instance. Absence is a normal outcome, not an error.
    pub fn get_cached<T: DeserializeOwned>(&self, kind: EntityKind, pk: i64) -> Option<T> {
        if !self.enabled {
            return None;
        }
        let key = object_key(kind, pk);
        match self.backend.get(&key) {
            Some(bytes) => {
                let decoded = decode(&key, &bytes);
                if decoded.is_some() {
                    counter!(METRIC_OBJECT_HIT).increment(1);
                } else {
                    // Corrupt entry: drop it so the next read repopulates.
                    self.backend.delete(&key);
                    counter!(METRIC_OBJECT_MISS).increment(1);
                }
                decoded
            }
            None => {
                counter!(METRIC_OBJECT_MISS).increment(1);
                None
            }
        }
    }

    /// Read through the cache: on miss, load from the backing store and cache
    /// the result. A store miss yields `Ok(None)` without caching anything.
    pub async fn get_or_set_cached<T, E, F, Fut>(
        &self,
        kind: EntityKind,
        pk: i64,
        ttl: Duration,
        loader: F,
    ) -> Result<Option<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
    {
        if let Some(cached) = self.get_cached(kind, pk) {
            return Ok(Some(cached));
        }

        match loader().await? {
            Some(value) => {
                self.set_cache(kind, pk, &value, ttl);
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Unconditionally overwrite the cache entry for an instance.
    pub fn set_cache<T: Serialize>(&self, kind: EntityKind, pk: i64, value: &T, ttl: Duration) {
        if !self.enabled {
            return;
        }
        let key = object_key(kind, pk);
        if let Some(bytes) = encode(&key, value) {
            self.backend.set(&key, bytes, ttl);
        }
    }

    /// Remove the cache entry for an instance. Idempotent.
    pub fn invalidate_cache(&self, kind: EntityKind, pk: i64) {
        self.backend.delete(&object_key(kind, pk));
    }

    /// Remove entries for each primary key; never-cached keys are skipped.
    pub fn bulk_invalidate_cache(&self, kind: EntityKind, pks: &[i64]) {
        let keys: Vec<String> = pks.iter().map(|pk| object_key(kind, *pk)).collect();
        self.backend.delete_many(&keys);
    }
}

pub(crate) fn encode<T: Serialize>(key: &str, value: &T) -> Option<Bytes> {
    match serde_json::to_vec(value) {
        Ok(bytes) => Some(Bytes::from(bytes)),
        Err(error) => {
            warn!(key, error = %error, "failed to encode cache payload, skipping store");
            None
        }
    }
}

pub(crate) fn decode<T: DeserializeOwned>(key: &str, bytes: &Bytes) -> Option<T> {
    match serde_json::from_slice(bytes) {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(key, error = %error, "failed to decode cache payload, treating as miss");
            None
        }
    }
}

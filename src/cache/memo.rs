//! Memoized per-instance computations.
//!
//! Derived values such as advertisement conversion rates are cheap to cache
//! and expensive to recompute across many rows. Results are stored under a
//! digest of the method name and arguments so distinct argument sets do not
//! collide.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::types::EntityKind;

use super::backend::CacheBackend;
use super::config::CacheConfig;
use super::keys::method_key;
use super::object::{decode, encode};

#[derive(Clone)]
pub struct MethodCache {
    backend: Arc<dyn CacheBackend>,
    enabled: bool,
    default_ttl: Duration,
}

impl MethodCache {
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

    /// Return the memoized result for `(kind, method, pk, args)`, computing
    /// and caching it on a miss.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        kind: EntityKind,
        method: &str,
        pk: i64,
        args: &[&str],
        ttl: Duration,
        compute: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = method_key(kind, method, pk, args);

        if self.enabled {
            if let Some(bytes) = self.backend.get(&key) {
                if let Some(cached) = decode(&key, &bytes) {
                    return Ok(cached);
                }
                self.backend.delete(&key);
            }
        }

        let computed = compute().await?;
        if self.enabled {
            if let Some(bytes) = encode(&key, &computed) {
                self.backend.set(&key, bytes, ttl);
            }
        }
        Ok(computed)
    }

    /// Drop the memoized result for one argument set.
    pub fn invalidate(&self, kind: EntityKind, method: &str, pk: i64, args: &[&str]) {
        self.backend.delete(&method_key(kind, method, pk, args));
    }
}

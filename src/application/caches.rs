//! Cache handles shared by the application services.

use std::sync::Arc;

use crate::cache::{CacheBackend, CacheConfig, MethodCache, ObjectCache, QuerysetCache};
use crate::domain::types::EntityKind;

/// Suffix for cached full listings.
pub const QS_ALL: &str = "all";
/// Suffix for cached active-only listings.
pub const QS_ACTIVE: &str = "active";
/// Suffix for the cached advertisement statistics result set.
pub const QS_STATISTICS: &str = "statistics";

/// Method name under which per-advertisement metrics are memoized.
pub const METHOD_AD_METRICS: &str = "metrics";

/// One bundle per process; all layers share the same backend so a single
/// clear drops everything.
#[derive(Clone)]
pub struct CrmCaches {
    pub objects: ObjectCache,
    pub querysets: QuerysetCache,
    pub methods: MethodCache,
}

impl CrmCaches {
    pub fn new(backend: Arc<dyn CacheBackend>, config: &CacheConfig) -> Self {
        Self {
            objects: ObjectCache::new(backend.clone(), config),
            querysets: QuerysetCache::new(backend.clone(), config),
            methods: MethodCache::new(backend, config),
        }
    }

    /// Cached advertisement statistics become stale whenever an ad, lead,
    /// contract or customer changes.
    pub fn invalidate_ad_statistics(&self) {
        self.querysets
            .invalidate_queryset_cache(EntityKind::Advertisement, QS_STATISTICS);
    }

    /// Drop the memoized metrics for one advertisement.
    pub fn invalidate_ad_metrics(&self, ad_id: i64) {
        self.methods
            .invalidate(EntityKind::Advertisement, METHOD_AD_METRICS, ad_id, &[]);
    }
}

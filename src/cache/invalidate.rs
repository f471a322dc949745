//! View cache invalidation fan-out.
//!
//! After a write, the cached pages that rendered the touched entity are
//! stale for the actor who performed the write. Invalidation is scoped to
//! that actor and locale; other users keep their cached pages until the TTL
//! lapses. Backends that cannot enumerate keys by pattern fall back to a
//! full cache clear, which is correct but coarse.

use std::sync::Arc;

use metrics::counter;
use tracing::{debug, warn};

use crate::domain::permissions::Identity;

use super::backend::CacheBackend;
use super::keys::{all_views_pattern, view_pattern};

const METRIC_VIEW_KEYS_INVALIDATED: &str = "kontur_cache_view_keys_invalidated_total";
const METRIC_FULL_CLEAR: &str = "kontur_cache_full_clear_total";

#[derive(Clone)]
pub struct ViewCacheInvalidator {
    backend: Arc<dyn CacheBackend>,
}

impl ViewCacheInvalidator {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend }
    }

    /// Drop cached responses for the given views, scoped to the actor's
    /// user id and locale. `None` drops every cached view for that actor.
    pub fn invalidate_view_cache(&self, identity: &Identity, views: Option<&[&str]>) {
        let patterns: Vec<String> = match views {
            Some(views) => views
                .iter()
                .map(|view| view_pattern(view, identity.user, &identity.locale))
                .collect(),
            None => vec![all_views_pattern(identity.user, &identity.locale)],
        };

        for pattern in patterns {
            match self.backend.keys_matching(&pattern) {
                Some(keys) => {
                    if !keys.is_empty() {
                        debug!(pattern, count = keys.len(), "invalidating cached views");
                        counter!(METRIC_VIEW_KEYS_INVALIDATED).increment(keys.len() as u64);
                        self.backend.delete_many(&keys);
                    }
                }
                None => {
                    warn!(
                        pattern,
                        "backend cannot enumerate keys, clearing entire cache"
                    );
                    counter!(METRIC_FULL_CLEAR).increment(1);
                    self.backend.clear();
                    // Everything is gone, remaining patterns are moot.
                    return;
                }
            }
        }
    }
}

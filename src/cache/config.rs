//! Cache configuration.

use std::time::Duration;

use serde::Deserialize;

const DEFAULT_TTL_SECS: u64 = 300;
const DEFAULT_VIEW_TTL_SECS: u64 = 300;

/// Cache configuration from `kontur.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the object/queryset cache.
    pub enable_object_cache: bool,
    /// Enable the view response cache.
    pub enable_view_cache: bool,
    /// TTL for object, queryset, and memoized-method entries.
    pub default_ttl_secs: u64,
    /// TTL for cached view responses (a view may override it).
    pub view_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enable_object_cache: true,
            enable_view_cache: true,
            default_ttl_secs: DEFAULT_TTL_SECS,
            view_ttl_secs: DEFAULT_VIEW_TTL_SECS,
        }
    }
}

impl CacheConfig {
    pub fn is_enabled(&self) -> bool {
        self.enable_object_cache || self.enable_view_cache
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    pub fn view_ttl(&self) -> Duration {
        Duration::from_secs(self.view_ttl_secs)
    }
}

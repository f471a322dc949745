//! Kontur Cache System
//!
//! Provides the caching layers the CRM leans on:
//!
//! - **Object cache**: single entity instances keyed by kind and pk
//! - **Queryset cache**: whole query results keyed by kind and suffix
//! - **Method cache**: memoized per-instance computations
//! - **View cache**: buffered HTTP responses, scoped per user and locale
//!
//! ## Configuration
//!
//! Cache behavior is controlled via `kontur.toml`:
//!
//! ```toml
//! [cache]
//! enable_object_cache = true
//! enable_view_cache = true
//! default_ttl_secs = 300
//! view_ttl_secs = 300
//! ```

mod backend;
mod config;
mod invalidate;
pub mod keys;
mod lock;
mod memo;
mod middleware;
mod object;
mod queryset;

pub use backend::{CacheBackend, MemoryBackend};
pub use config::CacheConfig;
pub use invalidate::ViewCacheInvalidator;
pub use memo::MethodCache;
pub use middleware::{CachedHttpResponse, ViewCacheState, view_cache_layer};
pub use object::ObjectCache;
pub use queryset::QuerysetCache;

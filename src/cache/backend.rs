//! Key-value cache backends.
//!
//! The backend is an injected capability: components receive it as
//! `Arc<dyn CacheBackend>` rather than touching a process-global store.
//! Payloads are opaque bytes so one backend serves entity instances,
//! materialized querysets, and buffered HTTP responses alike.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use bytes::Bytes;

use super::keys::key_matches;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::backend";

/// Key-value cache store capability.
///
/// Every operation is infallible from the caller's point of view: a backend
/// failure degrades to a miss or a no-op, never to a request failure.
/// `keys_matching` returns `None` when the backend cannot enumerate keys by
/// pattern — a capability gap the invalidation fan-out must handle, not an
/// error.
pub trait CacheBackend: Send + Sync {
    fn get(&self, key: &str) -> Option<Bytes>;
    fn set(&self, key: &str, value: Bytes, ttl: Duration);
    /// Idempotent: deleting an absent key is not an error.
    fn delete(&self, key: &str);
    /// Unknown keys are silently skipped.
    fn delete_many(&self, keys: &[String]);
    fn keys_matching(&self, pattern: &str) -> Option<Vec<String>>;
    fn clear(&self);
}

struct Entry {
    value: Bytes,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-process backend with per-entry TTL and lazy expiry.
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, Entry>>,
    pattern_matching: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            pattern_matching: true,
        }
    }

    /// Backend variant that reports the pattern-enumeration capability gap,
    /// forcing invalidation to take the full-clear fallback.
    pub fn without_pattern_matching() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            pattern_matching: false,
        }
    }

    /// Number of live (non-expired) entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        rw_read(&self.entries, SOURCE, "len")
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheBackend for MemoryBackend {
    fn get(&self, key: &str) -> Option<Bytes> {
        let now = Instant::now();
        {
            let entries = rw_read(&self.entries, SOURCE, "get");
            match entries.get(key) {
                Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        // Expired: drop the stale entry before reporting a miss.
        rw_write(&self.entries, SOURCE, "get.evict_expired").remove(key);
        None
    }

    fn set(&self, key: &str, value: Bytes, ttl: Duration) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        rw_write(&self.entries, SOURCE, "set").insert(key.to_string(), entry);
    }

    fn delete(&self, key: &str) {
        rw_write(&self.entries, SOURCE, "delete").remove(key);
    }

    fn delete_many(&self, keys: &[String]) {
        let mut entries = rw_write(&self.entries, SOURCE, "delete_many");
        for key in keys {
            entries.remove(key);
        }
    }

    fn keys_matching(&self, pattern: &str) -> Option<Vec<String>> {
        if !self.pattern_matching {
            return None;
        }
        let now = Instant::now();
        let entries = rw_read(&self.entries, SOURCE, "keys_matching");
        Some(
            entries
                .iter()
                .filter(|(key, entry)| !entry.is_expired(now) && key_matches(pattern, key))
                .map(|(key, _)| key.clone())
                .collect(),
        )
    }

    fn clear(&self) {
        rw_write(&self.entries, SOURCE, "clear").clear();
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;

    const TTL: Duration = Duration::from_secs(300);

    #[test]
    fn set_get_delete_roundtrip() {
        let backend = MemoryBackend::new();
        assert!(backend.get("advertisement_1").is_none());

        backend.set("advertisement_1", Bytes::from("payload"), TTL);
        assert_eq!(backend.get("advertisement_1"), Some(Bytes::from("payload")));

        backend.delete("advertisement_1");
        assert!(backend.get("advertisement_1").is_none());

        // Deleting again is a no-op.
        backend.delete("advertisement_1");
    }

    #[test]
    fn entries_expire() {
        let backend = MemoryBackend::new();
        backend.set("lead_1", Bytes::from("x"), Duration::ZERO);
        assert!(backend.get("lead_1").is_none());
        assert!(backend.is_empty());
    }

    #[test]
    fn delete_many_skips_unknown_keys() {
        let backend = MemoryBackend::new();
        backend.set("product_1", Bytes::from("a"), TTL);
        backend.set("product_2", Bytes::from("b"), TTL);

        backend.delete_many(&[
            "product_1".to_string(),
            "product_9".to_string(),
            "product_2".to_string(),
        ]);

        assert!(backend.is_empty());
    }

    #[test]
    fn keys_matching_enumerates_live_keys() {
        let backend = MemoryBackend::new();
        backend.set("crm:view:AdsListView:1:en:aaa", Bytes::from("x"), TTL);
        backend.set("crm:view:AdsListView:1:en:bbb", Bytes::from("y"), TTL);
        backend.set("crm:view:AdsListView:2:en:aaa", Bytes::from("z"), TTL);

        let mut keys = backend
            .keys_matching("crm:view:AdsListView:1:en:*")
            .expect("pattern matching supported");
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "crm:view:AdsListView:1:en:aaa".to_string(),
                "crm:view:AdsListView:1:en:bbb".to_string(),
            ]
        );
    }

    #[test]
    fn capability_gap_reports_none() {
        let backend = MemoryBackend::without_pattern_matching();
        backend.set("crm:view:AdsListView:1:en:aaa", Bytes::from("x"), TTL);
        assert!(backend.keys_matching("crm:view:*").is_none());
    }

    #[test]
    fn clear_removes_everything() {
        let backend = MemoryBackend::new();
        backend.set("product_1", Bytes::from("a"), TTL);
        backend.set("lead_1", Bytes::from("b"), TTL);
        backend.clear();
        assert!(backend.is_empty());
    }

    #[test]
    fn recovers_from_poisoned_lock() {
        let backend = MemoryBackend::new();
        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = backend.entries.write().expect("entries lock");
            panic!("poison entries lock");
        }));

        backend.set("product_1", Bytes::from("a"), TTL);
        assert!(backend.get("product_1").is_some());
    }
}

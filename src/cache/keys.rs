//! Cache key derivation.
//!
//! Key formats are shared with other deployments reading the same cache
//! store, so they are fixed strings rather than hashed enums:
//!
//! - object entries: `{kind}_{pk}`
//! - queryset entries: `{kind}_queryset_{suffix}`
//! - view responses: `crm:view:{view}:{actor}:{locale}:{md5_hex(full_path)}`

use crate::domain::types::EntityKind;

const VIEW_KEY_PREFIX: &str = "crm:view";

/// Key for a single cached entity instance.
pub fn object_key(kind: EntityKind, pk: i64) -> String {
    format!("{}_{}", kind.as_str(), pk)
}

/// Key for a named, materialized queryset result.
pub fn queryset_key(kind: EntityKind, suffix: &str) -> String {
    format!("{}_queryset_{}", kind.as_str(), suffix)
}

/// Actor segment of view keys: the user id, or the literal `anonymous`.
pub fn actor_label(user: Option<i64>) -> String {
    match user {
        Some(id) => id.to_string(),
        None => "anonymous".to_string(),
    }
}

/// Key for a cached view response. `full_path` is the request path including
/// the query string.
pub fn view_key(view: &str, user: Option<i64>, locale: &str, full_path: &str) -> String {
    format!(
        "{VIEW_KEY_PREFIX}:{view}:{}:{locale}:{:x}",
        actor_label(user),
        md5::compute(full_path)
    )
}

/// Wildcard over every cached path of one view for one actor/locale pairing.
pub fn view_pattern(view: &str, user: Option<i64>, locale: &str) -> String {
    format!("{VIEW_KEY_PREFIX}:{view}:{}:{locale}:*", actor_label(user))
}

/// Wildcard over every view for one actor/locale pairing.
pub fn all_views_pattern(user: Option<i64>, locale: &str) -> String {
    format!("{VIEW_KEY_PREFIX}:*:{}:{locale}:*", actor_label(user))
}

/// Key for a memoized per-instance method result.
pub fn method_key(kind: EntityKind, method: &str, pk: i64, args: &[&str]) -> String {
    let mut parts = vec![format!("{}_{method}_{pk}", kind.as_str())];
    parts.extend(args.iter().map(|arg| arg.to_string()));
    format!("{:x}", md5::compute(parts.join("_")))
}

/// Glob match supporting `*` only.
pub fn key_matches(pattern: &str, key: &str) -> bool {
    let segments: Vec<&str> = pattern.split('*').collect();
    if segments.len() == 1 {
        return pattern == key;
    }

    let mut rest = key;
    for (index, segment) in segments.iter().enumerate() {
        if segment.is_empty() {
            continue;
        }
        if index == 0 {
            match rest.strip_prefix(segment) {
                Some(tail) => rest = tail,
                None => return false,
            }
        } else if index == segments.len() - 1 {
            return rest.ends_with(segment);
        } else {
            match rest.find(segment) {
                Some(found) => rest = &rest[found + segment.len()..],
                None => return false,
            }
        }
    }

    // Pattern ended with `*`: any remainder is fine.
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_and_queryset_keys() {
        assert_eq!(object_key(EntityKind::Advertisement, 7), "advertisement_7");
        assert_eq!(
            queryset_key(EntityKind::Product, "active"),
            "product_queryset_active"
        );
    }

    #[test]
    fn view_key_format_is_reproducible() {
        // md5("/ads/") = 43f94ba4951e29cef0a86d11de7b152d
        let key = view_key("AdsListView", None, "en", "/ads/");
        assert_eq!(
            key,
            "crm:view:AdsListView:anonymous:en:43f94ba4951e29cef0a86d11de7b152d"
        );

        let key = view_key("AdsListView", Some(42), "de", "/ads/");
        assert_eq!(
            key,
            "crm:view:AdsListView:42:de:43f94ba4951e29cef0a86d11de7b152d"
        );
    }

    #[test]
    fn view_key_includes_query_string() {
        assert_ne!(
            view_key("AdsListView", None, "en", "/ads/"),
            view_key("AdsListView", None, "en", "/ads/?page=2")
        );
    }

    #[test]
    fn patterns() {
        assert_eq!(
            view_pattern("AdsListView", Some(1), "en"),
            "crm:view:AdsListView:1:en:*"
        );
        assert_eq!(all_views_pattern(None, "en"), "crm:view:*:anonymous:en:*");
    }

    #[test]
    fn pattern_matching() {
        let key = view_key("AdsListView", Some(1), "en", "/ads/");
        assert!(key_matches("crm:view:AdsListView:1:en:*", &key));
        assert!(key_matches("crm:view:*:1:en:*", &key));
        assert!(!key_matches("crm:view:AdsListView:2:en:*", &key));
        assert!(!key_matches("crm:view:AdsListView:1:de:*", &key));
        assert!(key_matches("advertisement_7", "advertisement_7"));
        assert!(!key_matches("advertisement_7", "advertisement_71"));
    }

    #[test]
    fn method_keys_vary_by_instance_and_args() {
        let base = method_key(EntityKind::Advertisement, "metrics", 1, &[]);
        assert_ne!(base, method_key(EntityKind::Advertisement, "metrics", 2, &[]));
        assert_ne!(
            base,
            method_key(EntityKind::Advertisement, "metrics", 1, &["active"])
        );
        assert_eq!(base, method_key(EntityKind::Advertisement, "metrics", 1, &[]));
    }
}

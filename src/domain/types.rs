//! Shared domain enumerations aligned with persisted database enums.

use serde::{Deserialize, Serialize};

/// Promotion channel for an advertising campaign (mirrors Postgres enum `ad_channel`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "ad_channel", rename_all = "snake_case")]
pub enum AdChannel {
    Social,
    Search,
    Context,
    Email,
    Other,
}

impl AdChannel {
    pub fn as_str(self) -> &'static str {
        match self {
            AdChannel::Social => "social",
            AdChannel::Search => "search",
            AdChannel::Context => "context",
            AdChannel::Email => "email",
            AdChannel::Other => "other",
        }
    }
}

/// Entity type identifier used for cache keys and permission checks.
///
/// Cache keys embed the lowercase identifier, so the mapping is part of the
/// stored key format and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Product,
    Advertisement,
    Lead,
    Contract,
    Customer,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Product => "product",
            EntityKind::Advertisement => "advertisement",
            EntityKind::Lead => "lead",
            EntityKind::Contract => "contract",
            EntityKind::Customer => "customer",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_wire_names_are_lowercase() {
        assert_eq!(AdChannel::Social.as_str(), "social");
        assert_eq!(
            serde_json::to_string(&AdChannel::Context).expect("serialize channel"),
            "\"context\""
        );
    }

    #[test]
    fn entity_kind_identifiers_are_stable() {
        assert_eq!(EntityKind::Advertisement.as_str(), "advertisement");
        assert_eq!(EntityKind::Customer.as_str(), "customer");
    }
}

//! Role-based permission checks.
//!
//! Identity itself comes from a fronting proxy (trusted headers); this module
//! only answers "may this role perform this action on this entity type".

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::types::EntityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Operator,
    Marketer,
    Manager,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Operator => "operator",
            Role::Marketer => "marketer",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "operator" => Ok(Role::Operator),
            "marketer" => Ok(Role::Marketer),
            "manager" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Add,
    Change,
    Delete,
    /// The dedicated advertisement-statistics permission.
    ViewStats,
}

/// Authenticated request identity, installed by the HTTP layer.
///
/// `user` is `None` for anonymous requests; the cache layer renders that as
/// the literal `anonymous` actor.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user: Option<i64>,
    pub role: Option<Role>,
    pub locale: String,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            user: None,
            role: None,
            locale: "en".to_string(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Permission-checking collaborator consumed before any cached or mutating
/// operation.
pub trait PermissionGate: Send + Sync {
    fn allows(&self, role: Role, action: Action, kind: EntityKind) -> bool;
}

/// Static role/permission matrix mirroring the operator, marketer, and
/// manager groups shipped with the original deployment.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticGate;

impl PermissionGate for StaticGate {
    fn allows(&self, role: Role, action: Action, kind: EntityKind) -> bool {
        use Action::*;
        use EntityKind::*;

        match role {
            Role::Admin => true,
            Role::Operator => matches!(
                (action, kind),
                (Add | Change | View, Lead) | (ViewStats, Advertisement)
            ),
            Role::Marketer => matches!(
                (action, kind),
                (Add | Change | View, Product)
                    | (Add | Change | View, Advertisement)
                    | (ViewStats, Advertisement)
            ),
            Role::Manager => matches!(
                (action, kind),
                (View, Lead)
                    | (Add | View, Customer)
                    | (Add | Change | View, Contract)
                    | (ViewStats, Advertisement)
            ),
        }
    }
}

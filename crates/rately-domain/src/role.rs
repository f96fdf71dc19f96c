//! User roles and the capabilities they grant.
//!
//! Authorization decisions go through the capability predicates below
//! rather than comparing roles directly, so the mapping from role to
//! permission lives in exactly one place.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    StoreOwner,
    Admin,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Role::User),
            "store_owner" => Some(Role::StoreOwner),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::StoreOwner => "store_owner",
            Role::Admin => "admin",
        }
    }

    /// Create, list and inspect user accounts.
    pub fn can_manage_users(self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Create stores and assign owners.
    pub fn can_manage_stores(self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn can_view_platform_stats(self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn can_view_owner_dashboard(self) -> bool {
        matches!(self, Role::StoreOwner | Role::Admin)
    }
}

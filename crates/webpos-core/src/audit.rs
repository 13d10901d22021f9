//! # Audit Log
//!
//! The append-only trail of user and system actions. Entries are written
//! for creates, updates, deletes, logins, failed logins and permission
//! changes, and are never edited or purged by ordinary operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

// =============================================================================
// Action Kind
// =============================================================================

/// What an [`ActionLog`] entry records. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Create,
    Update,
    Delete,
    Login,
    FailedLogin,
    PermissionChange,
}

impl ActionKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Create => "create",
            ActionKind::Update => "update",
            ActionKind::Delete => "delete",
            ActionKind::Login => "login",
            ActionKind::FailedLogin => "failed_login",
            ActionKind::PermissionChange => "permission_change",
        }
    }

    pub const ALL: [&'static str; 6] = [
        "create", "update", "delete", "login", "failed_login", "permission_change",
    ];
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(ActionKind::Create),
            "update" => Ok(ActionKind::Update),
            "delete" => Ok(ActionKind::Delete),
            "login" => Ok(ActionKind::Login),
            "failed_login" => Ok(ActionKind::FailedLogin),
            "permission_change" => Ok(ActionKind::PermissionChange),
            _ => Err(ValidationError::NotAllowed {
                field: "action_type".to_string(),
                allowed: ActionKind::ALL.iter().map(|s| s.to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Action Log
// =============================================================================

/// One audit-trail entry.
///
/// `user_id` is optional: system actions and failed logins may have no
/// attributable user, and the reference is nulled out rather than losing
/// the record when a user account is removed. `details` carries an
/// optional JSON payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ActionLog {
    pub id: String,
    pub tenant_id: String,
    pub user_id: Option<String>,
    pub model_name: String,
    pub object_id: String,
    pub action: ActionKind,
    pub timestamp: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub details: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

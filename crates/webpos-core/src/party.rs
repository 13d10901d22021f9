//! # Party Entities
//!
//! The people and organizations a tenant deals with: authenticated
//! [`User`]s, [`Customer`]s, [`Vendor`]s and the [`Contract`]s binding
//! them.
//!
//! Authentication mechanics (tokens, password storage) belong to an
//! external identity component; this layer only records the identity and
//! its role so every mutating operation is attributable.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

// =============================================================================
// Role
// =============================================================================

/// The role of an authenticated actor.
///
/// A closed set: unrecognized values are rejected at the boundary
/// (serde and [`FromStr`] both fail), never stored as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Cashier,
    Manager,
    Admin,
    Customer,
    Supplier,
    Employee,
}

impl Role {
    /// The stored choice string for this role.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Cashier => "cashier",
            Role::Manager => "manager",
            Role::Admin => "admin",
            Role::Customer => "customer",
            Role::Supplier => "supplier",
            Role::Employee => "employee",
        }
    }

    /// All valid choice strings, for error reporting.
    pub const ALL: [&'static str; 6] = [
        "cashier", "manager", "admin", "customer", "supplier", "employee",
    ];
}

impl Default for Role {
    fn default() -> Self {
        Role::Employee
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cashier" => Ok(Role::Cashier),
            "manager" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            "customer" => Ok(Role::Customer),
            "supplier" => Ok(Role::Supplier),
            "employee" => Ok(Role::Employee),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: Role::ALL.iter().map(|s| s.to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// An authenticated actor within a tenant.
///
/// `profile_picture` is an opaque file reference. `last_login` is
/// maintained by the identity component on each token issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub tenant_id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub profile_picture: Option<String>,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Customer
// =============================================================================

/// A buyer, optionally linked to a [`User`] account.
///
/// Created on first purchase or on registration; the link to a user is
/// nulled out if the user account is removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub tenant_id: String,
    pub user_id: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Vendor
// =============================================================================

/// A supplier of goods, referenced by procurement records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Vendor {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub contact_person: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Contract
// =============================================================================

/// The kind of legal agreement a contract represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum ContractKind {
    Employee,
    Supplier,
    Customer,
}

impl ContractKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ContractKind::Employee => "employee",
            ContractKind::Supplier => "supplier",
            ContractKind::Customer => "customer",
        }
    }
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A legal agreement between the tenant and a user.
///
/// `contract_file` is an opaque file reference. An open-ended contract
/// has no `end_date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Contract {
    pub id: String,
    pub tenant_id: String,
    pub user_id: Option<String>,
    pub contract_file: String,
    pub kind: ContractKind,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Contract {
    /// Whether the contract covers `date`: active, started, and not yet
    /// past its end date (an absent end date never expires).
    pub fn is_current(&self, date: NaiveDate) -> bool {
        if !self.is_active || date < self.start_date {
            return false;
        }
        match self.end_date {
            Some(end) => date <= end,
            None => true,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn role_round_trips_choice_strings() {
        for s in Role::ALL {
            let role: Role = s.parse().unwrap();
            assert_eq!(role.as_str(), s);
        }
    }

    #[test]
    fn role_rejects_unknown_values() {
        let err = "owner".parse::<Role>().unwrap_err();
        assert!(matches!(err, ValidationError::NotAllowed { .. }));
    }

    #[test]
    fn role_rejects_unknown_wire_values() {
        // The serde boundary is where external input arrives.
        assert!(serde_json::from_str::<Role>("\"cashier\"").is_ok());
        assert!(serde_json::from_str::<Role>("\"pirate\"").is_err());
        assert!(serde_json::from_str::<Role>("\"Cashier\"").is_err());
    }

    #[test]
    fn role_default_is_employee() {
        assert_eq!(Role::default(), Role::Employee);
    }

    #[test]
    fn contract_currency_window() {
        let contract = Contract {
            id: "c1".to_string(),
            tenant_id: "t1".to_string(),
            user_id: Some("u1".to_string()),
            contract_file: "contracts/c1.pdf".to_string(),
            kind: ContractKind::Employee,
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end_date: Some(NaiveDate::from_ymd_opt(2026, 12, 31).unwrap()),
            is_active: true,
            created_at: Utc::now(),
        };

        assert!(contract.is_current(NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()));
        assert!(!contract.is_current(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()));
        assert!(!contract.is_current(NaiveDate::from_ymd_opt(2027, 1, 1).unwrap()));

        let lapsed = Contract {
            is_active: false,
            ..contract.clone()
        };
        assert!(!lapsed.is_current(NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()));

        let open_ended = Contract {
            end_date: None,
            ..contract
        };
        assert!(open_ended.is_current(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()));
    }
}

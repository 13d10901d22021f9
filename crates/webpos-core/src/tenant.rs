//! # Tenant Layer
//!
//! The foundational tenant-scoped entities: [`Tenant`] (the unit of
//! multi-tenant partitioning), [`Store`] and [`Category`].
//!
//! Every other entity in the schema carries a `tenant_id` pointing here;
//! cross-tenant references are never permitted, and the persistence layer
//! scopes every query to exactly one tenant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Tenant
// =============================================================================

/// A subscribing business - the root of the multi-tenant partition.
///
/// Document fields (`tax_certificate`, `business_license`) are opaque file
/// references; the schema stores only the path, never the bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub tax_certificate: Option<String>,
    pub business_license: Option<String>,
    pub subscription_plan: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Store
// =============================================================================

/// A physical or sales location belonging to a tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Store {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Category
// =============================================================================

/// A grouping for catalog items (products and services alike).
///
/// Deleting a category does not delete its items; their category reference
/// is nulled out (SET NULL policy in the schema).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub description: String,
}

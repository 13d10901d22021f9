//! # Tenant Repository
//!
//! CRUD for tenants themselves. This is the one unscoped repository:
//! there is no outer tenant to scope by. Everything a tenant owns is
//! reached through [`crate::TenantContext`] instead.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use webpos_core::Tenant;

const COLUMNS: &str = "id, name, address, phone, email, tax_certificate, \
                       business_license, subscription_plan, created_at, updated_at";

/// Repository for tenant records.
#[derive(Debug, Clone)]
pub struct TenantRepository {
    pool: SqlitePool,
}

impl TenantRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TenantRepository { pool }
    }

    /// Inserts a new tenant.
    pub async fn create(&self, tenant: &Tenant) -> DbResult<()> {
        debug!(id = %tenant.id, name = %tenant.name, "Creating tenant");

        sqlx::query(
            "INSERT INTO tenants (id, name, address, phone, email, tax_certificate, \
             business_license, subscription_plan, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&tenant.id)
        .bind(&tenant.name)
        .bind(&tenant.address)
        .bind(&tenant.phone)
        .bind(&tenant.email)
        .bind(&tenant.tax_certificate)
        .bind(&tenant.business_license)
        .bind(&tenant.subscription_plan)
        .bind(tenant.created_at)
        .bind(tenant.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a tenant by id.
    pub async fn get(&self, id: &str) -> DbResult<Option<Tenant>> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {COLUMNS} FROM tenants WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tenant)
    }

    /// Lists all tenants, newest first.
    pub async fn list(&self) -> DbResult<Vec<Tenant>> {
        let tenants = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {COLUMNS} FROM tenants ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(tenants)
    }

    /// Updates a tenant's profile fields.
    pub async fn update(&self, tenant: &Tenant) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE tenants SET name = ?, address = ?, phone = ?, email = ?, \
             tax_certificate = ?, business_license = ?, subscription_plan = ?, \
             updated_at = ? WHERE id = ?",
        )
        .bind(&tenant.name)
        .bind(&tenant.address)
        .bind(&tenant.phone)
        .bind(&tenant.email)
        .bind(&tenant.tax_certificate)
        .bind(&tenant.business_license)
        .bind(&tenant.subscription_plan)
        .bind(tenant.updated_at)
        .bind(&tenant.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Tenant", &tenant.id));
        }

        Ok(())
    }

    /// Deletes a tenant and, through CASCADE, everything it owns.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting tenant");

        let result = sqlx::query("DELETE FROM tenants WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Tenant", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

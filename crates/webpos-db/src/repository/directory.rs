//! # Store & Category Repositories
//!
//! The tenant's structural directory: locations and catalog groupings.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use webpos_core::{Category, Store};

// =============================================================================
// Stores
// =============================================================================

/// Repository for a tenant's stores.
#[derive(Debug, Clone)]
pub struct StoreRepository {
    pool: SqlitePool,
    tenant_id: String,
}

impl StoreRepository {
    pub fn new(pool: SqlitePool, tenant_id: String) -> Self {
        StoreRepository { pool, tenant_id }
    }

    /// Inserts a new store. The row's tenant id is forced to the scope's.
    pub async fn create(&self, store: &Store) -> DbResult<()> {
        debug!(id = %store.id, name = %store.name, "Creating store");

        sqlx::query(
            "INSERT INTO stores (id, tenant_id, name, location, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&store.id)
        .bind(&self.tenant_id)
        .bind(&store.name)
        .bind(&store.location)
        .bind(store.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a store by id, within this tenant only.
    pub async fn get(&self, id: &str) -> DbResult<Option<Store>> {
        let store = sqlx::query_as::<_, Store>(
            "SELECT id, tenant_id, name, location, created_at \
             FROM stores WHERE id = ? AND tenant_id = ?",
        )
        .bind(id)
        .bind(&self.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(store)
    }

    /// Lists the tenant's stores by name.
    pub async fn list(&self) -> DbResult<Vec<Store>> {
        let stores = sqlx::query_as::<_, Store>(
            "SELECT id, tenant_id, name, location, created_at \
             FROM stores WHERE tenant_id = ? ORDER BY name",
        )
        .bind(&self.tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(stores)
    }

    /// Updates a store's name and location.
    pub async fn update(&self, store: &Store) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE stores SET name = ?, location = ? WHERE id = ? AND tenant_id = ?",
        )
        .bind(&store.name)
        .bind(&store.location)
        .bind(&store.id)
        .bind(&self.tenant_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Store", &store.id));
        }

        Ok(())
    }

    /// Deletes a store and, through CASCADE, its products and inventories.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM stores WHERE id = ? AND tenant_id = ?")
            .bind(id)
            .bind(&self.tenant_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Store", id));
        }

        Ok(())
    }
}

// =============================================================================
// Categories
// =============================================================================

/// Repository for a tenant's catalog categories.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
    tenant_id: String,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool, tenant_id: String) -> Self {
        CategoryRepository { pool, tenant_id }
    }

    /// Inserts a new category.
    pub async fn create(&self, category: &Category) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO categories (id, tenant_id, name, description) VALUES (?, ?, ?, ?)",
        )
        .bind(&category.id)
        .bind(&self.tenant_id)
        .bind(&category.name)
        .bind(&category.description)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a category by id, within this tenant only.
    pub async fn get(&self, id: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, tenant_id, name, description \
             FROM categories WHERE id = ? AND tenant_id = ?",
        )
        .bind(id)
        .bind(&self.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Lists the tenant's categories by name.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, tenant_id, name, description \
             FROM categories WHERE tenant_id = ? ORDER BY name",
        )
        .bind(&self.tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Updates a category.
    pub async fn update(&self, category: &Category) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE categories SET name = ?, description = ? WHERE id = ? AND tenant_id = ?",
        )
        .bind(&category.name)
        .bind(&category.description)
        .bind(&category.id)
        .bind(&self.tenant_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", &category.id));
        }

        Ok(())
    }

    /// Deletes a category. Products and services keep existing with their
    /// category reference nulled out (SET NULL policy).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ? AND tenant_id = ?")
            .bind(id)
            .bind(&self.tenant_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig, TenantContext};
    use chrono::Utc;
    use webpos_core::{new_id, Tenant};

    async fn tenant_ctx(db: &Database, name: &str) -> TenantContext {
        let now = Utc::now();
        let tenant = Tenant {
            id: new_id(),
            name: name.to_string(),
            address: String::new(),
            phone: String::new(),
            email: String::new(),
            tax_certificate: None,
            business_license: None,
            subscription_plan: "starter".to_string(),
            created_at: now,
            updated_at: now,
        };
        db.tenants().create(&tenant).await.unwrap();
        db.tenant(tenant.id)
    }

    fn sample_store(name: &str) -> Store {
        Store {
            id: new_id(),
            tenant_id: String::new(), // repository injects the scope's id
            name: name.to_string(),
            location: "Main Road".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn store_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = tenant_ctx(&db, "Shop A").await;

        let store = sample_store("Downtown");
        ctx.stores().create(&store).await.unwrap();

        let fetched = ctx.stores().get(&store.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Downtown");
        assert_eq!(fetched.tenant_id, ctx.tenant_id());
    }

    #[tokio::test]
    async fn stores_are_invisible_across_tenants() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx_a = tenant_ctx(&db, "Shop A").await;
        let ctx_b = tenant_ctx(&db, "Shop B").await;

        let store = sample_store("Downtown");
        ctx_a.stores().create(&store).await.unwrap();

        // Tenant B can neither read nor delete tenant A's store.
        assert!(ctx_b.stores().get(&store.id).await.unwrap().is_none());
        assert!(ctx_b.stores().list().await.unwrap().is_empty());
        assert!(matches!(
            ctx_b.stores().delete(&store.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));

        // It is still there for tenant A.
        assert!(ctx_a.stores().get(&store.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn category_delete_leaves_no_rows() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = tenant_ctx(&db, "Shop A").await;

        let category = Category {
            id: new_id(),
            tenant_id: String::new(),
            name: "Beverages".to_string(),
            description: String::new(),
        };
        ctx.categories().create(&category).await.unwrap();
        assert_eq!(ctx.categories().list().await.unwrap().len(), 1);

        ctx.categories().delete(&category.id).await.unwrap();
        assert!(ctx.categories().list().await.unwrap().is_empty());
    }
}

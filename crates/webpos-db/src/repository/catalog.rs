//! # Catalog Repositories
//!
//! Products (with their one-to-one virtual detail records) and services.
//!
//! ## Identity
//! Products are dual-keyed: the UUID `id` for relations, plus `sku` and
//! `barcode` as business identifiers. Both of the latter are unique across
//! the whole system, not just within a tenant, so a scanned barcode
//! resolves unambiguously no matter which tenant's terminal scans it.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use webpos_core::validation::{
    validate_barcode, validate_name, validate_price_cents, validate_rate_bps, validate_sku,
};
use webpos_core::{Product, Service, VirtualProduct};

// =============================================================================
// Products
// =============================================================================

const PRODUCT_COLUMNS: &str = "id, tenant_id, store_id, category_id, name, sku, barcode, \
     description, price_cents, cost_price_cents, quantity, expiry_date, is_damaged, \
     damaged_quantity, is_discounted, discount_percent_bps, surplus_quantity, supply_pcu, \
     is_virtual, validity_days, max_redemptions, created_at, updated_at";

/// Repository for a tenant's products.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
    tenant_id: String,
}

/// Field checks shared by every product write. Runs before the statement
/// so an invalid product never reaches the database.
fn validate_product(product: &Product) -> DbResult<()> {
    validate_sku(&product.sku)?;
    validate_barcode(&product.barcode)?;
    validate_name(&product.name)?;
    validate_price_cents(product.price_cents)?;
    validate_price_cents(product.cost_price_cents)?;
    validate_rate_bps(product.discount_percent_bps)?;
    Ok(())
}

impl ProductRepository {
    pub fn new(pool: SqlitePool, tenant_id: String) -> Self {
        ProductRepository { pool, tenant_id }
    }

    /// Inserts a new product.
    ///
    /// Fails with [`DbError::Validation`] on malformed fields, and with
    /// [`DbError::UniqueViolation`] on a duplicate sku or barcode.
    pub async fn create(&self, product: &Product) -> DbResult<()> {
        validate_product(product)?;

        debug!(id = %product.id, sku = %product.sku, "Creating product");

        sqlx::query(
            "INSERT INTO products (id, tenant_id, store_id, category_id, name, sku, \
             barcode, description, price_cents, cost_price_cents, quantity, expiry_date, \
             is_damaged, damaged_quantity, is_discounted, discount_percent_bps, \
             surplus_quantity, supply_pcu, is_virtual, validity_days, max_redemptions, \
             created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&product.id)
        .bind(&self.tenant_id)
        .bind(&product.store_id)
        .bind(&product.category_id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.barcode)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.cost_price_cents)
        .bind(product.quantity)
        .bind(product.expiry_date)
        .bind(product.is_damaged)
        .bind(product.damaged_quantity)
        .bind(product.is_discounted)
        .bind(product.discount_percent_bps)
        .bind(product.surplus_quantity)
        .bind(product.supply_pcu)
        .bind(product.is_virtual)
        .bind(product.validity_days)
        .bind(product.max_redemptions)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts a virtual product and its detail record in one transaction.
    ///
    /// The detail row is one-to-one: a second detail for the same product
    /// fails with a uniqueness violation and rolls back.
    pub async fn create_virtual(
        &self,
        product: &Product,
        detail: &VirtualProduct,
    ) -> DbResult<()> {
        validate_product(product)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query(
            "INSERT INTO products (id, tenant_id, store_id, category_id, name, sku, \
             barcode, description, price_cents, cost_price_cents, quantity, expiry_date, \
             is_damaged, damaged_quantity, is_discounted, discount_percent_bps, \
             surplus_quantity, supply_pcu, is_virtual, validity_days, max_redemptions, \
             created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?, ?, ?)",
        )
        .bind(&product.id)
        .bind(&self.tenant_id)
        .bind(&product.store_id)
        .bind(&product.category_id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.barcode)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.cost_price_cents)
        .bind(product.quantity)
        .bind(product.expiry_date)
        .bind(product.is_damaged)
        .bind(product.damaged_quantity)
        .bind(product.is_discounted)
        .bind(product.discount_percent_bps)
        .bind(product.surplus_quantity)
        .bind(product.supply_pcu)
        .bind(product.validity_days)
        .bind(product.max_redemptions)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO virtual_products (id, product_id, kind, provider_name, \
             denomination_cents, validity_period_days, terms_and_conditions) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&detail.id)
        .bind(&product.id)
        .bind(detail.kind)
        .bind(&detail.provider_name)
        .bind(detail.denomination_cents)
        .bind(detail.validity_period_days)
        .bind(&detail.terms_and_conditions)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Gets a product by id, within this tenant only.
    pub async fn get(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ? AND tenant_id = ?"
        ))
        .bind(id)
        .bind(&self.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by SKU.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = ? AND tenant_id = ?"
        ))
        .bind(sku)
        .bind(&self.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by barcode.
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE barcode = ? AND tenant_id = ?"
        ))
        .bind(barcode)
        .bind(&self.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists the tenant's products by name.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE tenant_id = ? ORDER BY name LIMIT ?"
        ))
        .bind(&self.tenant_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Searches products by name, sku or barcode prefix.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();
        if query.is_empty() {
            return self.list(limit).await;
        }

        debug!(query = %query, "Searching products");

        let pattern = format!("{query}%");
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE tenant_id = ? AND (name LIKE ? OR sku LIKE ? OR barcode LIKE ?) \
             ORDER BY name LIMIT ?"
        ))
        .bind(&self.tenant_id)
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Updates an existing product's catalog fields.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        validate_product(product)?;

        debug!(id = %product.id, "Updating product");

        let result = sqlx::query(
            "UPDATE products SET store_id = ?, category_id = ?, name = ?, sku = ?, \
             barcode = ?, description = ?, price_cents = ?, cost_price_cents = ?, \
             quantity = ?, expiry_date = ?, is_damaged = ?, damaged_quantity = ?, \
             is_discounted = ?, discount_percent_bps = ?, surplus_quantity = ?, \
             supply_pcu = ?, validity_days = ?, max_redemptions = ?, updated_at = ? \
             WHERE id = ? AND tenant_id = ?",
        )
        .bind(&product.store_id)
        .bind(&product.category_id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.barcode)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.cost_price_cents)
        .bind(product.quantity)
        .bind(product.expiry_date)
        .bind(product.is_damaged)
        .bind(product.damaged_quantity)
        .bind(product.is_discounted)
        .bind(product.discount_percent_bps)
        .bind(product.surplus_quantity)
        .bind(product.supply_pcu)
        .bind(product.validity_days)
        .bind(product.max_redemptions)
        .bind(product.updated_at)
        .bind(&product.id)
        .bind(&self.tenant_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Gets the virtual detail record for a product, if any.
    pub async fn virtual_detail(&self, product_id: &str) -> DbResult<Option<VirtualProduct>> {
        let detail = sqlx::query_as::<_, VirtualProduct>(
            "SELECT v.id, v.product_id, v.kind, v.provider_name, v.denomination_cents, \
             v.validity_period_days, v.terms_and_conditions \
             FROM virtual_products v \
             JOIN products p ON p.id = v.product_id \
             WHERE v.product_id = ? AND p.tenant_id = ?",
        )
        .bind(product_id)
        .bind(&self.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(detail)
    }

    /// Deletes a product and, through CASCADE, its virtual detail and
    /// inventory rows. Historical order items keep existing with the
    /// product reference nulled.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ? AND tenant_id = ?")
            .bind(id)
            .bind(&self.tenant_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }
}

// =============================================================================
// Services
// =============================================================================

const SERVICE_COLUMNS: &str =
    "id, tenant_id, category_id, name, price_cents, description, duration_minutes, created_at";

/// Repository for a tenant's services.
#[derive(Debug, Clone)]
pub struct ServiceRepository {
    pool: SqlitePool,
    tenant_id: String,
}

impl ServiceRepository {
    pub fn new(pool: SqlitePool, tenant_id: String) -> Self {
        ServiceRepository { pool, tenant_id }
    }

    /// Inserts a new service.
    pub async fn create(&self, service: &Service) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO services (id, tenant_id, category_id, name, price_cents, \
             description, duration_minutes, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&service.id)
        .bind(&self.tenant_id)
        .bind(&service.category_id)
        .bind(&service.name)
        .bind(service.price_cents)
        .bind(&service.description)
        .bind(service.duration_minutes)
        .bind(service.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a service by id, within this tenant only.
    pub async fn get(&self, id: &str) -> DbResult<Option<Service>> {
        let service = sqlx::query_as::<_, Service>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE id = ? AND tenant_id = ?"
        ))
        .bind(id)
        .bind(&self.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(service)
    }

    /// Lists the tenant's services by name.
    pub async fn list(&self) -> DbResult<Vec<Service>> {
        let services = sqlx::query_as::<_, Service>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE tenant_id = ? ORDER BY name"
        ))
        .bind(&self.tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(services)
    }

    /// Updates a service.
    pub async fn update(&self, service: &Service) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE services SET category_id = ?, name = ?, price_cents = ?, \
             description = ?, duration_minutes = ? WHERE id = ? AND tenant_id = ?",
        )
        .bind(&service.category_id)
        .bind(&service.name)
        .bind(service.price_cents)
        .bind(&service.description)
        .bind(service.duration_minutes)
        .bind(&service.id)
        .bind(&self.tenant_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Service", &service.id));
        }

        Ok(())
    }

    /// Deletes a service. Historical order items keep existing with the
    /// service reference nulled.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM services WHERE id = ? AND tenant_id = ?")
            .bind(id)
            .bind(&self.tenant_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Service", id));
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
    use webpos_core::{new_id, Store, Tenant, ValidationError, VirtualKind};

    async fn tenant_ctx(db: &Database) -> TenantContext {
        let now = Utc::now();
        let tenant = Tenant {
            id: new_id(),
            name: "Shop".to_string(),
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

    async fn store_in(ctx: &TenantContext) -> Store {
        let store = Store {
            id: new_id(),
            tenant_id: String::new(),
            name: "Main".to_string(),
            location: "High Street".to_string(),
            created_at: Utc::now(),
        };
        ctx.stores().create(&store).await.unwrap();
        store
    }

    fn sample_product(store_id: &str, sku: &str, barcode: &str) -> Product {
        let mut p = Product::sample();
        p.id = new_id();
        p.store_id = store_id.to_string();
        p.sku = sku.to_string();
        p.barcode = barcode.to_string();
        p.name = format!("Product {sku}");
        p.price_cents = 1099;
        p.cost_price_cents = 750;
        p
    }

    #[tokio::test]
    async fn product_lookup_by_sku_and_barcode() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = tenant_ctx(&db).await;
        let store = store_in(&ctx).await;

        let product = sample_product(&store.id, "COKE-330", "5449000000996");
        ctx.products().create(&product).await.unwrap();

        let by_sku = ctx.products().get_by_sku("COKE-330").await.unwrap().unwrap();
        assert_eq!(by_sku.id, product.id);

        let by_barcode = ctx
            .products()
            .get_by_barcode("5449000000996")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_barcode.id, product.id);

        assert!(ctx.products().get_by_sku("PEPSI-330").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sku_is_unique_across_tenants() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx_a = tenant_ctx(&db).await;
        let ctx_b = tenant_ctx(&db).await;
        let store_a = store_in(&ctx_a).await;
        let store_b = store_in(&ctx_b).await;

        ctx_a
            .products()
            .create(&sample_product(&store_a.id, "COKE-330", "5449000000996"))
            .await
            .unwrap();

        // Same sku under another tenant still violates the global constraint.
        let err = ctx_b
            .products()
            .create(&sample_product(&store_b.id, "COKE-330", "5449000000997"))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn discount_fields_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = tenant_ctx(&db).await;
        let store = store_in(&ctx).await;

        let mut product = sample_product(&store.id, "TEA-001", "6001000000001");
        product.price_cents = 10000;
        product.is_discounted = true;
        product.discount_percent_bps = 1500; // 15%
        ctx.products().create(&product).await.unwrap();

        let fetched = ctx.products().get(&product.id).await.unwrap().unwrap();
        assert!(fetched.is_discounted);
        assert_eq!(fetched.discount_percent_bps, 1500);
        assert_eq!(fetched.discounted_price().cents(), 8500);
    }

    #[tokio::test]
    async fn virtual_detail_is_one_to_one() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = tenant_ctx(&db).await;
        let store = store_in(&ctx).await;

        let mut product = sample_product(&store.id, "AIR-010", "7001000000010");
        product.is_virtual = true;
        let detail = VirtualProduct {
            id: new_id(),
            product_id: product.id.clone(),
            kind: VirtualKind::Airtime,
            provider_name: "TelecomX".to_string(),
            denomination_cents: Some(1000),
            validity_period_days: Some(30),
            terms_and_conditions: String::new(),
        };
        ctx.products().create_virtual(&product, &detail).await.unwrap();

        let fetched = ctx
            .products()
            .virtual_detail(&product.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.kind, VirtualKind::Airtime);

        // A second detail row for the same product is rejected.
        let second = VirtualProduct {
            id: new_id(),
            ..detail
        };
        let err = sqlx::query(
            "INSERT INTO virtual_products (id, product_id, kind, provider_name, \
             denomination_cents, validity_period_days, terms_and_conditions) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&second.id)
        .bind(&second.product_id)
        .bind(second.kind)
        .bind(&second.provider_name)
        .bind(second.denomination_cents)
        .bind(second.validity_period_days)
        .bind(&second.terms_and_conditions)
        .execute(db.pool())
        .await
        .map_err(DbError::from)
        .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn malformed_product_never_reaches_the_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = tenant_ctx(&db).await;
        let store = store_in(&ctx).await;

        let mut product = sample_product(&store.id, "", "not-digits!!");
        product.price_cents = -500;
        let err = ctx.products().create(&product).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Validation(ValidationError::Required { .. })
        ));
        assert!(ctx.products().list(10).await.unwrap().is_empty());

        // Each field check bites on its own.
        let mut bad_barcode = sample_product(&store.id, "OK-001", "59012-ABC");
        assert!(ctx.products().create(&bad_barcode).await.is_err());
        bad_barcode.barcode = "5901234123457".to_string();
        bad_barcode.price_cents = -1;
        assert!(ctx.products().create(&bad_barcode).await.is_err());

        // Updates run the same checks.
        let good = sample_product(&store.id, "OK-002", "5901234123458");
        ctx.products().create(&good).await.unwrap();
        let mut renamed = good.clone();
        renamed.name = String::new();
        assert!(matches!(
            ctx.products().update(&renamed).await.unwrap_err(),
            DbError::Validation(_)
        ));
        let fetched = ctx.products().get(&good.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, good.name);
    }

    #[tokio::test]
    async fn search_matches_name_prefix() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = tenant_ctx(&db).await;
        let store = store_in(&ctx).await;

        for (sku, barcode, name) in [
            ("COKE-330", "5449000000996", "Coca-Cola 330ml"),
            ("COKE-500", "5449000000997", "Coca-Cola 500ml"),
            ("PEPSI-330", "5449000000998", "Pepsi 330ml"),
        ] {
            let mut p = sample_product(&store.id, sku, barcode);
            p.name = name.to_string();
            ctx.products().create(&p).await.unwrap();
        }

        let hits = ctx.products().search("Coca", 10).await.unwrap();
        assert_eq!(hits.len(), 2);

        let hits = ctx.products().search("PEPSI", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
    }
}

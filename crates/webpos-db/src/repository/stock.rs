//! # Stock Repositories
//!
//! Procurement records and per-store inventory with its movement ledger.
//!
//! ## Movement Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Inventory.quantity is never written absolutely.                    │
//! │                                                                     │
//! │  record_movement(inv, Restock, +24)                                 │
//! │       │                                                             │
//! │       ├── UPDATE inventories SET quantity = quantity + 24           │
//! │       └── INSERT INTO inventory_transactions (..., +24)             │
//! │                                                                     │
//! │  Both statements run in ONE transaction: the ledger and the level   │
//! │  can never disagree, and two terminals adjusting concurrently       │
//! │  both land (relative update, no lost write).                        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use webpos_core::{new_id, Inventory, InventoryTransaction, Purchase, StockMovement, SurplusSupply};

// =============================================================================
// Purchases
// =============================================================================

const PURCHASE_COLUMNS: &str =
    "id, tenant_id, vendor_id, product_id, quantity, total_cost_cents, purchased_at";

/// Repository for a tenant's procurement records.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
    tenant_id: String,
}

impl PurchaseRepository {
    pub fn new(pool: SqlitePool, tenant_id: String) -> Self {
        PurchaseRepository { pool, tenant_id }
    }

    /// Records a purchase. Immutable once written.
    pub async fn create(&self, purchase: &Purchase) -> DbResult<()> {
        debug!(id = %purchase.id, vendor = %purchase.vendor_id, "Recording purchase");

        sqlx::query(
            "INSERT INTO purchases (id, tenant_id, vendor_id, product_id, quantity, \
             total_cost_cents, purchased_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&purchase.id)
        .bind(&self.tenant_id)
        .bind(&purchase.vendor_id)
        .bind(&purchase.product_id)
        .bind(purchase.quantity)
        .bind(purchase.total_cost_cents)
        .bind(purchase.purchased_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a purchase by id, within this tenant only.
    pub async fn get(&self, id: &str) -> DbResult<Option<Purchase>> {
        let purchase = sqlx::query_as::<_, Purchase>(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases WHERE id = ? AND tenant_id = ?"
        ))
        .bind(id)
        .bind(&self.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(purchase)
    }

    /// Lists purchases from one vendor, newest first.
    pub async fn list_for_vendor(&self, vendor_id: &str) -> DbResult<Vec<Purchase>> {
        let purchases = sqlx::query_as::<_, Purchase>(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases \
             WHERE vendor_id = ? AND tenant_id = ? ORDER BY purchased_at DESC"
        ))
        .bind(vendor_id)
        .bind(&self.tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(purchases)
    }

    /// Lists the tenant's purchases, newest first.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Purchase>> {
        let purchases = sqlx::query_as::<_, Purchase>(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases \
             WHERE tenant_id = ? ORDER BY purchased_at DESC LIMIT ?"
        ))
        .bind(&self.tenant_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(purchases)
    }
}

// =============================================================================
// Inventories
// =============================================================================

const INVENTORY_COLUMNS: &str = "id, tenant_id, product_id, store_id, quantity, \
     minimum_stock_level, created_by, updated_by, created_at, updated_at";

const TRANSACTION_COLUMNS: &str =
    "id, tenant_id, inventory_id, movement, quantity, notes, created_by, timestamp";

/// Repository for a tenant's inventory rows and their movement ledger.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
    tenant_id: String,
}

impl InventoryRepository {
    pub fn new(pool: SqlitePool, tenant_id: String) -> Self {
        InventoryRepository { pool, tenant_id }
    }

    /// Creates an inventory row for a (product, store) pair.
    ///
    /// At most one row may exist per (tenant, product, store) triple;
    /// a second attempt fails with [`DbError::UniqueViolation`].
    pub async fn create(&self, inventory: &Inventory) -> DbResult<()> {
        debug!(
            product = %inventory.product_id,
            store = %inventory.store_id,
            "Creating inventory row"
        );

        sqlx::query(
            "INSERT INTO inventories (id, tenant_id, product_id, store_id, quantity, \
             minimum_stock_level, created_by, updated_by, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&inventory.id)
        .bind(&self.tenant_id)
        .bind(&inventory.product_id)
        .bind(&inventory.store_id)
        .bind(inventory.quantity)
        .bind(inventory.minimum_stock_level)
        .bind(&inventory.created_by)
        .bind(&inventory.updated_by)
        .bind(inventory.created_at)
        .bind(inventory.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an inventory row by id, within this tenant only.
    pub async fn get(&self, id: &str) -> DbResult<Option<Inventory>> {
        let inventory = sqlx::query_as::<_, Inventory>(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM inventories WHERE id = ? AND tenant_id = ?"
        ))
        .bind(id)
        .bind(&self.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(inventory)
    }

    /// Finds the inventory row for a (product, store) pair.
    pub async fn find(&self, product_id: &str, store_id: &str) -> DbResult<Option<Inventory>> {
        let inventory = sqlx::query_as::<_, Inventory>(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM inventories \
             WHERE product_id = ? AND store_id = ? AND tenant_id = ?"
        ))
        .bind(product_id)
        .bind(store_id)
        .bind(&self.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(inventory)
    }

    /// Lists the tenant's inventory rows.
    pub async fn list(&self) -> DbResult<Vec<Inventory>> {
        let inventories = sqlx::query_as::<_, Inventory>(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM inventories \
             WHERE tenant_id = ? ORDER BY created_at"
        ))
        .bind(&self.tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(inventories)
    }

    /// Lists rows whose level has fallen below the reorder threshold.
    pub async fn list_below_minimum(&self) -> DbResult<Vec<Inventory>> {
        let inventories = sqlx::query_as::<_, Inventory>(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM inventories \
             WHERE tenant_id = ? AND quantity < minimum_stock_level ORDER BY quantity"
        ))
        .bind(&self.tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(inventories)
    }

    /// Applies a stock movement: adjusts the level by a signed delta and
    /// appends a ledger entry, atomically.
    ///
    /// Returns the quantity after the movement.
    ///
    /// ## Arguments
    /// * `inventory_id` - Row to adjust
    /// * `movement` - Movement type (restock, sale, ...)
    /// * `delta` - Signed change (negative for sales, positive for restock)
    /// * `notes` - Optional free-form note
    /// * `created_by` - Acting user, if attributable
    pub async fn record_movement(
        &self,
        inventory_id: &str,
        movement: StockMovement,
        delta: i64,
        notes: Option<&str>,
        created_by: Option<&str>,
    ) -> DbResult<i64> {
        debug!(inventory = %inventory_id, %movement, delta, "Recording stock movement");

        let now = Utc::now();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        // Relative update: concurrent movements both land, no lost write.
        let result = sqlx::query(
            "UPDATE inventories SET quantity = quantity + ?, updated_by = ?, updated_at = ? \
             WHERE id = ? AND tenant_id = ?",
        )
        .bind(delta)
        .bind(created_by)
        .bind(now)
        .bind(inventory_id)
        .bind(&self.tenant_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Inventory", inventory_id));
        }

        sqlx::query(
            "INSERT INTO inventory_transactions (id, tenant_id, inventory_id, movement, \
             quantity, notes, created_by, timestamp) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(new_id())
        .bind(&self.tenant_id)
        .bind(inventory_id)
        .bind(movement)
        .bind(delta)
        .bind(notes)
        .bind(created_by)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let quantity: i64 =
            sqlx::query_scalar("SELECT quantity FROM inventories WHERE id = ?")
                .bind(inventory_id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(quantity)
    }

    /// Lists the movement ledger for one inventory row, oldest first.
    pub async fn transactions(&self, inventory_id: &str) -> DbResult<Vec<InventoryTransaction>> {
        let entries = sqlx::query_as::<_, InventoryTransaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM inventory_transactions \
             WHERE inventory_id = ? AND tenant_id = ? ORDER BY timestamp"
        ))
        .bind(inventory_id)
        .bind(&self.tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Records excess stock for a product at a store.
    pub async fn record_surplus(&self, surplus: &SurplusSupply) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO surplus_supplies (id, tenant_id, product_id, store_id, quantity, \
             notes, recorded_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&surplus.id)
        .bind(&self.tenant_id)
        .bind(&surplus.product_id)
        .bind(&surplus.store_id)
        .bind(surplus.quantity)
        .bind(&surplus.notes)
        .bind(surplus.recorded_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists surplus records, newest first.
    pub async fn list_surplus(&self) -> DbResult<Vec<SurplusSupply>> {
        let records = sqlx::query_as::<_, SurplusSupply>(
            "SELECT id, tenant_id, product_id, store_id, quantity, notes, recorded_at \
             FROM surplus_supplies WHERE tenant_id = ? ORDER BY recorded_at DESC",
        )
        .bind(&self.tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig, TenantContext};
    use webpos_core::{Product, Store, Tenant, DEFAULT_MINIMUM_STOCK_LEVEL};

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

    async fn product_in_store(ctx: &TenantContext, sku: &str, barcode: &str) -> (Product, Store) {
        let store = Store {
            id: new_id(),
            tenant_id: String::new(),
            name: "Main".to_string(),
            location: "High Street".to_string(),
            created_at: Utc::now(),
        };
        ctx.stores().create(&store).await.unwrap();

        let mut product = Product::sample();
        product.id = new_id();
        product.store_id = store.id.clone();
        product.sku = sku.to_string();
        product.barcode = barcode.to_string();
        ctx.products().create(&product).await.unwrap();

        (product, store)
    }

    fn inventory_row(product_id: &str, store_id: &str, quantity: i64) -> Inventory {
        let now = Utc::now();
        Inventory {
            id: new_id(),
            tenant_id: String::new(),
            product_id: product_id.to_string(),
            store_id: store_id.to_string(),
            quantity,
            minimum_stock_level: DEFAULT_MINIMUM_STOCK_LEVEL,
            created_by: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn duplicate_triple_is_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = tenant_ctx(&db).await;
        let (product, store) = product_in_store(&ctx, "SKU-1", "1000000000001").await;

        ctx.inventories()
            .create(&inventory_row(&product.id, &store.id, 10))
            .await
            .unwrap();

        // Same product, same store, same tenant: violates the composite key.
        let err = ctx
            .inventories()
            .create(&inventory_row(&product.id, &store.id, 99))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());

        // The original row is untouched.
        let row = ctx
            .inventories()
            .find(&product.id, &store.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.quantity, 10);
    }

    #[tokio::test]
    async fn movement_adjusts_level_and_appends_ledger() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = tenant_ctx(&db).await;
        let (product, store) = product_in_store(&ctx, "SKU-1", "1000000000001").await;

        let row = inventory_row(&product.id, &store.id, 10);
        ctx.inventories().create(&row).await.unwrap();

        let after = ctx
            .inventories()
            .record_movement(&row.id, StockMovement::Restock, 24, Some("weekly"), None)
            .await
            .unwrap();
        assert_eq!(after, 34);

        let after = ctx
            .inventories()
            .record_movement(&row.id, StockMovement::Sale, -3, None, None)
            .await
            .unwrap();
        assert_eq!(after, 31);

        let ledger = ctx.inventories().transactions(&row.id).await.unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[0].movement, StockMovement::Restock);
        assert_eq!(ledger[0].quantity, 24);
        assert_eq!(ledger[1].movement, StockMovement::Sale);
        assert_eq!(ledger[1].quantity, -3);

        // The level is the fold of the ledger over the opening quantity.
        let total: i64 = ledger.iter().map(|t| t.quantity).sum();
        assert_eq!(10 + total, 31);
    }

    #[tokio::test]
    async fn concurrent_movements_lose_no_updates() {
        // A multi-connection pool, so the two movements really interleave
        // instead of queueing on a single connection.
        let db = Database::new(DbConfig::shared_in_memory()).await.unwrap();
        let ctx = tenant_ctx(&db).await;
        let (product, store) = product_in_store(&ctx, "SKU-1", "1000000000001").await;

        let row = inventory_row(&product.id, &store.id, 10);
        ctx.inventories().create(&row).await.unwrap();

        let repo_a = ctx.inventories();
        let repo_b = ctx.inventories();
        let (a, b) = tokio::join!(
            repo_a.record_movement(&row.id, StockMovement::Restock, 24, None, None),
            repo_b.record_movement(&row.id, StockMovement::Sale, -3, None, None),
        );
        a.unwrap();
        b.unwrap();

        // Both deltas landed: the relative UPDATE cannot lose a write.
        let fetched = ctx.inventories().get(&row.id).await.unwrap().unwrap();
        assert_eq!(fetched.quantity, 31);

        let ledger = ctx.inventories().transactions(&row.id).await.unwrap();
        assert_eq!(ledger.len(), 2);
        let total: i64 = ledger.iter().map(|t| t.quantity).sum();
        assert_eq!(10 + total, 31);
    }

    #[tokio::test]
    async fn movement_on_missing_row_is_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = tenant_ctx(&db).await;

        let err = ctx
            .inventories()
            .record_movement("no-such-row", StockMovement::Adjustment, 1, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn below_minimum_listing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = tenant_ctx(&db).await;
        let (product, store) = product_in_store(&ctx, "SKU-1", "1000000000001").await;

        let row = inventory_row(&product.id, &store.id, 10);
        ctx.inventories().create(&row).await.unwrap();
        assert!(ctx.inventories().list_below_minimum().await.unwrap().is_empty());

        ctx.inventories()
            .record_movement(&row.id, StockMovement::Sale, -7, None, None)
            .await
            .unwrap();

        let low = ctx.inventories().list_below_minimum().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].quantity, 3);
        assert!(low[0].is_below_minimum());
    }

    #[tokio::test]
    async fn inventories_are_invisible_across_tenants() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx_a = tenant_ctx(&db).await;
        let ctx_b = tenant_ctx(&db).await;
        let (product, store) = product_in_store(&ctx_a, "SKU-1", "1000000000001").await;

        let row = inventory_row(&product.id, &store.id, 10);
        ctx_a.inventories().create(&row).await.unwrap();

        assert!(ctx_b.inventories().get(&row.id).await.unwrap().is_none());
        assert!(ctx_b
            .inventories()
            .find(&product.id, &store.id)
            .await
            .unwrap()
            .is_none());
        assert!(matches!(
            ctx_b
                .inventories()
                .record_movement(&row.id, StockMovement::Adjustment, 5, None, None)
                .await
                .unwrap_err(),
            DbError::NotFound { .. }
        ));

        // Tenant A's level is untouched by tenant B's attempt.
        let fetched = ctx_a.inventories().get(&row.id).await.unwrap().unwrap();
        assert_eq!(fetched.quantity, 10);
    }
}

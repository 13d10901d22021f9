//! # Sale Repositories
//!
//! Sales with their order items, plus payments, refunds and deliveries.
//!
//! ## Finalization
//! A sale and its lines are written in one transaction: either the whole
//! checkout lands or none of it does. Every line is validated against the
//! exactly-one-of-product-or-service rule before any row is written.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use webpos_core::{Delivery, OrderItem, Payment, Refund, Sale};

// =============================================================================
// Sales
// =============================================================================

const SALE_COLUMNS: &str =
    "id, tenant_id, store_id, user_id, customer_id, total_amount_cents, date";

/// Repository for a tenant's sales and their order items.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
    tenant_id: String,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool, tenant_id: String) -> Self {
        SaleRepository { pool, tenant_id }
    }

    /// Writes a sale and its order items atomically.
    ///
    /// Every item is checked against the exclusivity rule first; a single
    /// bad line fails the whole call with [`DbError::Validation`] and
    /// nothing is written.
    pub async fn create_with_items(&self, sale: &Sale, items: &[OrderItem]) -> DbResult<()> {
        // Validate before touching the database.
        for item in items {
            item.validate()?;
        }

        debug!(id = %sale.id, items = items.len(), "Finalizing sale");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query(
            "INSERT INTO sales (id, tenant_id, store_id, user_id, customer_id, \
             total_amount_cents, date) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&sale.id)
        .bind(&self.tenant_id)
        .bind(&sale.store_id)
        .bind(&sale.user_id)
        .bind(&sale.customer_id)
        .bind(sale.total_amount_cents)
        .bind(sale.date)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                "INSERT INTO order_items (id, sale_id, product_id, service_id, quantity, \
                 price_cents) VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&item.id)
            .bind(&sale.id)
            .bind(&item.product_id)
            .bind(&item.service_id)
            .bind(item.quantity)
            .bind(item.price_cents)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Gets a sale by id, within this tenant only.
    pub async fn get(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ? AND tenant_id = ?"
        ))
        .bind(id)
        .bind(&self.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Lists the tenant's sales, newest first.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE tenant_id = ? ORDER BY date DESC LIMIT ?"
        ))
        .bind(&self.tenant_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Lists sales at one store, newest first.
    pub async fn list_for_store(&self, store_id: &str, limit: u32) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales \
             WHERE store_id = ? AND tenant_id = ? ORDER BY date DESC LIMIT ?"
        ))
        .bind(store_id)
        .bind(&self.tenant_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Lists the order items of one sale.
    pub async fn items(&self, sale_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT i.id, i.sale_id, i.product_id, i.service_id, i.quantity, i.price_cents \
             FROM order_items i \
             JOIN sales s ON s.id = i.sale_id \
             WHERE i.sale_id = ? AND s.tenant_id = ?",
        )
        .bind(sale_id)
        .bind(&self.tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}

// =============================================================================
// Payments
// =============================================================================

const PAYMENT_COLUMNS: &str = "id, tenant_id, sale_id, method, amount_cents, reference, \
     created_by, updated_by, created_at, updated_at";

/// Repository for payments applied to sales.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
    tenant_id: String,
}

impl PaymentRepository {
    pub fn new(pool: SqlitePool, tenant_id: String) -> Self {
        PaymentRepository { pool, tenant_id }
    }

    /// Records a payment against a sale. Split tender is several calls.
    pub async fn create(&self, payment: &Payment) -> DbResult<()> {
        debug!(sale = %payment.sale_id, method = %payment.method, "Recording payment");

        sqlx::query(
            "INSERT INTO payments (id, tenant_id, sale_id, method, amount_cents, reference, \
             created_by, updated_by, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&payment.id)
        .bind(&self.tenant_id)
        .bind(&payment.sale_id)
        .bind(payment.method)
        .bind(payment.amount_cents)
        .bind(&payment.reference)
        .bind(&payment.created_by)
        .bind(&payment.updated_by)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists the payments applied to one sale, oldest first.
    pub async fn list_for_sale(&self, sale_id: &str) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments \
             WHERE sale_id = ? AND tenant_id = ? ORDER BY created_at"
        ))
        .bind(sale_id)
        .bind(&self.tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Sum of payments against one sale, in cents.
    pub async fn total_for_sale(&self, sale_id: &str) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM payments \
             WHERE sale_id = ? AND tenant_id = ?",
        )
        .bind(sale_id)
        .bind(&self.tenant_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}

// =============================================================================
// Refunds
// =============================================================================

/// Repository for refunds.
#[derive(Debug, Clone)]
pub struct RefundRepository {
    pool: SqlitePool,
    tenant_id: String,
}

impl RefundRepository {
    pub fn new(pool: SqlitePool, tenant_id: String) -> Self {
        RefundRepository { pool, tenant_id }
    }

    /// Records a refund against a sale.
    pub async fn create(&self, refund: &Refund) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO refunds (id, tenant_id, sale_id, reason, amount_cents, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&refund.id)
        .bind(&self.tenant_id)
        .bind(&refund.sale_id)
        .bind(&refund.reason)
        .bind(refund.amount_cents)
        .bind(refund.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists the refunds against one sale, oldest first.
    pub async fn list_for_sale(&self, sale_id: &str) -> DbResult<Vec<Refund>> {
        let refunds = sqlx::query_as::<_, Refund>(
            "SELECT id, tenant_id, sale_id, reason, amount_cents, created_at \
             FROM refunds WHERE sale_id = ? AND tenant_id = ? ORDER BY created_at",
        )
        .bind(sale_id)
        .bind(&self.tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(refunds)
    }
}

// =============================================================================
// Deliveries
// =============================================================================

const DELIVERY_COLUMNS: &str = "id, tenant_id, sale_id, kind, delivered_by, delivery_date, \
     tracking_number, fee_cents";

/// Repository for delivery fulfillment records.
#[derive(Debug, Clone)]
pub struct DeliveryRepository {
    pool: SqlitePool,
    tenant_id: String,
}

impl DeliveryRepository {
    pub fn new(pool: SqlitePool, tenant_id: String) -> Self {
        DeliveryRepository { pool, tenant_id }
    }

    /// Records a delivery for a sale.
    pub async fn create(&self, delivery: &Delivery) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO deliveries (id, tenant_id, sale_id, kind, delivered_by, \
             delivery_date, tracking_number, fee_cents) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&delivery.id)
        .bind(&self.tenant_id)
        .bind(&delivery.sale_id)
        .bind(delivery.kind)
        .bind(&delivery.delivered_by)
        .bind(delivery.delivery_date)
        .bind(&delivery.tracking_number)
        .bind(delivery.fee_cents)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets the delivery for one sale, if any.
    pub async fn get_for_sale(&self, sale_id: &str) -> DbResult<Option<Delivery>> {
        let delivery = sqlx::query_as::<_, Delivery>(&format!(
            "SELECT {DELIVERY_COLUMNS} FROM deliveries WHERE sale_id = ? AND tenant_id = ?"
        ))
        .bind(sale_id)
        .bind(&self.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(delivery)
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
    use webpos_core::{
        new_id, Money, PaymentMethod, Product, Service, Store, Tenant, ValidationError,
    };

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

    struct Fixture {
        store: Store,
        product: Product,
        service: Service,
    }

    async fn fixture(ctx: &TenantContext) -> Fixture {
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
        product.sku = "COKE-330".to_string();
        product.barcode = "5449000000996".to_string();
        product.price_cents = 1099;
        ctx.products().create(&product).await.unwrap();

        let service = Service {
            id: new_id(),
            tenant_id: String::new(),
            category_id: None,
            name: "Phone Repair".to_string(),
            price_cents: 25000,
            description: String::new(),
            duration_minutes: 45,
            created_at: Utc::now(),
        };
        ctx.services().create(&service).await.unwrap();

        Fixture {
            store,
            product,
            service,
        }
    }

    fn sale_at(store_id: &str, total_cents: i64) -> Sale {
        Sale {
            id: new_id(),
            tenant_id: String::new(),
            store_id: store_id.to_string(),
            user_id: None,
            customer_id: None,
            total_amount_cents: total_cents,
            date: Utc::now(),
        }
    }

    #[tokio::test]
    async fn sale_with_mixed_lines_round_trips() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = tenant_ctx(&db).await;
        let fx = fixture(&ctx).await;

        let sale = sale_at(&fx.store.id, 2 * 1099 + 25000);
        let items = vec![
            OrderItem::for_product(
                new_id(),
                sale.id.clone(),
                fx.product.id.clone(),
                2,
                Money::from_cents(1099),
            ),
            OrderItem::for_service(
                new_id(),
                sale.id.clone(),
                fx.service.id.clone(),
                1,
                Money::from_cents(25000),
            ),
        ];
        ctx.sales().create_with_items(&sale, &items).await.unwrap();

        let fetched = ctx.sales().get(&sale.id).await.unwrap().unwrap();
        assert_eq!(fetched.total_amount_cents, 2 * 1099 + 25000);

        let lines = ctx.sales().items(&sale.id).await.unwrap();
        assert_eq!(lines.len(), 2);
        let line_sum: i64 = lines.iter().map(|l| l.line_total().cents()).sum();
        assert_eq!(line_sum, fetched.total_amount_cents);
    }

    #[tokio::test]
    async fn ambiguous_line_rejects_whole_sale() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = tenant_ctx(&db).await;
        let fx = fixture(&ctx).await;

        let sale = sale_at(&fx.store.id, 1099);
        let good = OrderItem::for_product(
            new_id(),
            sale.id.clone(),
            fx.product.id.clone(),
            1,
            Money::from_cents(1099),
        );
        // Both references set: violates exclusivity.
        let mut bad = good.clone();
        bad.id = new_id();
        bad.service_id = Some(fx.service.id.clone());

        let err = ctx
            .sales()
            .create_with_items(&sale, &[good, bad])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Validation(ValidationError::ExactlyOneOf { .. })
        ));

        // Nothing was written, not even the valid line or the sale header.
        assert!(ctx.sales().get(&sale.id).await.unwrap().is_none());
        assert!(ctx.sales().items(&sale.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn split_tender_totals() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = tenant_ctx(&db).await;
        let fx = fixture(&ctx).await;

        let sale = sale_at(&fx.store.id, 5000);
        ctx.sales().create_with_items(&sale, &[]).await.unwrap();

        let now = Utc::now();
        for (method, cents) in [(PaymentMethod::Cash, 2000), (PaymentMethod::Card, 3000)] {
            let payment = Payment {
                id: new_id(),
                tenant_id: String::new(),
                sale_id: sale.id.clone(),
                method,
                amount_cents: cents,
                reference: None,
                created_by: None,
                updated_by: None,
                created_at: now,
                updated_at: now,
            };
            ctx.payments().create(&payment).await.unwrap();
        }

        assert_eq!(ctx.payments().total_for_sale(&sale.id).await.unwrap(), 5000);
        assert_eq!(ctx.payments().list_for_sale(&sale.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn refund_and_delivery_attach_to_sale() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = tenant_ctx(&db).await;
        let fx = fixture(&ctx).await;

        let sale = sale_at(&fx.store.id, 1099);
        ctx.sales().create_with_items(&sale, &[]).await.unwrap();

        let refund = Refund {
            id: new_id(),
            tenant_id: String::new(),
            sale_id: sale.id.clone(),
            reason: "damaged on arrival".to_string(),
            amount_cents: 1099,
            created_at: Utc::now(),
        };
        ctx.refunds().create(&refund).await.unwrap();
        assert_eq!(ctx.refunds().list_for_sale(&sale.id).await.unwrap().len(), 1);

        let delivery = Delivery {
            id: new_id(),
            tenant_id: String::new(),
            sale_id: sale.id.clone(),
            kind: webpos_core::DeliveryKind::Local,
            delivered_by: None,
            delivery_date: None,
            tracking_number: Some("TRK-001".to_string()),
            fee_cents: 500,
        };
        ctx.deliveries().create(&delivery).await.unwrap();

        let fetched = ctx.deliveries().get_for_sale(&sale.id).await.unwrap().unwrap();
        assert_eq!(fetched.tracking_number.as_deref(), Some("TRK-001"));
    }

    #[tokio::test]
    async fn sales_are_invisible_across_tenants() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx_a = tenant_ctx(&db).await;
        let ctx_b = tenant_ctx(&db).await;
        let fx = fixture(&ctx_a).await;

        let sale = sale_at(&fx.store.id, 1099);
        ctx_a.sales().create_with_items(&sale, &[]).await.unwrap();

        assert!(ctx_b.sales().get(&sale.id).await.unwrap().is_none());
        assert!(ctx_b.sales().items(&sale.id).await.unwrap().is_empty());
        assert!(ctx_b.sales().list(10).await.unwrap().is_empty());
    }
}

//! # Ledger Repositories
//!
//! Tax definitions, the append-only journal and KPI snapshots.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use webpos_core::{JournalEntry, Kpi, Tax};

// =============================================================================
// Taxes
// =============================================================================

const TAX_COLUMNS: &str = "id, tenant_id, name, percentage_bps, description, is_active";

/// Repository for a tenant's tax rate definitions.
#[derive(Debug, Clone)]
pub struct TaxRepository {
    pool: SqlitePool,
    tenant_id: String,
}

impl TaxRepository {
    pub fn new(pool: SqlitePool, tenant_id: String) -> Self {
        TaxRepository { pool, tenant_id }
    }

    /// Inserts a new tax definition.
    pub async fn create(&self, tax: &Tax) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO taxes (id, tenant_id, name, percentage_bps, description, is_active) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&tax.id)
        .bind(&self.tenant_id)
        .bind(&tax.name)
        .bind(tax.percentage_bps)
        .bind(&tax.description)
        .bind(tax.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a tax by id, within this tenant only.
    pub async fn get(&self, id: &str) -> DbResult<Option<Tax>> {
        let tax = sqlx::query_as::<_, Tax>(&format!(
            "SELECT {TAX_COLUMNS} FROM taxes WHERE id = ? AND tenant_id = ?"
        ))
        .bind(id)
        .bind(&self.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tax)
    }

    /// Lists the tenant's active tax definitions.
    pub async fn list_active(&self) -> DbResult<Vec<Tax>> {
        let taxes = sqlx::query_as::<_, Tax>(&format!(
            "SELECT {TAX_COLUMNS} FROM taxes \
             WHERE tenant_id = ? AND is_active = 1 ORDER BY name"
        ))
        .bind(&self.tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(taxes)
    }

    /// Updates a tax definition.
    pub async fn update(&self, tax: &Tax) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE taxes SET name = ?, percentage_bps = ?, description = ?, is_active = ? \
             WHERE id = ? AND tenant_id = ?",
        )
        .bind(&tax.name)
        .bind(tax.percentage_bps)
        .bind(&tax.description)
        .bind(tax.is_active)
        .bind(&tax.id)
        .bind(&self.tenant_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Tax", &tax.id));
        }

        Ok(())
    }
}

// =============================================================================
// Journal
// =============================================================================

const JOURNAL_COLUMNS: &str = "id, tenant_id, description, amount_cents, entry_date";

/// Repository for the tenant's accounting journal. Append-only: entries
/// are never updated or deleted through this layer.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    pool: SqlitePool,
    tenant_id: String,
}

impl JournalRepository {
    pub fn new(pool: SqlitePool, tenant_id: String) -> Self {
        JournalRepository { pool, tenant_id }
    }

    /// Appends a journal entry.
    pub async fn append(&self, entry: &JournalEntry) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO journal_entries (id, tenant_id, description, amount_cents, \
             entry_date) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&entry.id)
        .bind(&self.tenant_id)
        .bind(&entry.description)
        .bind(entry.amount_cents)
        .bind(entry.entry_date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists entries dated inside the inclusive range.
    pub async fn list_between(&self, from: NaiveDate, to: NaiveDate) -> DbResult<Vec<JournalEntry>> {
        let entries = sqlx::query_as::<_, JournalEntry>(&format!(
            "SELECT {JOURNAL_COLUMNS} FROM journal_entries \
             WHERE tenant_id = ? AND entry_date >= ? AND entry_date <= ? \
             ORDER BY entry_date"
        ))
        .bind(&self.tenant_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Net amount over the inclusive date range, in cents.
    pub async fn net_between(&self, from: NaiveDate, to: NaiveDate) -> DbResult<i64> {
        let net: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM journal_entries \
             WHERE tenant_id = ? AND entry_date >= ? AND entry_date <= ?",
        )
        .bind(&self.tenant_id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(net)
    }
}

// =============================================================================
// KPIs
// =============================================================================

const KPI_COLUMNS: &str = "id, tenant_id, name, value_cents, calculated_at";

/// Repository for KPI snapshots written by the periodic calculation job.
#[derive(Debug, Clone)]
pub struct KpiRepository {
    pool: SqlitePool,
    tenant_id: String,
}

impl KpiRepository {
    pub fn new(pool: SqlitePool, tenant_id: String) -> Self {
        KpiRepository { pool, tenant_id }
    }

    /// Records a KPI snapshot.
    pub async fn record(&self, kpi: &Kpi) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO kpis (id, tenant_id, name, value_cents, calculated_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&kpi.id)
        .bind(&self.tenant_id)
        .bind(&kpi.name)
        .bind(kpi.value_cents)
        .bind(kpi.calculated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// The most recent snapshot for a metric name, if any.
    pub async fn latest(&self, name: &str) -> DbResult<Option<Kpi>> {
        let kpi = sqlx::query_as::<_, Kpi>(&format!(
            "SELECT {KPI_COLUMNS} FROM kpis WHERE name = ? AND tenant_id = ? \
             ORDER BY calculated_at DESC LIMIT 1"
        ))
        .bind(name)
        .bind(&self.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(kpi)
    }

    /// Snapshot history for a metric name, newest first.
    pub async fn history(&self, name: &str, limit: u32) -> DbResult<Vec<Kpi>> {
        let kpis = sqlx::query_as::<_, Kpi>(&format!(
            "SELECT {KPI_COLUMNS} FROM kpis WHERE name = ? AND tenant_id = ? \
             ORDER BY calculated_at DESC LIMIT ?"
        ))
        .bind(name)
        .bind(&self.tenant_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(kpis)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig, TenantContext};
    use chrono::{Duration, Utc};
    use webpos_core::{new_id, Money, Tenant};

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

    #[tokio::test]
    async fn tax_round_trip_preserves_basis_points() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = tenant_ctx(&db).await;

        let vat = Tax {
            id: new_id(),
            tenant_id: String::new(),
            name: "VAT".to_string(),
            percentage_bps: 825,
            description: String::new(),
            is_active: true,
        };
        ctx.taxes().create(&vat).await.unwrap();

        let fetched = ctx.taxes().get(&vat.id).await.unwrap().unwrap();
        assert_eq!(fetched.percentage_bps, 825);
        assert_eq!(fetched.amount_on(Money::from_cents(1000)).cents(), 83);

        let mut paused = fetched;
        paused.is_active = false;
        ctx.taxes().update(&paused).await.unwrap();
        assert!(ctx.taxes().list_active().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn journal_range_and_net() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = tenant_ctx(&db).await;

        for (cents, day) in [(5000_i64, 1), (-2000, 15), (1000, 28)] {
            let entry = JournalEntry {
                id: new_id(),
                tenant_id: String::new(),
                description: "entry".to_string(),
                amount_cents: cents,
                entry_date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            };
            ctx.journal().append(&entry).await.unwrap();
        }

        let from = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        assert_eq!(ctx.journal().list_between(from, to).await.unwrap().len(), 3);
        assert_eq!(ctx.journal().net_between(from, to).await.unwrap(), 4000);

        let mid = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        assert_eq!(ctx.journal().net_between(from, mid).await.unwrap(), 5000);
    }

    #[tokio::test]
    async fn kpi_latest_picks_newest_snapshot() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = tenant_ctx(&db).await;

        let now = Utc::now();
        for (value, age_days) in [(100_000_i64, 2), (120_000, 1), (130_000, 0)] {
            let kpi = Kpi {
                id: new_id(),
                tenant_id: String::new(),
                name: "daily_revenue".to_string(),
                value_cents: value,
                calculated_at: now - Duration::days(age_days),
            };
            ctx.kpis().record(&kpi).await.unwrap();
        }

        let latest = ctx.kpis().latest("daily_revenue").await.unwrap().unwrap();
        assert_eq!(latest.value_cents, 130_000);

        assert_eq!(ctx.kpis().history("daily_revenue", 2).await.unwrap().len(), 2);
        assert!(ctx.kpis().latest("unknown_metric").await.unwrap().is_none());
    }
}

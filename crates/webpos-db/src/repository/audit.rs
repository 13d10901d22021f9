//! # Action Log Repository
//!
//! The append-only audit trail. Entries are written and queried; this
//! layer offers no update or delete for them.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use webpos_core::{ActionKind, ActionLog};

const LOG_COLUMNS: &str =
    "id, tenant_id, user_id, model_name, object_id, action, timestamp, ip_address, details";

/// Repository for a tenant's audit trail.
#[derive(Debug, Clone)]
pub struct ActionLogRepository {
    pool: SqlitePool,
    tenant_id: String,
}

impl ActionLogRepository {
    pub fn new(pool: SqlitePool, tenant_id: String) -> Self {
        ActionLogRepository { pool, tenant_id }
    }

    /// Appends an audit entry.
    pub async fn record(&self, entry: &ActionLog) -> DbResult<()> {
        debug!(
            model = %entry.model_name,
            object = %entry.object_id,
            action = %entry.action,
            "Recording action"
        );

        sqlx::query(
            "INSERT INTO action_logs (id, tenant_id, user_id, model_name, object_id, \
             action, timestamp, ip_address, details) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&entry.id)
        .bind(&self.tenant_id)
        .bind(&entry.user_id)
        .bind(&entry.model_name)
        .bind(&entry.object_id)
        .bind(entry.action)
        .bind(entry.timestamp)
        .bind(&entry.ip_address)
        .bind(&entry.details)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Appends an entry with a structured JSON payload in `details`.
    pub async fn record_json(
        &self,
        mut entry: ActionLog,
        details: &serde_json::Value,
    ) -> DbResult<()> {
        entry.details = Some(details.to_string());
        self.record(&entry).await
    }

    /// Lists the newest entries, most recent first.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<ActionLog>> {
        let entries = sqlx::query_as::<_, ActionLog>(&format!(
            "SELECT {LOG_COLUMNS} FROM action_logs \
             WHERE tenant_id = ? ORDER BY timestamp DESC LIMIT ?"
        ))
        .bind(&self.tenant_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Lists the history of one object, oldest first.
    pub async fn list_for_object(
        &self,
        model_name: &str,
        object_id: &str,
    ) -> DbResult<Vec<ActionLog>> {
        let entries = sqlx::query_as::<_, ActionLog>(&format!(
            "SELECT {LOG_COLUMNS} FROM action_logs \
             WHERE tenant_id = ? AND model_name = ? AND object_id = ? \
             ORDER BY timestamp"
        ))
        .bind(&self.tenant_id)
        .bind(model_name)
        .bind(object_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Lists entries of one kind, most recent first.
    pub async fn list_by_action(&self, action: ActionKind, limit: u32) -> DbResult<Vec<ActionLog>> {
        let entries = sqlx::query_as::<_, ActionLog>(&format!(
            "SELECT {LOG_COLUMNS} FROM action_logs \
             WHERE tenant_id = ? AND action = ? ORDER BY timestamp DESC LIMIT ?"
        ))
        .bind(&self.tenant_id)
        .bind(action)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
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
    use webpos_core::{new_id, Tenant};

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

    fn entry(action: ActionKind, object_id: &str, age_minutes: i64) -> ActionLog {
        ActionLog {
            id: new_id(),
            tenant_id: String::new(),
            user_id: None,
            model_name: "Product".to_string(),
            object_id: object_id.to_string(),
            action,
            timestamp: Utc::now() - Duration::minutes(age_minutes),
            ip_address: None,
            details: None,
        }
    }

    #[tokio::test]
    async fn object_history_in_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = tenant_ctx(&db).await;

        ctx.action_logs().record(&entry(ActionKind::Create, "p1", 30)).await.unwrap();
        ctx.action_logs().record(&entry(ActionKind::Update, "p1", 20)).await.unwrap();
        ctx.action_logs().record(&entry(ActionKind::Delete, "p1", 10)).await.unwrap();
        ctx.action_logs().record(&entry(ActionKind::Create, "p2", 5)).await.unwrap();

        let history = ctx.action_logs().list_for_object("Product", "p1").await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].action, ActionKind::Create);
        assert_eq!(history[2].action, ActionKind::Delete);

        let deletes = ctx
            .action_logs()
            .list_by_action(ActionKind::Delete, 10)
            .await
            .unwrap();
        assert_eq!(deletes.len(), 1);
    }

    #[tokio::test]
    async fn json_details_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = tenant_ctx(&db).await;

        let details = serde_json::json!({ "field": "price_cents", "old": 1000, "new": 1200 });
        ctx.action_logs()
            .record_json(entry(ActionKind::Update, "p1", 0), &details)
            .await
            .unwrap();

        let history = ctx.action_logs().list_for_object("Product", "p1").await.unwrap();
        let stored: serde_json::Value =
            serde_json::from_str(history[0].details.as_deref().unwrap()).unwrap();
        assert_eq!(stored["new"], 1200);
    }

    #[tokio::test]
    async fn logs_are_invisible_across_tenants() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx_a = tenant_ctx(&db).await;
        let ctx_b = tenant_ctx(&db).await;

        ctx_a.action_logs().record(&entry(ActionKind::Login, "u1", 0)).await.unwrap();

        assert_eq!(ctx_a.action_logs().list(10).await.unwrap().len(), 1);
        assert!(ctx_b.action_logs().list(10).await.unwrap().is_empty());
    }
}

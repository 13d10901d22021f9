//! # Staff Repositories
//!
//! Shifts and commissions. Neither table carries a tenant_id of its own;
//! scope is enforced through the owning user row.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use webpos_core::{Commission, Shift};

// =============================================================================
// Shifts
// =============================================================================

const SHIFT_COLUMNS: &str = "s.id, s.user_id, s.store_id, s.start_time, s.end_time, s.created_at";

/// Repository for staff shifts.
#[derive(Debug, Clone)]
pub struct ShiftRepository {
    pool: SqlitePool,
    tenant_id: String,
}

impl ShiftRepository {
    pub fn new(pool: SqlitePool, tenant_id: String) -> Self {
        ShiftRepository { pool, tenant_id }
    }

    /// Records a clock-in. The shift starts open (no end time).
    pub async fn clock_in(&self, shift: &Shift) -> DbResult<()> {
        debug!(user = %shift.user_id, store = %shift.store_id, "Clock-in");

        // The user must belong to this tenant.
        let belongs: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ? AND tenant_id = ?)",
        )
        .bind(&shift.user_id)
        .bind(&self.tenant_id)
        .fetch_one(&self.pool)
        .await?;

        if !belongs {
            return Err(DbError::not_found("User", &shift.user_id));
        }

        sqlx::query(
            "INSERT INTO shifts (id, user_id, store_id, start_time, end_time, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&shift.id)
        .bind(&shift.user_id)
        .bind(&shift.store_id)
        .bind(shift.start_time)
        .bind(shift.end_time)
        .bind(shift.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Records a clock-out on an open shift.
    pub async fn clock_out(&self, shift_id: &str, end: DateTime<Utc>) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE shifts SET end_time = ? \
             WHERE id = ? AND end_time IS NULL \
             AND user_id IN (SELECT id FROM users WHERE tenant_id = ?)",
        )
        .bind(end)
        .bind(shift_id)
        .bind(&self.tenant_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Shift", shift_id));
        }

        Ok(())
    }

    /// Lists currently open shifts for the tenant.
    pub async fn list_open(&self) -> DbResult<Vec<Shift>> {
        let shifts = sqlx::query_as::<_, Shift>(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts s \
             JOIN users u ON u.id = s.user_id \
             WHERE u.tenant_id = ? AND s.end_time IS NULL \
             ORDER BY s.start_time"
        ))
        .bind(&self.tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(shifts)
    }

    /// Lists one user's shifts, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Shift>> {
        let shifts = sqlx::query_as::<_, Shift>(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts s \
             JOIN users u ON u.id = s.user_id \
             WHERE s.user_id = ? AND u.tenant_id = ? \
             ORDER BY s.start_time DESC"
        ))
        .bind(user_id)
        .bind(&self.tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(shifts)
    }
}

// =============================================================================
// Commissions
// =============================================================================

const COMMISSION_COLUMNS: &str = "c.id, c.user_id, c.sale_id, c.amount_cents, c.created_at";

/// Repository for per-sale commission credits.
#[derive(Debug, Clone)]
pub struct CommissionRepository {
    pool: SqlitePool,
    tenant_id: String,
}

impl CommissionRepository {
    pub fn new(pool: SqlitePool, tenant_id: String) -> Self {
        CommissionRepository { pool, tenant_id }
    }

    /// Credits a commission for a sale.
    pub async fn create(&self, commission: &Commission) -> DbResult<()> {
        let belongs: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ? AND tenant_id = ?)",
        )
        .bind(&commission.user_id)
        .bind(&self.tenant_id)
        .fetch_one(&self.pool)
        .await?;

        if !belongs {
            return Err(DbError::not_found("User", &commission.user_id));
        }

        sqlx::query(
            "INSERT INTO commissions (id, user_id, sale_id, amount_cents, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&commission.id)
        .bind(&commission.user_id)
        .bind(&commission.sale_id)
        .bind(commission.amount_cents)
        .bind(commission.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists one user's commissions, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Commission>> {
        let commissions = sqlx::query_as::<_, Commission>(&format!(
            "SELECT {COMMISSION_COLUMNS} FROM commissions c \
             JOIN users u ON u.id = c.user_id \
             WHERE c.user_id = ? AND u.tenant_id = ? \
             ORDER BY c.created_at DESC"
        ))
        .bind(user_id)
        .bind(&self.tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(commissions)
    }

    /// Sum of one user's commissions, in cents.
    pub async fn total_for_user(&self, user_id: &str) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(c.amount_cents), 0) FROM commissions c \
             JOIN users u ON u.id = c.user_id \
             WHERE c.user_id = ? AND u.tenant_id = ?",
        )
        .bind(user_id)
        .bind(&self.tenant_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

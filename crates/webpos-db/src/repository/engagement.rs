//! # Engagement Repositories
//!
//! Gift cards, promotions and loyalty points.
//!
//! ## Atomic Redemption
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Two terminals redeem the same card at once (balance 100.00):       │
//! │                                                                     │
//! │  A: redeem 60.00 ──┐                                                │
//! │                    ├── UPDATE ... SET balance = balance - 60        │
//! │  B: redeem 60.00 ──┘        WHERE code = ? AND is_active = 1        │
//! │                               AND current_balance_cents >= 60       │
//! │                                                                     │
//! │  The guard is INSIDE the UPDATE, so SQLite serializes the two       │
//! │  writes: exactly one matches, the other affects zero rows and is    │
//! │  reported as insufficient balance. Final balance: 40.00, never -20. │
//! │  A CHECK (current_balance_cents >= 0) backs this up in the schema.  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use webpos_core::{new_id, GiftCard, LoyaltyPoint, Money, Promotion, ValidationError};

// =============================================================================
// Gift Cards
// =============================================================================

const GIFT_CARD_COLUMNS: &str = "id, tenant_id, code, initial_amount_cents, \
     current_balance_cents, issued_to, issued_by, issued_at, expires_at, is_active";

/// Repository for a tenant's gift cards.
#[derive(Debug, Clone)]
pub struct GiftCardRepository {
    pool: SqlitePool,
    tenant_id: String,
}

impl GiftCardRepository {
    pub fn new(pool: SqlitePool, tenant_id: String) -> Self {
        GiftCardRepository { pool, tenant_id }
    }

    /// Issues a new gift card. Codes are globally unique.
    pub async fn issue(&self, card: &GiftCard) -> DbResult<()> {
        debug!(code = %card.code, cents = card.initial_amount_cents, "Issuing gift card");

        sqlx::query(
            "INSERT INTO gift_cards (id, tenant_id, code, initial_amount_cents, \
             current_balance_cents, issued_to, issued_by, issued_at, expires_at, is_active) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&card.id)
        .bind(&self.tenant_id)
        .bind(&card.code)
        .bind(card.initial_amount_cents)
        .bind(card.current_balance_cents)
        .bind(&card.issued_to)
        .bind(&card.issued_by)
        .bind(card.issued_at)
        .bind(card.expires_at)
        .bind(card.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a gift card by its code, within this tenant only.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<GiftCard>> {
        let card = sqlx::query_as::<_, GiftCard>(&format!(
            "SELECT {GIFT_CARD_COLUMNS} FROM gift_cards WHERE code = ? AND tenant_id = ?"
        ))
        .bind(code)
        .bind(&self.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(card)
    }

    /// Lists the tenant's gift cards, newest first.
    pub async fn list(&self) -> DbResult<Vec<GiftCard>> {
        let cards = sqlx::query_as::<_, GiftCard>(&format!(
            "SELECT {GIFT_CARD_COLUMNS} FROM gift_cards \
             WHERE tenant_id = ? ORDER BY issued_at DESC"
        ))
        .bind(&self.tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(cards)
    }

    /// Redeems `amount` against a card's balance, atomically.
    ///
    /// The balance guard is part of the UPDATE's WHERE clause, so two
    /// concurrent redemptions cannot both pass it, and RETURNING hands
    /// back the balance the same statement produced. On failure the
    /// balance is unchanged and the error says why: non-positive amount,
    /// unknown code, inactive card, or insufficient balance. Returns the
    /// new balance on success.
    pub async fn redeem(&self, code: &str, amount: Money) -> DbResult<Money> {
        if amount.cents() <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "amount".to_string(),
            }
            .into());
        }

        debug!(code = %code, cents = amount.cents(), "Redeeming gift card");

        let balance: Option<i64> = sqlx::query_scalar(
            "UPDATE gift_cards SET current_balance_cents = current_balance_cents - ? \
             WHERE code = ? AND tenant_id = ? AND is_active = 1 \
             AND current_balance_cents >= ? \
             RETURNING current_balance_cents",
        )
        .bind(amount.cents())
        .bind(code)
        .bind(&self.tenant_id)
        .bind(amount.cents())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(balance) = balance {
            return Ok(Money::from_cents(balance));
        }

        // Zero rows matched: classify the failure for the caller.
        match self.get_by_code(code).await? {
            None => Err(DbError::not_found("GiftCard", code)),
            Some(card) if !card.is_active => Err(DbError::GiftCardInactive {
                code: code.to_string(),
            }),
            Some(card) => Err(DbError::InsufficientBalance {
                code: code.to_string(),
                balance_cents: card.current_balance_cents,
                requested_cents: amount.cents(),
            }),
        }
    }

    /// Deactivates a card without deleting it.
    pub async fn deactivate(&self, code: &str) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE gift_cards SET is_active = 0 WHERE code = ? AND tenant_id = ?")
                .bind(code)
                .bind(&self.tenant_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("GiftCard", code));
        }

        Ok(())
    }
}

// =============================================================================
// Promotions
// =============================================================================

const PROMOTION_COLUMNS: &str = "id, tenant_id, code, description, discount_percent_bps, \
     start_date, end_date, active";

/// Repository for a tenant's promotion codes.
#[derive(Debug, Clone)]
pub struct PromotionRepository {
    pool: SqlitePool,
    tenant_id: String,
}

impl PromotionRepository {
    pub fn new(pool: SqlitePool, tenant_id: String) -> Self {
        PromotionRepository { pool, tenant_id }
    }

    /// Creates a promotion. Codes are globally unique.
    pub async fn create(&self, promotion: &Promotion) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO promotions (id, tenant_id, code, description, \
             discount_percent_bps, start_date, end_date, active) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&promotion.id)
        .bind(&self.tenant_id)
        .bind(&promotion.code)
        .bind(&promotion.description)
        .bind(promotion.discount_percent_bps)
        .bind(promotion.start_date)
        .bind(promotion.end_date)
        .bind(promotion.active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a promotion by its code, within this tenant only.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Promotion>> {
        let promotion = sqlx::query_as::<_, Promotion>(&format!(
            "SELECT {PROMOTION_COLUMNS} FROM promotions WHERE code = ? AND tenant_id = ?"
        ))
        .bind(code)
        .bind(&self.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(promotion)
    }

    /// Lists promotions applicable on `date`: active and inside their
    /// inclusive validity window.
    pub async fn list_valid_on(&self, date: NaiveDate) -> DbResult<Vec<Promotion>> {
        let promotions = sqlx::query_as::<_, Promotion>(&format!(
            "SELECT {PROMOTION_COLUMNS} FROM promotions \
             WHERE tenant_id = ? AND active = 1 AND start_date <= ? AND end_date >= ? \
             ORDER BY code"
        ))
        .bind(&self.tenant_id)
        .bind(date)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(promotions)
    }

    /// Pauses or resumes a promotion.
    pub async fn set_active(&self, code: &str, active: bool) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE promotions SET active = ? WHERE code = ? AND tenant_id = ?")
                .bind(active)
                .bind(code)
                .bind(&self.tenant_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Promotion", code));
        }

        Ok(())
    }
}

// =============================================================================
// Loyalty Points
// =============================================================================

/// Repository for loyalty point balances, one row per user.
#[derive(Debug, Clone)]
pub struct LoyaltyRepository {
    pool: SqlitePool,
    tenant_id: String,
}

impl LoyaltyRepository {
    pub fn new(pool: SqlitePool, tenant_id: String) -> Self {
        LoyaltyRepository { pool, tenant_id }
    }

    /// Adds (or with a negative delta, deducts) points for a user,
    /// creating the balance row on first accrual.
    pub async fn add_points(&self, user_id: &str, delta: i64) -> DbResult<i64> {
        // The loyalty table hangs off users, so tenant scope is enforced
        // through the user row.
        let belongs: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ? AND tenant_id = ?)",
        )
        .bind(user_id)
        .bind(&self.tenant_id)
        .fetch_one(&self.pool)
        .await?;

        if !belongs {
            return Err(DbError::not_found("User", user_id));
        }

        let now = chrono::Utc::now();

        sqlx::query(
            "INSERT INTO loyalty_points (id, user_id, points, updated_at) \
             VALUES (?, ?, ?, ?) \
             ON CONFLICT(user_id) DO UPDATE SET \
             points = points + excluded.points, updated_at = excluded.updated_at",
        )
        .bind(new_id())
        .bind(user_id)
        .bind(delta)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let points: i64 =
            sqlx::query_scalar("SELECT points FROM loyalty_points WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(points)
    }

    /// Gets a user's balance row, if any points were ever accrued.
    pub async fn get_for_user(&self, user_id: &str) -> DbResult<Option<LoyaltyPoint>> {
        let row = sqlx::query_as::<_, LoyaltyPoint>(
            "SELECT l.id, l.user_id, l.points, l.updated_at \
             FROM loyalty_points l \
             JOIN users u ON u.id = l.user_id \
             WHERE l.user_id = ? AND u.tenant_id = ?",
        )
        .bind(user_id)
        .bind(&self.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
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
    use webpos_core::{Role, Tenant, User};

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

    fn card(code: &str, cents: i64) -> GiftCard {
        GiftCard {
            id: new_id(),
            tenant_id: String::new(),
            code: code.to_string(),
            initial_amount_cents: cents,
            current_balance_cents: cents,
            issued_to: None,
            issued_by: None,
            issued_at: Utc::now(),
            expires_at: None,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn redeem_decrements_balance() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = tenant_ctx(&db).await;

        ctx.gift_cards().issue(&card("GC-100", 10000)).await.unwrap();

        let balance = ctx
            .gift_cards()
            .redeem("GC-100", Money::from_cents(6000))
            .await
            .unwrap();
        assert_eq!(balance.cents(), 4000);
    }

    #[tokio::test]
    async fn redeem_beyond_balance_fails_and_changes_nothing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = tenant_ctx(&db).await;

        ctx.gift_cards().issue(&card("GC-100", 4000)).await.unwrap();

        let err = ctx
            .gift_cards()
            .redeem("GC-100", Money::from_cents(6000))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::InsufficientBalance {
                balance_cents: 4000,
                requested_cents: 6000,
                ..
            }
        ));

        let fetched = ctx.gift_cards().get_by_code("GC-100").await.unwrap().unwrap();
        assert_eq!(fetched.current_balance_cents, 4000);
    }

    #[tokio::test]
    async fn concurrent_redemptions_cannot_overdraw() {
        // A multi-connection pool, so the two redemptions really interleave
        // instead of queueing on a single connection.
        let db = Database::new(DbConfig::shared_in_memory()).await.unwrap();
        let ctx = tenant_ctx(&db).await;

        ctx.gift_cards().issue(&card("GC-100", 10000)).await.unwrap();

        // Two 60.00 redemptions race against a 100.00 balance.
        let repo_a = ctx.gift_cards();
        let repo_b = ctx.gift_cards();
        let (a, b) = tokio::join!(
            repo_a.redeem("GC-100", Money::from_cents(6000)),
            repo_b.redeem("GC-100", Money::from_cents(6000)),
        );

        // Exactly one wins.
        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);

        let fetched = ctx.gift_cards().get_by_code("GC-100").await.unwrap().unwrap();
        assert_eq!(fetched.current_balance_cents, 4000);
    }

    #[tokio::test]
    async fn nonpositive_redemption_is_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = tenant_ctx(&db).await;

        ctx.gift_cards().issue(&card("GC-100", 10000)).await.unwrap();

        // A negative amount would otherwise inflate the balance.
        for cents in [0_i64, -500] {
            assert!(matches!(
                ctx.gift_cards()
                    .redeem("GC-100", Money::from_cents(cents))
                    .await
                    .unwrap_err(),
                DbError::Validation(_)
            ));
        }

        let fetched = ctx.gift_cards().get_by_code("GC-100").await.unwrap().unwrap();
        assert_eq!(fetched.current_balance_cents, 10000);
    }

    #[tokio::test]
    async fn inactive_card_and_unknown_code_are_distinct_errors() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = tenant_ctx(&db).await;

        ctx.gift_cards().issue(&card("GC-100", 10000)).await.unwrap();
        ctx.gift_cards().deactivate("GC-100").await.unwrap();

        assert!(matches!(
            ctx.gift_cards()
                .redeem("GC-100", Money::from_cents(100))
                .await
                .unwrap_err(),
            DbError::GiftCardInactive { .. }
        ));

        assert!(matches!(
            ctx.gift_cards()
                .redeem("NO-SUCH", Money::from_cents(100))
                .await
                .unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn gift_card_code_is_globally_unique() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx_a = tenant_ctx(&db).await;
        let ctx_b = tenant_ctx(&db).await;

        ctx_a.gift_cards().issue(&card("GC-100", 1000)).await.unwrap();
        let err = ctx_b.gift_cards().issue(&card("GC-100", 1000)).await.unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn promotion_window_filter() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = tenant_ctx(&db).await;

        let promo = Promotion {
            id: new_id(),
            tenant_id: String::new(),
            code: "SUMMER10".to_string(),
            description: String::new(),
            discount_percent_bps: 1000,
            start_date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 8, 31).unwrap(),
            active: true,
        };
        ctx.promotions().create(&promo).await.unwrap();

        let july = NaiveDate::from_ymd_opt(2026, 7, 15).unwrap();
        assert_eq!(ctx.promotions().list_valid_on(july).await.unwrap().len(), 1);

        let october = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
        assert!(ctx.promotions().list_valid_on(october).await.unwrap().is_empty());

        ctx.promotions().set_active("SUMMER10", false).await.unwrap();
        assert!(ctx.promotions().list_valid_on(july).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn loyalty_points_accrue_and_deduct() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ctx = tenant_ctx(&db).await;

        let user = User {
            id: new_id(),
            tenant_id: String::new(),
            username: "shopper".to_string(),
            email: String::new(),
            role: Role::Customer,
            profile_picture: None,
            is_active: true,
            last_login: None,
            created_at: Utc::now(),
        };
        ctx.users().create(&user).await.unwrap();

        assert!(ctx.loyalty_points().get_for_user(&user.id).await.unwrap().is_none());

        assert_eq!(ctx.loyalty_points().add_points(&user.id, 120).await.unwrap(), 120);
        assert_eq!(ctx.loyalty_points().add_points(&user.id, -20).await.unwrap(), 100);

        let row = ctx
            .loyalty_points()
            .get_for_user(&user.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.points, 100);

        // Unknown user: no silent row creation.
        assert!(matches!(
            ctx.loyalty_points().add_points("ghost", 10).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }
}

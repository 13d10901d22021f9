//! # Customer Engagement
//!
//! Stored value and rewards: [`GiftCard`] (with the balance-guarded
//! redemption rule), [`Promotion`] discount codes and [`LoyaltyPoint`]
//! balances.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, ValidationError};
use crate::money::{Money, Rate};

// =============================================================================
// Gift Card
// =============================================================================

/// A stored-value instrument.
///
/// The invariant: `current_balance` never goes negative. [`redeem`]
/// enforces it in memory; the persistence layer enforces the same rule
/// atomically (conditional UPDATE plus a CHECK constraint) so concurrent
/// redemptions cannot race past it.
///
/// [`redeem`]: GiftCard::redeem
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct GiftCard {
    pub id: String,
    pub tenant_id: String,
    /// Unique card code, printed on the physical card.
    pub code: String,
    pub initial_amount_cents: i64,
    pub current_balance_cents: i64,
    pub issued_to: Option<String>,
    pub issued_by: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl GiftCard {
    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_cents(self.current_balance_cents)
    }

    /// Whether the card is usable at `now`: active and not past expiry.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !matches!(self.expires_at, Some(exp) if now >= exp)
    }

    /// Redeems `amount` against the balance.
    ///
    /// Succeeds and decrements only if the card is active and the amount
    /// is positive and does not exceed the balance; otherwise reports
    /// failure and leaves the balance unchanged (an idempotent no-op on
    /// failure). Returns the new balance on success.
    pub fn redeem(&mut self, amount: Money) -> Result<Money, CoreError> {
        if amount.cents() <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "amount".to_string(),
            }
            .into());
        }
        if !self.is_active {
            return Err(CoreError::GiftCardInactive {
                code: self.code.clone(),
            });
        }
        if amount.cents() > self.current_balance_cents {
            return Err(CoreError::InsufficientBalance {
                code: self.code.clone(),
                balance_cents: self.current_balance_cents,
                requested_cents: amount.cents(),
            });
        }
        self.current_balance_cents -= amount.cents();
        Ok(self.balance())
    }
}

// =============================================================================
// Promotion
// =============================================================================

/// A discount code with a validity window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Promotion {
    pub id: String,
    pub tenant_id: String,
    /// Unique promo code.
    pub code: String,
    pub description: String,
    /// Discount in basis points (1000 = 10.00%).
    pub discount_percent_bps: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub active: bool,
}

impl Promotion {
    #[inline]
    pub fn discount(&self) -> Rate {
        Rate::from_bps(self.discount_percent_bps)
    }

    /// Whether the promotion applies on `date`: active and inside its
    /// inclusive validity window.
    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        self.active && date >= self.start_date && date <= self.end_date
    }
}

// =============================================================================
// Loyalty Points
// =============================================================================

/// Accrued reward points for a user. Accrues and decrements over time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LoyaltyPoint {
    pub id: String,
    pub user_id: String,
    pub points: i64,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

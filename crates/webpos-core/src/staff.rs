//! # Staff Records
//!
//! [`Shift`] working periods (clock-in/clock-out) and per-sale
//! [`Commission`] credits.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Shift
// =============================================================================

/// A staff working period at a store.
///
/// Created at clock-in with no `end_time`; closed at clock-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Shift {
    pub id: String,
    pub user_id: String,
    pub store_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Shift {
    /// Whether the shift is still open (no clock-out yet).
    #[inline]
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Worked duration; `None` while the shift is still open.
    pub fn duration(&self) -> Option<Duration> {
        self.end_time.map(|end| end - self.start_time)
    }
}

// =============================================================================
// Commission
// =============================================================================

/// Earnings credited to a user for a sale, created at sale finalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Commission {
    pub id: String,
    pub user_id: String,
    pub sale_id: String,
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Commission {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_duration() {
        let start = Utc::now();
        let mut shift = Shift {
            id: "sh1".to_string(),
            user_id: "u1".to_string(),
            store_id: "s1".to_string(),
            start_time: start,
            end_time: None,
            created_at: start,
        };

        assert!(shift.is_open());
        assert!(shift.duration().is_none());

        shift.end_time = Some(start + Duration::hours(8));
        assert!(!shift.is_open());
        assert_eq!(shift.duration().unwrap(), Duration::hours(8));
    }
}

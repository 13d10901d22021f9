//! # Financial Configuration & Ledger
//!
//! [`Tax`] rate definitions, append-only [`JournalEntry`] accounting lines
//! and [`Kpi`] metric snapshots (computed by an external periodic job).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::{Money, Rate};

// =============================================================================
// Tax
// =============================================================================

/// A tax rate definition - static per-tenant configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Tax {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    /// Rate in basis points (825 = 8.25%).
    pub percentage_bps: u32,
    pub description: String,
    pub is_active: bool,
}

impl Tax {
    #[inline]
    pub fn rate(&self) -> Rate {
        Rate::from_bps(self.percentage_bps)
    }

    /// The tax amount due on `base`, rounded half-up to the cent.
    pub fn amount_on(&self, base: Money) -> Money {
        base.portion(self.rate())
    }
}

// =============================================================================
// Journal Entry
// =============================================================================

/// An accounting ledger line - append-only financial record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct JournalEntry {
    pub id: String,
    pub tenant_id: String,
    pub description: String,
    pub amount_cents: i64,
    pub entry_date: NaiveDate,
}

impl JournalEntry {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// KPI
// =============================================================================

/// A computed business metric snapshot.
///
/// Written by a periodic calculation job outside this layer; the schema
/// only stores the result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Kpi {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub value_cents: i64,
    pub calculated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Stock Movement
//!
//! Procurement and per-store inventory: [`Purchase`] intake records,
//! [`Inventory`] levels (one row per tenant/product/store triple), the
//! append-only [`InventoryTransaction`] movement ledger, and
//! [`SurplusSupply`] records.
//!
//! ## Movement Ledger
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  Inventory.quantity is never written absolutely.                 │
//! │                                                                  │
//! │  Every change goes through a movement:                           │
//! │    restock +24 ──► quantity = quantity + 24, ledger row appended │
//! │    sale     -3 ──► quantity = quantity - 3,  ledger row appended │
//! │                                                                  │
//! │  The ledger is the audit trail; the quantity is the fold of it.  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Purchase
// =============================================================================

/// A procurement transaction - immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Purchase {
    pub id: String,
    pub tenant_id: String,
    pub vendor_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub total_cost_cents: i64,
    pub purchased_at: DateTime<Utc>,
}

impl Purchase {
    #[inline]
    pub fn total_cost(&self) -> Money {
        Money::from_cents(self.total_cost_cents)
    }
}

// =============================================================================
// Inventory
// =============================================================================

/// Per-store stock level of a product.
///
/// At most one row may exist per (tenant, product, store) triple; the
/// persistence layer enforces this with a composite unique constraint and
/// a second creation attempt fails with a uniqueness violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Inventory {
    pub id: String,
    pub tenant_id: String,
    pub product_id: String,
    pub store_id: String,
    pub quantity: i64,
    pub minimum_stock_level: i64,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Inventory {
    /// Whether the level has fallen below the reorder threshold.
    #[inline]
    pub fn is_below_minimum(&self) -> bool {
        self.quantity < self.minimum_stock_level
    }
}

// =============================================================================
// Stock Movement
// =============================================================================

/// The type of a stock change. Closed set; unknown strings are rejected
/// at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum StockMovement {
    Restock,
    Sale,
    Adjustment,
    TransferIn,
    TransferOut,
    Damage,
    Surplus,
}

impl StockMovement {
    pub const fn as_str(&self) -> &'static str {
        match self {
            StockMovement::Restock => "restock",
            StockMovement::Sale => "sale",
            StockMovement::Adjustment => "adjustment",
            StockMovement::TransferIn => "transfer_in",
            StockMovement::TransferOut => "transfer_out",
            StockMovement::Damage => "damage",
            StockMovement::Surplus => "surplus",
        }
    }

    pub const ALL: [&'static str; 7] = [
        "restock", "sale", "adjustment", "transfer_in", "transfer_out", "damage", "surplus",
    ];
}

impl fmt::Display for StockMovement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StockMovement {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "restock" => Ok(StockMovement::Restock),
            "sale" => Ok(StockMovement::Sale),
            "adjustment" => Ok(StockMovement::Adjustment),
            "transfer_in" => Ok(StockMovement::TransferIn),
            "transfer_out" => Ok(StockMovement::TransferOut),
            "damage" => Ok(StockMovement::Damage),
            "surplus" => Ok(StockMovement::Surplus),
            _ => Err(ValidationError::NotAllowed {
                field: "transaction_type".to_string(),
                allowed: StockMovement::ALL.iter().map(|s| s.to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Inventory Transaction
// =============================================================================

/// An audit record of a stock change - an append-only ledger entry.
///
/// `quantity` is the signed delta applied to the inventory row: positive
/// for restock/transfer-in/surplus, negative for sale/transfer-out/damage,
/// either sign for adjustments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InventoryTransaction {
    pub id: String,
    pub tenant_id: String,
    pub inventory_id: String,
    pub movement: StockMovement,
    pub quantity: i64,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Surplus Supply
// =============================================================================

/// Recorded excess stock for a product at a store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SurplusSupply {
    pub id: String,
    pub tenant_id: String,
    pub product_id: String,
    pub store_id: String,
    pub quantity: i64,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

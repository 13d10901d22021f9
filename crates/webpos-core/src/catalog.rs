//! # Catalog Entities
//!
//! Sellable things: physical [`Product`]s (with their damage, discount,
//! surplus and pack-size bookkeeping), the one-to-one [`VirtualProduct`]
//! detail record for non-physical goods, and [`Service`]s.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::{Money, Rate};

// =============================================================================
// Product
// =============================================================================

/// A sellable physical good.
///
/// Identity is dual-keyed: `id` (UUID, immutable, used for relations) plus
/// the business identifiers `sku` and `barcode`, both unique across the
/// system. `price_cents` and `quantity` are mutated by sales and inventory
/// movements; everything else is catalog data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: String,
    pub tenant_id: String,
    pub store_id: String,
    pub category_id: Option<String>,
    pub name: String,

    /// Stock Keeping Unit - unique business identifier.
    pub sku: String,
    /// Barcode (EAN-13, UPC-A, ...) - unique.
    pub barcode: String,

    pub description: String,
    pub price_cents: i64,
    pub cost_price_cents: i64,

    /// Tenant-wide catalog count; per-store levels live in the inventory
    /// table and are maintained through movements.
    pub quantity: i64,
    pub expiry_date: Option<NaiveDate>,

    // Damage / discount / surplus bookkeeping
    pub is_damaged: bool,
    pub damaged_quantity: i64,
    pub is_discounted: bool,
    /// Discount in basis points (1000 = 10.00%).
    pub discount_percent_bps: u32,
    pub surplus_quantity: i64,
    /// Units per counting unit (pack-size multiplier), at least 1.
    pub supply_pcu: i64,

    // Virtual-product flags; details live in [`VirtualProduct`]
    pub is_virtual: bool,
    pub validity_days: Option<i64>,
    pub max_redemptions: Option<i64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the list price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the cost price as Money.
    #[inline]
    pub fn cost_price(&self) -> Money {
        Money::from_cents(self.cost_price_cents)
    }

    /// The effective selling price.
    ///
    /// If the product is flagged discounted with a non-zero percentage,
    /// this is `price * (1 - discount/100)` rounded half-up to the cent;
    /// otherwise it is the list price unchanged.
    ///
    /// ```rust
    /// # use webpos_core::catalog::Product;
    /// # let mut p = Product::sample();
    /// p.price_cents = 10000;              // 100.00
    /// p.is_discounted = true;
    /// p.discount_percent_bps = 1000;      // 10%
    /// assert_eq!(p.discounted_price().cents(), 9000); // 90.00
    /// ```
    pub fn discounted_price(&self) -> Money {
        if self.is_discounted && self.discount_percent_bps > 0 {
            self.price().less_rate(Rate::from_bps(self.discount_percent_bps))
        } else {
            self.price()
        }
    }

    /// Whether the product has expired as of `date`.
    pub fn is_expired(&self, date: NaiveDate) -> bool {
        matches!(self.expiry_date, Some(expiry) if date > expiry)
    }

    /// A placeholder product for doctests and unit tests.
    #[doc(hidden)]
    pub fn sample() -> Self {
        let now = Utc::now();
        Product {
            id: "00000000-0000-0000-0000-00000000000a".to_string(),
            tenant_id: "00000000-0000-0000-0000-000000000001".to_string(),
            store_id: "00000000-0000-0000-0000-000000000002".to_string(),
            category_id: None,
            name: "Sample".to_string(),
            sku: "SAMPLE-001".to_string(),
            barcode: "5901234123457".to_string(),
            description: String::new(),
            price_cents: 0,
            cost_price_cents: 0,
            quantity: 0,
            expiry_date: None,
            is_damaged: false,
            damaged_quantity: 0,
            is_discounted: false,
            discount_percent_bps: 0,
            surplus_quantity: 0,
            supply_pcu: 1,
            is_virtual: false,
            validity_days: None,
            max_redemptions: None,
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// Virtual Product
// =============================================================================

/// The kind of non-physical product a [`VirtualProduct`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum VirtualKind {
    Airtime,
    Voucher,
    Electricity,
    DataBundle,
    Subscription,
    Other,
}

impl VirtualKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            VirtualKind::Airtime => "airtime",
            VirtualKind::Voucher => "voucher",
            VirtualKind::Electricity => "electricity",
            VirtualKind::DataBundle => "data_bundle",
            VirtualKind::Subscription => "subscription",
            VirtualKind::Other => "other",
        }
    }
}

impl fmt::Display for VirtualKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VirtualKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "airtime" => Ok(VirtualKind::Airtime),
            "voucher" => Ok(VirtualKind::Voucher),
            "electricity" => Ok(VirtualKind::Electricity),
            "data_bundle" => Ok(VirtualKind::DataBundle),
            "subscription" => Ok(VirtualKind::Subscription),
            "other" => Ok(VirtualKind::Other),
            _ => Err(ValidationError::NotAllowed {
                field: "virtual_type".to_string(),
                allowed: ["airtime", "voucher", "electricity", "data_bundle", "subscription", "other"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }),
        }
    }
}

/// Detail record for a non-physical product (airtime, voucher, ...).
///
/// One-to-one with [`Product`]: `product_id` is unique, and the row is
/// created alongside a product flagged `is_virtual`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct VirtualProduct {
    pub id: String,
    pub product_id: String,
    pub kind: VirtualKind,
    pub provider_name: String,
    pub denomination_cents: Option<i64>,
    pub validity_period_days: Option<i64>,
    pub terms_and_conditions: String,
}

// =============================================================================
// Service
// =============================================================================

/// A sellable service - a static catalog entry with a duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Service {
    pub id: String,
    pub tenant_id: String,
    pub category_id: Option<String>,
    pub name: String,
    pub price_cents: i64,
    pub description: String,
    pub duration_minutes: i64,
    pub created_at: DateTime<Utc>,
}

impl Service {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discounted_price_applies_percentage() {
        let mut p = Product::sample();
        p.price_cents = 10000; // 100.00
        p.is_discounted = true;
        p.discount_percent_bps = 1000; // 10%

        assert_eq!(p.discounted_price().cents(), 9000);
    }

    #[test]
    fn discounted_price_is_list_price_when_flag_off() {
        let mut p = Product::sample();
        p.price_cents = 10000;
        p.is_discounted = false;
        p.discount_percent_bps = 1000;

        assert_eq!(p.discounted_price().cents(), 10000);
    }

    #[test]
    fn discounted_price_is_list_price_when_percent_zero() {
        let mut p = Product::sample();
        p.price_cents = 10000;
        p.is_discounted = true;
        p.discount_percent_bps = 0;

        assert_eq!(p.discounted_price().cents(), 10000);
    }

    #[test]
    fn discounted_price_rounds_half_up() {
        let mut p = Product::sample();
        p.price_cents = 999; // 9.99
        p.is_discounted = true;
        p.discount_percent_bps = 3333; // 33.33% of 9.99 = 3.329667 -> 3.33

        assert_eq!(p.discounted_price().cents(), 999 - 333);
    }

    #[test]
    fn expiry_check() {
        let mut p = Product::sample();
        assert!(!p.is_expired(NaiveDate::from_ymd_opt(2099, 1, 1).unwrap()));

        p.expiry_date = NaiveDate::from_ymd_opt(2026, 6, 1);
        assert!(!p.is_expired(NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()));
        assert!(p.is_expired(NaiveDate::from_ymd_opt(2026, 6, 2).unwrap()));
    }

    #[test]
    fn virtual_kind_wire_names() {
        assert_eq!(
            serde_json::from_str::<VirtualKind>("\"data_bundle\"").unwrap(),
            VirtualKind::DataBundle
        );
        assert!(serde_json::from_str::<VirtualKind>("\"gift\"").is_err());
        assert_eq!("voucher".parse::<VirtualKind>().unwrap(), VirtualKind::Voucher);
    }
}

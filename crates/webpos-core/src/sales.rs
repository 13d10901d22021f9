//! # Sales Entities
//!
//! Checkout records: [`Sale`], its [`OrderItem`] lines, the payments
//! applied to it, refunds, and delivery fulfillment.
//!
//! The one real cross-field rule in this module is OrderItem exclusivity:
//! a line references exactly one of a product or a service - never both,
//! never neither. [`OrderItem::validate`] runs before persistence and the
//! [`OrderLine`] enum exposes the reference as a closed variant so callers
//! never juggle two options.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Sale
// =============================================================================

/// A completed transaction at a store, immutable once finalized.
///
/// `user_id` is the cashier; it is nulled out if the user account is
/// removed, so the record survives staff churn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub tenant_id: String,
    pub store_id: String,
    pub user_id: Option<String>,
    pub customer_id: Option<String>,
    pub total_amount_cents: i64,
    pub date: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// What an order line sells - a closed view over the product/service pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderLine {
    Product(String),
    Service(String),
}

/// A line item of a sale.
///
/// Exactly one of `product_id` / `service_id` must be set. Two fields
/// rather than a tagged column because the schema keeps separate nullable
/// foreign keys; [`OrderItem::validate`] restores the invariant before any
/// write and [`OrderItem::line`] yields the closed view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: Option<String>,
    pub service_id: Option<String>,
    pub quantity: i64,
    pub price_cents: i64,
}

impl OrderItem {
    /// Builds a product line.
    pub fn for_product(id: String, sale_id: String, product_id: String, quantity: i64, price: Money) -> Self {
        OrderItem {
            id,
            sale_id,
            product_id: Some(product_id),
            service_id: None,
            quantity,
            price_cents: price.cents(),
        }
    }

    /// Builds a service line.
    pub fn for_service(id: String, sale_id: String, service_id: String, quantity: i64, price: Money) -> Self {
        OrderItem {
            id,
            sale_id,
            product_id: None,
            service_id: Some(service_id),
            quantity,
            price_cents: price.cents(),
        }
    }

    /// Checks the exactly-one invariant.
    ///
    /// Fails when neither `product_id` nor `service_id` is set, or when
    /// both are. Must run before persistence; the constructors above keep
    /// the invariant by shape, this guards rows built field-by-field or
    /// deserialized from outside.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match (&self.product_id, &self.service_id) {
            (Some(_), None) | (None, Some(_)) => Ok(()),
            _ => Err(ValidationError::ExactlyOneOf {
                first: "product".to_string(),
                second: "service".to_string(),
            }),
        }
    }

    /// The validated line reference.
    pub fn line(&self) -> Result<OrderLine, ValidationError> {
        self.validate()?;
        match (&self.product_id, &self.service_id) {
            (Some(p), None) => Ok(OrderLine::Product(p.clone())),
            (None, Some(s)) => Ok(OrderLine::Service(s.clone())),
            _ => unreachable!("validate() rejected ambiguous lines"),
        }
    }

    /// Unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price().times(self.quantity)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// How a payment was tendered. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Mobile,
    BankTransfer,
    Credit,
}

impl PaymentMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Mobile => "mobile",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Credit => "credit",
        }
    }

    pub const ALL: [&'static str; 5] = ["cash", "card", "mobile", "bank_transfer", "credit"];
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "mobile" => Ok(PaymentMethod::Mobile),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "credit" => Ok(PaymentMethod::Credit),
            _ => Err(ValidationError::NotAllowed {
                field: "method".to_string(),
                allowed: PaymentMethod::ALL.iter().map(|s| s.to_string()).collect(),
            }),
        }
    }
}

/// A payment applied to a sale. A sale can carry several payments
/// (split tender).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: String,
    pub tenant_id: String,
    pub sale_id: String,
    pub method: PaymentMethod,
    pub amount_cents: i64,
    /// External reference (card auth code, mobile money receipt, ...).
    pub reference: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Refund
// =============================================================================

/// A reversal of a sale, created on a return request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Refund {
    pub id: String,
    pub tenant_id: String,
    pub sale_id: String,
    pub reason: String,
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Refund {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Delivery
// =============================================================================

/// Where a delivery goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum DeliveryKind {
    Local,
    Remote,
}

impl DeliveryKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DeliveryKind::Local => "local",
            DeliveryKind::Remote => "remote",
        }
    }
}

impl fmt::Display for DeliveryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fulfillment record for a sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Delivery {
    pub id: String,
    pub tenant_id: String,
    pub sale_id: String,
    pub kind: DeliveryKind,
    pub delivered_by: Option<String>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub tracking_number: Option<String>,
    pub fee_cents: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

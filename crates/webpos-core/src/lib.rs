//! # webpos-core: Domain Schema & Invariants for WebPOS
//!
//! The data model of a multi-tenant point-of-sale back end: tenants,
//! stores, catalog, parties, stock movement, sales, payments, gift cards
//! and the auxiliary ledger entities, plus the handful of cross-field
//! rules that must hold independent of storage technology.
//!
//! ## Architecture Position
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                      WebPOS Data Flow                              │
//! │                                                                    │
//! │  Admin console / API surface (external)                            │
//! │       │                                                            │
//! │       ▼                                                            │
//! │  ┌──────────────────────────────────────────────────────────────┐  │
//! │  │              ★ webpos-core (THIS CRATE) ★                    │  │
//! │  │                                                              │  │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌────────────┐        │  │
//! │  │   │ catalog │ │  sales  │ │  money  │ │ validation │  ...   │  │
//! │  │   │ Product │ │  Sale   │ │  Money  │ │   rules    │        │  │
//! │  │   │ Service │ │OrderItem│ │  Rate   │ │   checks   │        │  │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └────────────┘        │  │
//! │  │                                                              │  │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS         │  │
//! │  └──────────────────────────────────────────────────────────────┘  │
//! │       │                                                            │
//! │       ▼                                                            │
//! │  webpos-db (SQLite persistence, tenant-scoped repositories)        │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - `Money` (integer cents) and `Rate` (basis points)
//! - [`error`] - Domain error types
//! - [`tenant`] - Tenant, Store, Category
//! - [`party`] - User, Customer, Vendor, Contract and the role enum
//! - [`catalog`] - Product, VirtualProduct, Service
//! - [`stock`] - Purchase, Inventory and the movement ledger
//! - [`sales`] - Sale, OrderItem, Payment, Refund, Delivery
//! - [`engagement`] - GiftCard, Promotion, LoyaltyPoint
//! - [`ledger`] - Tax, JournalEntry, Kpi
//! - [`staff`] - Shift, Commission
//! - [`audit`] - Append-only action log
//! - [`validation`] - Field-level validators
//!
//! ## Design Principles
//!
//! 1. **Integer money**: all monetary values are cents (i64); percentages
//!    are basis points. No floating point anywhere near an amount.
//! 2. **Closed enumerations**: role, payment method, movement type and the
//!    other choice sets are Rust enums, rejected at the serde boundary if
//!    unknown - never open strings.
//! 3. **Explicit errors**: invariant violations surface as typed errors,
//!    never silent correction.
//! 4. **Tenant partitioning**: every entity except [`tenant::Tenant`]
//!    itself carries a `tenant_id`; the persistence layer scopes every
//!    query by it.

pub mod audit;
pub mod catalog;
pub mod engagement;
pub mod error;
pub mod ledger;
pub mod money;
pub mod party;
pub mod sales;
pub mod staff;
pub mod stock;
pub mod tenant;
pub mod validation;

// Re-exports so consumers can `use webpos_core::{Money, Product, ...}`.
pub use audit::{ActionKind, ActionLog};
pub use catalog::{Product, Service, VirtualKind, VirtualProduct};
pub use engagement::{GiftCard, LoyaltyPoint, Promotion};
pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::{JournalEntry, Kpi, Tax};
pub use money::{Money, Rate};
pub use party::{Contract, ContractKind, Customer, Role, User, Vendor};
pub use sales::{Delivery, DeliveryKind, OrderItem, OrderLine, Payment, PaymentMethod, Refund, Sale};
pub use staff::{Commission, Shift};
pub use stock::{Inventory, InventoryTransaction, Purchase, StockMovement, SurplusSupply};
pub use tenant::{Category, Store, Tenant};

/// Generates a fresh entity id (UUID v4, hyphenated).
///
/// Every table keys on a UUID string; business identifiers (sku, barcode,
/// gift-card code) are separate unique columns.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Default minimum stock level for new inventory rows.
///
/// Matches the catalog default used when a store first stocks a product;
/// per-row overrides are expected for fast movers.
pub const DEFAULT_MINIMUM_STOCK_LEVEL: i64 = 5;

/// Default pack-size multiplier ("units per counting unit") for products.
pub const DEFAULT_SUPPLY_PCU: i64 = 1;

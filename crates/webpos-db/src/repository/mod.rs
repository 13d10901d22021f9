//! # Repository Module
//!
//! Repository implementations for the WebPOS schema.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  API layer                                                          │
//! │       │                                                             │
//! │       │  db.tenant(id).products().get(product_id)                   │
//! │       ▼                                                             │
//! │  ProductRepository  ← SQL isolated here, tenant id injected here    │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SQLite database                                                    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Except for [`tenant::TenantRepository`], every repository is
//! constructed with a tenant id by [`crate::TenantContext`] and filters
//! every query on it.
//!
//! ## Modules
//!
//! - [`tenant`] - Tenants themselves (unscoped)
//! - [`directory`] - Stores and categories
//! - [`party`] - Users, customers, vendors, contracts
//! - [`catalog`] - Products, virtual product details, services
//! - [`stock`] - Purchases, inventories and the movement ledger
//! - [`sale`] - Sales, order items, payments, refunds, deliveries
//! - [`engagement`] - Gift cards, promotions, loyalty points
//! - [`ledger`] - Taxes, journal entries, KPI snapshots
//! - [`staff`] - Shifts and commissions
//! - [`audit`] - The append-only action log

pub mod audit;
pub mod catalog;
pub mod directory;
pub mod engagement;
pub mod ledger;
pub mod party;
pub mod sale;
pub mod staff;
pub mod stock;
pub mod tenant;

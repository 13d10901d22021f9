//! # webpos-db: Persistence Layer for WebPOS
//!
//! SQLite persistence for the WebPOS schema using sqlx for async access.
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
//! │  │                ★ webpos-db (THIS CRATE) ★                    │  │
//! │  │                                                              │  │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌─────────────┐  │  │
//! │  │   │   Database    │   │  TenantContext │   │  Migrations │  │  │
//! │  │   │   (pool.rs)   │──►│  (scoped repos)│   │  (embedded) │  │  │
//! │  │   └───────────────┘   └────────────────┘   └─────────────┘  │  │
//! │  └──────────────────────────────────────────────────────────────┘  │
//! │       │                                                            │
//! │       ▼                                                            │
//! │  SQLite database file (WAL mode)                                   │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tenant Scoping
//!
//! Repositories for tenant-owned data are only reachable through
//! [`Database::tenant`], which returns a [`TenantContext`] bound to one
//! tenant id. Every query a scoped repository issues filters on that id,
//! so one tenant's rows are structurally invisible to another. Only the
//! [`TenantRepository`] itself (create/list tenants) is unscoped.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use webpos_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./webpos.db")).await?;
//!
//! let ctx = db.tenant("tenant-uuid");
//! let products = ctx.products().list(50).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, TenantContext};

pub use repository::tenant::TenantRepository;

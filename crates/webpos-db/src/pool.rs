//! # Database Pool Management
//!
//! Connection pool creation, configuration and the tenant scoping entry
//! point.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Database / TenantContext                       │
//! │                                                                     │
//! │  DbConfig::new(path) ← configure pool settings                      │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  Database::new(config).await ← create pool + run migrations         │
//! │       │                                                             │
//! │       ├── db.tenants() ────────► TenantRepository (unscoped)        │
//! │       │                                                             │
//! │       └── db.tenant("t-42") ───► TenantContext                      │
//! │                │                                                    │
//! │                ├── .products()   ─┐                                 │
//! │                ├── .sales()       │ every repository carries the    │
//! │                ├── .gift_cards()  │ tenant id and injects it into   │
//! │                └── ...           ─┘ every query it issues           │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! SQLite WAL (Write-Ahead Logging) mode is enabled: readers don't block
//! writers and vice versa, with better crash recovery.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::audit::ActionLogRepository;
use crate::repository::catalog::{ProductRepository, ServiceRepository};
use crate::repository::directory::{CategoryRepository, StoreRepository};
use crate::repository::engagement::{GiftCardRepository, LoyaltyRepository, PromotionRepository};
use crate::repository::ledger::{JournalRepository, KpiRepository, TaxRepository};
use crate::repository::party::{
    ContractRepository, CustomerRepository, UserRepository, VendorRepository,
};
use crate::repository::sale::{
    DeliveryRepository, PaymentRepository, RefundRepository, SaleRepository,
};
use crate::repository::staff::{CommissionRepository, ShiftRepository};
use crate::repository::stock::{InventoryRepository, PurchaseRepository};
use crate::repository::tenant::TenantRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/webpos.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool. Default: 5.
    pub max_connections: u32,

    /// Minimum number of connections to keep alive. Default: 1.
    pub min_connections: u32,

    /// Connection timeout duration. Default: 30 seconds.
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection. Default: 10 minutes.
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect. Default: true.
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// The database file is created on connect if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// Isolated per pool; a single connection so the in-memory database
    /// is shared by every query in the test.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1, // In-memory requires a single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }

    /// Creates a shared-cache in-memory configuration with several
    /// connections, for tests that need real statement interleaving.
    ///
    /// The database name is randomized so pools in concurrently running
    /// tests stay isolated from each other.
    pub fn shared_in_memory() -> Self {
        let name = uuid::Uuid::new_v4().simple().to_string();
        DbConfig {
            database_path: PathBuf::from(format!("file:{name}?mode=memory&cache=shared")),
            max_connections: 4,
            min_connections: 2, // Keep the shared database alive between queries
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle.
///
/// Owns the pool and hands out repositories. Tenant-owned data is only
/// reachable through [`Database::tenant`]; see [`TenantContext`].
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite: WAL mode, NORMAL synchronous, foreign keys on
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        // sqlite://path with mode=rwc creates the file if missing. URI
        // paths (file:...) already carry their own mode and cache params.
        let path = config.database_path.display().to_string();
        let connect_url = if path.starts_with("file:") || path == ":memory:" {
            format!("sqlite://{path}")
        } else {
            format!("sqlite://{path}?mode=rwc")
        };

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // SQLite ships with foreign keys off for backwards compatibility
            .foreign_keys(true)
            .create_if_missing(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Runs database migrations. Idempotent; called automatically by
    /// [`Database::new`] unless disabled in the config.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Returns a reference to the connection pool, for advanced queries
    /// not covered by repositories.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the tenant repository (unscoped; manages tenants themselves).
    pub fn tenants(&self) -> TenantRepository {
        TenantRepository::new(self.pool.clone())
    }

    /// Enters the scope of one tenant.
    ///
    /// All repositories for tenant-owned data hang off the returned
    /// context; there is no other way to reach them.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let ctx = db.tenant(&tenant.id);
    /// let low = ctx.inventories().list_below_minimum().await?;
    /// ```
    pub fn tenant(&self, tenant_id: impl Into<String>) -> TenantContext {
        TenantContext {
            pool: self.pool.clone(),
            tenant_id: tenant_id.into(),
        }
    }

    /// Closes the database connection pool. Call on shutdown; repository
    /// operations fail afterwards.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Tenant Context
// =============================================================================

/// A database handle bound to one tenant.
///
/// ## Why a Context Instead of tenant_id Parameters
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────┐
/// │  ❌ repo.get_product(tenant_id, product_id)                         │
/// │     Every call site must remember to pass the right tenant; one     │
/// │     forgotten filter leaks another tenant's rows.                   │
/// │                                                                     │
/// │  ✅ db.tenant(tenant_id).products().get(product_id)                 │
/// │     The scope is fixed once at the boundary. Repositories append    │
/// │     "AND tenant_id = ?" themselves; call sites cannot omit it.      │
/// └─────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone)]
pub struct TenantContext {
    pool: SqlitePool,
    tenant_id: String,
}

impl TenantContext {
    /// The tenant id this context is bound to.
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn stores(&self) -> StoreRepository {
        StoreRepository::new(self.pool.clone(), self.tenant_id.clone())
    }

    pub fn categories(&self) -> CategoryRepository {
        CategoryRepository::new(self.pool.clone(), self.tenant_id.clone())
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone(), self.tenant_id.clone())
    }

    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.pool.clone(), self.tenant_id.clone())
    }

    pub fn vendors(&self) -> VendorRepository {
        VendorRepository::new(self.pool.clone(), self.tenant_id.clone())
    }

    pub fn contracts(&self) -> ContractRepository {
        ContractRepository::new(self.pool.clone(), self.tenant_id.clone())
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone(), self.tenant_id.clone())
    }

    pub fn services(&self) -> ServiceRepository {
        ServiceRepository::new(self.pool.clone(), self.tenant_id.clone())
    }

    pub fn purchases(&self) -> PurchaseRepository {
        PurchaseRepository::new(self.pool.clone(), self.tenant_id.clone())
    }

    pub fn inventories(&self) -> InventoryRepository {
        InventoryRepository::new(self.pool.clone(), self.tenant_id.clone())
    }

    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone(), self.tenant_id.clone())
    }

    pub fn payments(&self) -> PaymentRepository {
        PaymentRepository::new(self.pool.clone(), self.tenant_id.clone())
    }

    pub fn refunds(&self) -> RefundRepository {
        RefundRepository::new(self.pool.clone(), self.tenant_id.clone())
    }

    pub fn deliveries(&self) -> DeliveryRepository {
        DeliveryRepository::new(self.pool.clone(), self.tenant_id.clone())
    }

    pub fn gift_cards(&self) -> GiftCardRepository {
        GiftCardRepository::new(self.pool.clone(), self.tenant_id.clone())
    }

    pub fn promotions(&self) -> PromotionRepository {
        PromotionRepository::new(self.pool.clone(), self.tenant_id.clone())
    }

    pub fn loyalty_points(&self) -> LoyaltyRepository {
        LoyaltyRepository::new(self.pool.clone(), self.tenant_id.clone())
    }

    pub fn taxes(&self) -> TaxRepository {
        TaxRepository::new(self.pool.clone(), self.tenant_id.clone())
    }

    pub fn journal(&self) -> JournalRepository {
        JournalRepository::new(self.pool.clone(), self.tenant_id.clone())
    }

    pub fn kpis(&self) -> KpiRepository {
        KpiRepository::new(self.pool.clone(), self.tenant_id.clone())
    }

    pub fn shifts(&self) -> ShiftRepository {
        ShiftRepository::new(self.pool.clone(), self.tenant_id.clone())
    }

    pub fn commissions(&self) -> CommissionRepository {
        CommissionRepository::new(self.pool.clone(), self.tenant_id.clone())
    }

    pub fn action_logs(&self) -> ActionLogRepository {
        ActionLogRepository::new(self.pool.clone(), self.tenant_id.clone())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Party Repositories
//!
//! Users, customers, vendors and contracts, all scoped to one tenant.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use webpos_core::{Contract, Customer, Role, User, Vendor};

// =============================================================================
// Users
// =============================================================================

const USER_COLUMNS: &str = "id, tenant_id, username, email, role, profile_picture, \
                            is_active, last_login, created_at";

/// Repository for a tenant's user accounts.
///
/// Credentials live in an external identity component; this table only
/// records who exists and what role they hold.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
    tenant_id: String,
}

impl UserRepository {
    pub fn new(pool: SqlitePool, tenant_id: String) -> Self {
        UserRepository { pool, tenant_id }
    }

    /// Inserts a new user. Usernames are unique per tenant.
    pub async fn create(&self, user: &User) -> DbResult<()> {
        debug!(id = %user.id, username = %user.username, "Creating user");

        sqlx::query(
            "INSERT INTO users (id, tenant_id, username, email, role, profile_picture, \
             is_active, last_login, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&self.tenant_id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.role)
        .bind(&user.profile_picture)
        .bind(user.is_active)
        .bind(user.last_login)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a user by id, within this tenant only.
    pub async fn get(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ? AND tenant_id = ?"
        ))
        .bind(id)
        .bind(&self.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by username.
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ? AND tenant_id = ?"
        ))
        .bind(username)
        .bind(&self.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Lists the tenant's users by username.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE tenant_id = ? ORDER BY username"
        ))
        .bind(&self.tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Changes a user's role.
    pub async fn set_role(&self, id: &str, role: Role) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE users SET role = ? WHERE id = ? AND tenant_id = ?")
                .bind(role)
                .bind(id)
                .bind(&self.tenant_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    /// Activates or deactivates a user account.
    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE users SET is_active = ? WHERE id = ? AND tenant_id = ?")
                .bind(active)
                .bind(id)
                .bind(&self.tenant_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    /// Records a login timestamp; called by the identity component.
    pub async fn touch_last_login(&self, id: &str, at: DateTime<Utc>) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE users SET last_login = ? WHERE id = ? AND tenant_id = ?")
                .bind(at)
                .bind(id)
                .bind(&self.tenant_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    /// Deletes a user. Historical records pointing at the user (sales,
    /// payments, inventory attribution) survive with the reference nulled.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ? AND tenant_id = ?")
            .bind(id)
            .bind(&self.tenant_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }
}

// =============================================================================
// Customers
// =============================================================================

const CUSTOMER_COLUMNS: &str = "id, tenant_id, user_id, name, email, phone, address, created_at";

/// Repository for a tenant's customers.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
    tenant_id: String,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool, tenant_id: String) -> Self {
        CustomerRepository { pool, tenant_id }
    }

    /// Inserts a new customer.
    pub async fn create(&self, customer: &Customer) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO customers (id, tenant_id, user_id, name, email, phone, address, \
             created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&customer.id)
        .bind(&self.tenant_id)
        .bind(&customer.user_id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a customer by id, within this tenant only.
    pub async fn get(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ? AND tenant_id = ?"
        ))
        .bind(id)
        .bind(&self.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists the tenant's customers by name.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE tenant_id = ? ORDER BY name"
        ))
        .bind(&self.tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Updates a customer's contact details.
    pub async fn update(&self, customer: &Customer) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE customers SET name = ?, email = ?, phone = ?, address = ? \
             WHERE id = ? AND tenant_id = ?",
        )
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(&customer.id)
        .bind(&self.tenant_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", &customer.id));
        }

        Ok(())
    }

    /// Deletes a customer. Their sales survive with customer_id nulled.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ? AND tenant_id = ?")
            .bind(id)
            .bind(&self.tenant_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }
}

// =============================================================================
// Vendors
// =============================================================================

const VENDOR_COLUMNS: &str =
    "id, tenant_id, name, contact_person, phone, email, address, created_at";

/// Repository for a tenant's vendors (suppliers).
#[derive(Debug, Clone)]
pub struct VendorRepository {
    pool: SqlitePool,
    tenant_id: String,
}

impl VendorRepository {
    pub fn new(pool: SqlitePool, tenant_id: String) -> Self {
        VendorRepository { pool, tenant_id }
    }

    /// Inserts a new vendor.
    pub async fn create(&self, vendor: &Vendor) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO vendors (id, tenant_id, name, contact_person, phone, email, \
             address, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&vendor.id)
        .bind(&self.tenant_id)
        .bind(&vendor.name)
        .bind(&vendor.contact_person)
        .bind(&vendor.phone)
        .bind(&vendor.email)
        .bind(&vendor.address)
        .bind(vendor.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a vendor by id, within this tenant only.
    pub async fn get(&self, id: &str) -> DbResult<Option<Vendor>> {
        let vendor = sqlx::query_as::<_, Vendor>(&format!(
            "SELECT {VENDOR_COLUMNS} FROM vendors WHERE id = ? AND tenant_id = ?"
        ))
        .bind(id)
        .bind(&self.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vendor)
    }

    /// Lists the tenant's vendors by name.
    pub async fn list(&self) -> DbResult<Vec<Vendor>> {
        let vendors = sqlx::query_as::<_, Vendor>(&format!(
            "SELECT {VENDOR_COLUMNS} FROM vendors WHERE tenant_id = ? ORDER BY name"
        ))
        .bind(&self.tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(vendors)
    }

    /// Updates a vendor's contact details.
    pub async fn update(&self, vendor: &Vendor) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE vendors SET name = ?, contact_person = ?, phone = ?, email = ?, \
             address = ? WHERE id = ? AND tenant_id = ?",
        )
        .bind(&vendor.name)
        .bind(&vendor.contact_person)
        .bind(&vendor.phone)
        .bind(&vendor.email)
        .bind(&vendor.address)
        .bind(&vendor.id)
        .bind(&self.tenant_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Vendor", &vendor.id));
        }

        Ok(())
    }

    /// Deletes a vendor and, through CASCADE, its purchase records.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM vendors WHERE id = ? AND tenant_id = ?")
            .bind(id)
            .bind(&self.tenant_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Vendor", id));
        }

        Ok(())
    }
}

// =============================================================================
// Contracts
// =============================================================================

const CONTRACT_COLUMNS: &str = "id, tenant_id, user_id, contract_file, kind, start_date, \
                                end_date, is_active, created_at";

/// Repository for a tenant's contracts.
#[derive(Debug, Clone)]
pub struct ContractRepository {
    pool: SqlitePool,
    tenant_id: String,
}

impl ContractRepository {
    pub fn new(pool: SqlitePool, tenant_id: String) -> Self {
        ContractRepository { pool, tenant_id }
    }

    /// Inserts a new contract.
    pub async fn create(&self, contract: &Contract) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO contracts (id, tenant_id, user_id, contract_file, kind, \
             start_date, end_date, is_active, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&contract.id)
        .bind(&self.tenant_id)
        .bind(&contract.user_id)
        .bind(&contract.contract_file)
        .bind(contract.kind)
        .bind(contract.start_date)
        .bind(contract.end_date)
        .bind(contract.is_active)
        .bind(contract.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a contract by id, within this tenant only.
    pub async fn get(&self, id: &str) -> DbResult<Option<Contract>> {
        let contract = sqlx::query_as::<_, Contract>(&format!(
            "SELECT {CONTRACT_COLUMNS} FROM contracts WHERE id = ? AND tenant_id = ?"
        ))
        .bind(id)
        .bind(&self.tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(contract)
    }

    /// Lists contracts for one user, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Contract>> {
        let contracts = sqlx::query_as::<_, Contract>(&format!(
            "SELECT {CONTRACT_COLUMNS} FROM contracts \
             WHERE user_id = ? AND tenant_id = ? ORDER BY start_date DESC"
        ))
        .bind(user_id)
        .bind(&self.tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(contracts)
    }

    /// Lists contracts in force on `date`: active, started, not yet ended.
    pub async fn list_current(&self, date: NaiveDate) -> DbResult<Vec<Contract>> {
        let contracts = sqlx::query_as::<_, Contract>(&format!(
            "SELECT {CONTRACT_COLUMNS} FROM contracts \
             WHERE tenant_id = ? AND is_active = 1 AND start_date <= ? \
             AND (end_date IS NULL OR end_date >= ?) \
             ORDER BY start_date DESC"
        ))
        .bind(&self.tenant_id)
        .bind(date)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(contracts)
    }

    /// Marks a contract inactive without deleting the record.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE contracts SET is_active = 0 WHERE id = ? AND tenant_id = ?")
                .bind(id)
                .bind(&self.tenant_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Contract", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

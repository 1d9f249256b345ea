//! Database operations for the storefront `PostgreSQL` database.
//!
//! # Schema: `store`
//!
//! - `product` - Catalog (read-only to shoppers, seeded by `ss-cli seed catalog`)
//! - `one_time_code` - Email login codes
//! - `customer_order` - Placed orders (`order_number` is unique)
//! - `order_item` - Line items, cascade-deleted with their order
//!
//! Sessions live in the `tower_sessions` schema managed by
//! `tower-sessions-sqlx-store`.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p sneaker-store-cli -- migrate
//! ```
//!
//! # Store traits
//!
//! Services talk to [`OneTimeCodeStore`], [`OrderStore`] and [`ProductStore`]
//! rather than to the pool directly, so checkout and login logic can run
//! against the in-memory stores in [`memory`] under test.

pub mod codes;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod orders;
pub mod products;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use sneaker_store_core::{Email, LoginCode, OneTimeCodeId, OrderNumber};

use crate::models::{NewOrder, NewProduct, OneTimeCode, Order, OrderSummary, Product, ProductFilter};

pub use codes::OneTimeCodeRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;

/// Errors returned by the store implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested row does not exist.
    #[error("not found")]
    NotFound,

    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored value failed domain validation.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Map a unique violation to [`RepositoryError::Conflict`].
pub(crate) fn conflict_or_database(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}

/// Persistence for one-time login codes.
#[async_trait]
pub trait OneTimeCodeStore: Send + Sync {
    /// Delete every code for `email`, then store `code` as its only,
    /// unverified code.
    async fn replace(
        &self,
        email: &Email,
        code: &LoginCode,
        issued_at: DateTime<Utc>,
    ) -> Result<OneTimeCode, RepositoryError>;

    /// Find the unverified code matching `(email, code)` exactly.
    async fn find_unverified(
        &self,
        email: &Email,
        code: &LoginCode,
    ) -> Result<Option<OneTimeCode>, RepositoryError>;

    /// Flip `verified` from false to true.
    ///
    /// Returns `false` when the row was already verified (or is gone), which
    /// means a concurrent verification won.
    async fn mark_verified(&self, id: OneTimeCodeId) -> Result<bool, RepositoryError>;

    /// Delete verified codes and codes issued before `issued_before`.
    async fn purge_stale(&self, issued_before: DateTime<Utc>) -> Result<u64, RepositoryError>;
}

/// Persistence for placed orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert the order and all of its items atomically.
    async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError>;

    /// Load one order with its items.
    async fn get_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, RepositoryError>;

    /// Most recent orders first, optionally for one shopper.
    async fn list_recent(
        &self,
        email: Option<&Email>,
        limit: u32,
    ) -> Result<Vec<OrderSummary>, RepositoryError>;
}

/// Read access to the catalog, plus the insert used by seeding.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Products matching `filter`, in catalog order.
    async fn list(&self, filter: ProductFilter) -> Result<Vec<Product>, RepositoryError>;

    /// Number of products in the catalog.
    async fn count(&self) -> Result<u64, RepositoryError>;

    /// Add a product.
    async fn insert(&self, product: &NewProduct) -> Result<Product, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

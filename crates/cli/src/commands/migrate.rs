//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! ss-cli migrate
//! ```
//!
//! Runs the `store` schema migrations from `crates/storefront/migrations/`,
//! then creates the session table used by `tower-sessions-sqlx-store`.

use tower_sessions_sqlx_store::PostgresStore;

use super::{CliError, connect};

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running storefront migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Creating session table...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}

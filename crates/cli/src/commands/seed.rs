//! Seed the catalog with the sample sneakers.

use sneaker_store_storefront::db::ProductRepository;
use sneaker_store_storefront::services::catalog::seed_if_empty;

use super::{CliError, connect};

/// Insert the sample sneakers unless the catalog already has products.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn catalog() -> Result<(), CliError> {
    let pool = connect().await?;
    let products = ProductRepository::new(pool);

    let inserted = seed_if_empty(&products).await?;
    if inserted == 0 {
        tracing::info!("Catalog already has products, nothing to seed");
    } else {
        tracing::info!(inserted, "Catalog seeded");
    }
    Ok(())
}

//! Login code maintenance.

use chrono::{Duration, Utc};

use sneaker_store_storefront::db::{OneTimeCodeRepository, OneTimeCodeStore};

use super::{CliError, connect};

/// Delete verified codes and codes issued more than `older_than_minutes` ago.
///
/// # Errors
///
/// Returns an error if the cutoff is negative or the delete fails.
pub async fn purge(older_than_minutes: i64) -> Result<(), CliError> {
    if older_than_minutes < 0 {
        return Err(CliError::InvalidArgument(format!(
            "--older-than-minutes must not be negative, got {older_than_minutes}"
        )));
    }

    let pool = connect().await?;
    let codes = OneTimeCodeRepository::new(pool);

    let cutoff = Utc::now() - Duration::minutes(older_than_minutes);
    let deleted = codes.purge_stale(cutoff).await?;

    tracing::info!(deleted, %cutoff, "Purged login codes");
    Ok(())
}

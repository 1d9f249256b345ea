//! Email one-time-code authentication.
//!
//! A login is two requests: [`CodeIssuer::issue`] stores a fresh code for the
//! mailbox and mails it, then [`CodeIssuer::verify`] checks what the shopper
//! typed. Session bookkeeping around both steps stays in the route handlers.

mod error;

pub use error::AuthError;

use chrono::{DateTime, Utc};
use tracing::instrument;

use sneaker_store_core::{Email, LoginCode};

use crate::db::OneTimeCodeStore;
use crate::models::OneTimeCode;
use crate::services::email::Mailer;

/// Issues and verifies one-time login codes.
pub struct CodeIssuer<'a> {
    codes: &'a dyn OneTimeCodeStore,
    mailer: &'a dyn Mailer,
}

impl<'a> CodeIssuer<'a> {
    /// Create a new code issuer.
    #[must_use]
    pub const fn new(codes: &'a dyn OneTimeCodeStore, mailer: &'a dyn Mailer) -> Self {
        Self { codes, mailer }
    }

    /// Replace any codes for `email` with a fresh one and mail it.
    ///
    /// The code is stored before sending and is not removed if sending
    /// fails; the shopper is simply asked to request another.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the code cannot be stored.
    /// Returns `AuthError::Delivery` if the mailer fails.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn issue(&self, email: &Email) -> Result<OneTimeCode, AuthError> {
        let code = LoginCode::generate();
        let record = self.codes.replace(email, &code, Utc::now()).await?;

        self.mailer.send_login_code(email, &code).await?;

        tracing::info!("Login code issued");
        Ok(record)
    }

    /// Check a submitted code against the current time.
    ///
    /// # Errors
    ///
    /// See [`CodeIssuer::verify_at`].
    pub async fn verify(&self, email: &Email, code: &LoginCode) -> Result<OneTimeCode, AuthError> {
        self.verify_at(email, code, Utc::now()).await
    }

    /// Check a submitted code as of `now`.
    ///
    /// Expired codes are left in place, so resubmitting one keeps failing
    /// with `CodeExpired`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::CodeNotFound` if no unverified code matches, or if
    /// a concurrent verification of the same code won.
    /// Returns `AuthError::CodeExpired` if the code is over ten minutes old.
    /// Returns `AuthError::Repository` if the store fails.
    #[instrument(skip(self, code), fields(email = %email))]
    pub async fn verify_at(
        &self,
        email: &Email,
        code: &LoginCode,
        now: DateTime<Utc>,
    ) -> Result<OneTimeCode, AuthError> {
        let mut record = self
            .codes
            .find_unverified(email, code)
            .await?
            .ok_or(AuthError::CodeNotFound)?;

        if record.is_expired_at(now) {
            return Err(AuthError::CodeExpired);
        }

        if !self.codes.mark_verified(record.id).await? {
            tracing::warn!("Login code verified concurrently");
            return Err(AuthError::CodeNotFound);
        }

        record.verified = true;
        tracing::info!("Login code verified");
        Ok(record)
    }
}

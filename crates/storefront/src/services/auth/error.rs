//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::email::MailerError;

/// Errors that can occur while issuing or verifying a login code.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No unverified code matches the submitted email and code.
    #[error("login code not found")]
    CodeNotFound,

    /// The code matched but is more than ten minutes old.
    #[error("login code expired")]
    CodeExpired,

    /// The code was stored but could not be mailed.
    #[error("failed to deliver login code: {0}")]
    Delivery(#[from] MailerError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_errors_convert() {
        let err = AuthError::from(RepositoryError::NotFound);
        assert!(matches!(err, AuthError::Repository(RepositoryError::NotFound)));
    }

    #[test]
    fn test_delivery_error_keeps_cause() {
        let err = AuthError::from(MailerError::Rejected("mailbox full".to_owned()));
        assert_eq!(
            err.to_string(),
            "failed to deliver login code: Delivery failed: mailbox full"
        );
    }
}

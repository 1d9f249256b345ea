//! One-time login code records.

use chrono::{DateTime, Duration, Utc};

use sneaker_store_core::{Email, LoginCode, OneTimeCodeId};

/// How long a code stays usable after it is issued.
pub const CODE_TTL_MINUTES: i64 = 10;

/// A stored login code.
#[derive(Debug, Clone)]
pub struct OneTimeCode {
    /// Database ID.
    pub id: OneTimeCodeId,
    /// Mailbox the code was sent to.
    pub email: Email,
    /// The six digits.
    pub code: LoginCode,
    /// When the code was issued.
    pub issued_at: DateTime<Utc>,
    /// Set once the code has been used to log in.
    pub verified: bool,
}

impl OneTimeCode {
    /// Whether the code is past its lifetime at `now`.
    ///
    /// A code is still valid at exactly [`CODE_TTL_MINUTES`] after issue.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now - self.issued_at > Duration::minutes(CODE_TTL_MINUTES)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn code_issued_at(issued_at: DateTime<Utc>) -> OneTimeCode {
        OneTimeCode {
            id: OneTimeCodeId::new(1),
            email: Email::parse("runner@example.com").unwrap(),
            code: LoginCode::parse("123456").unwrap(),
            issued_at,
            verified: false,
        }
    }

    #[test]
    fn test_expiry_boundary() {
        let issued = Utc::now();
        let code = code_issued_at(issued);

        assert!(!code.is_expired_at(issued));
        assert!(!code.is_expired_at(issued + Duration::minutes(10)));
        assert!(code.is_expired_at(issued + Duration::minutes(10) + Duration::seconds(1)));
    }
}

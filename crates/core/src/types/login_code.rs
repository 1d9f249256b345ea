//! Six-digit one-time login codes.

use core::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`LoginCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginCodeError {
    /// Wrong number of characters.
    #[error("login code must be exactly {expected} digits")]
    Length {
        /// Required length.
        expected: usize,
    },
    /// A non-digit character.
    #[error("login code must contain only digits")]
    NonDigit,
}

/// A one-time login code: exactly six ASCII digits, leading zeros allowed.
///
/// Codes are drawn uniformly from `000000..=999999`.
///
/// ```
/// use sneaker_store_core::LoginCode;
///
/// let code = LoginCode::generate();
/// assert_eq!(code.as_str().len(), 6);
///
/// assert!(LoginCode::parse(" 012345 ").is_ok());
/// assert!(LoginCode::parse("12345").is_err());
/// assert!(LoginCode::parse("12a456").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LoginCode(String);

impl LoginCode {
    /// Number of digits in a code.
    pub const LENGTH: usize = 6;

    /// Generate a fresh random code.
    #[must_use]
    pub fn generate() -> Self {
        let value: u32 = rand::rng().random_range(0..1_000_000);
        Self(format!("{value:06}"))
    }

    /// Parse a code submitted by a shopper. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`LoginCodeError`] if the input is not exactly six digits.
    pub fn parse(s: &str) -> Result<Self, LoginCodeError> {
        let trimmed = s.trim();
        if trimmed.len() != Self::LENGTH {
            return Err(LoginCodeError::Length {
                expected: Self::LENGTH,
            });
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(LoginCodeError::NonDigit);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The code digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Codes are credentials; keep them out of debug logs.
impl fmt::Debug for LoginCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LoginCode(******)")
    }
}

impl fmt::Display for LoginCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for LoginCode {
    type Error = LoginCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LoginCode> for String {
    fn from(code: LoginCode) -> Self {
        code.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_format() {
        for _ in 0..200 {
            let code = LoginCode::generate();
            assert_eq!(code.as_str().len(), LoginCode::LENGTH);
            assert!(code.as_str().bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn test_parse_keeps_leading_zeros() {
        assert_eq!(LoginCode::parse("000417").unwrap().as_str(), "000417");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(
            LoginCode::parse("1234567"),
            Err(LoginCodeError::Length { expected: 6 })
        );
        assert_eq!(LoginCode::parse("12 456"), Err(LoginCodeError::NonDigit));
        assert!(LoginCode::parse("١٢٣٤٥٦").is_err());
    }

    #[test]
    fn test_debug_is_redacted() {
        let code = LoginCode::parse("424242").unwrap();
        assert!(!format!("{code:?}").contains("424242"));
    }
}

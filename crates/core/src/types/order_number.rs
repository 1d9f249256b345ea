//! Human-readable order identifiers (`SNK` + 7 digits).

use core::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`OrderNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderNumberError {
    /// Missing the `SNK` prefix.
    #[error("order number must start with {prefix}")]
    Prefix {
        /// Required prefix.
        prefix: &'static str,
    },
    /// Suffix is not exactly seven digits.
    #[error("order number must end with {expected} digits")]
    Digits {
        /// Required digit count.
        expected: usize,
    },
}

/// The identifier printed on a placed order, e.g. `SNK0493817`.
///
/// Generation draws seven uniform random digits and performs no uniqueness
/// check; the `order_number` unique constraint in the database is what turns
/// a collision into a failed insert.
///
/// ```
/// use sneaker_store_core::OrderNumber;
///
/// let number = OrderNumber::generate();
/// assert!(number.as_str().starts_with("SNK"));
/// assert_eq!(number.as_str().len(), 10);
///
/// assert!(OrderNumber::parse("SNK0000001").is_ok());
/// assert!(OrderNumber::parse("ORD0000001").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Prefix shared by every order number.
    pub const PREFIX: &'static str = "SNK";

    /// Number of random digits after the prefix.
    pub const DIGITS: usize = 7;

    /// Generate a new order number.
    #[must_use]
    pub fn generate() -> Self {
        let value: u32 = rand::rng().random_range(0..10_000_000);
        Self(format!("{}{value:07}", Self::PREFIX))
    }

    /// Parse an order number, e.g. one typed into the CLI.
    ///
    /// # Errors
    ///
    /// Returns [`OrderNumberError`] if the prefix or digit suffix is wrong.
    pub fn parse(s: &str) -> Result<Self, OrderNumberError> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix(Self::PREFIX)
            .ok_or(OrderNumberError::Prefix {
                prefix: Self::PREFIX,
            })?;
        if digits.len() != Self::DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OrderNumberError::Digits {
                expected: Self::DIGITS,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The full identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for OrderNumber {
    type Err = OrderNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = OrderNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OrderNumber> for String {
    fn from(number: OrderNumber) -> Self {
        number.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_generated_numbers_match_pattern() {
        for _ in 0..500 {
            let number = OrderNumber::generate();
            let digits = number.as_str().strip_prefix("SNK").unwrap();
            assert_eq!(digits.len(), 7);
            assert!(digits.bytes().all(|b| b.is_ascii_digit()));
            assert_eq!(OrderNumber::parse(number.as_str()).unwrap(), number);
        }
    }

    #[test]
    fn test_generated_numbers_rarely_collide() {
        // 1000 draws from 10^7: expected collisions ~0.05.
        let numbers: HashSet<_> = (0..1000).map(|_| OrderNumber::generate()).collect();
        assert!(numbers.len() >= 998);
    }

    #[test]
    fn test_parse_rejects_bad_numbers() {
        assert_eq!(
            OrderNumber::parse("SNK123"),
            Err(OrderNumberError::Digits { expected: 7 })
        );
        assert_eq!(
            OrderNumber::parse("SNK12345678"),
            Err(OrderNumberError::Digits { expected: 7 })
        );
        assert_eq!(
            OrderNumber::parse("snk1234567"),
            Err(OrderNumberError::Prefix { prefix: "SNK" })
        );
        assert!(OrderNumber::parse("SNK12a4567").is_err());
    }
}

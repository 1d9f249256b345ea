//! Rupee amounts using decimal arithmetic.
//!
//! The store trades in a single currency (INR), so a price is just a
//! non-float decimal with rupee formatting. Summing prices never goes
//! through `f64`, and never panics: amounts arrive from shopper-supplied
//! carts, so addition is checked.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount in rupees.
///
/// Deserializes from either a JSON number (`45999`, `129.5`) or a numeric
/// string (`"45999.00"`), which is how carts built in the browser tend to
/// send prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Whole rupees, e.g. `Price::from_rupees(8999)`.
    #[must_use]
    pub fn from_rupees(rupees: i64) -> Self {
        Self(Decimal::from(rupees))
    }

    /// The underlying decimal.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// `self + rhs`, or `None` if the sum does not fit in a decimal.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Sum of `prices`, or `None` on overflow.
    #[must_use]
    pub fn checked_sum<I: IntoIterator<Item = Self>>(prices: I) -> Option<Self> {
        prices
            .into_iter()
            .try_fold(Self::ZERO, Self::checked_add)
    }

    /// Line total for `quantity` units.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{:.2}", self.0.round_dp(2))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_is_exact() {
        let prices: Vec<Price> = ["0.10", "0.20", "0.30"]
            .iter()
            .map(|s| Price::new(s.parse().unwrap()))
            .collect();
        let total = Price::checked_sum(prices).unwrap();
        assert_eq!(total, Price::new("0.60".parse().unwrap()));
    }

    #[test]
    fn test_sum_overflow_is_none() {
        let huge: Price = serde_json::from_str("7e28").unwrap();
        assert_eq!(huge.checked_add(huge), None);
        assert_eq!(Price::checked_sum([huge, Price::from_rupees(1), huge]), None);
        assert_eq!(Price::checked_sum([]), Some(Price::ZERO));
    }

    #[test]
    fn test_display_two_places() {
        assert_eq!(Price::from_rupees(45999).to_string(), "₹45999.00");
        assert_eq!(Price::new("129.5".parse().unwrap()).to_string(), "₹129.50");
    }

    #[test]
    fn test_deserialize_number_or_string() {
        let from_number: Price = serde_json::from_str("250").unwrap();
        let from_string: Price = serde_json::from_str("\"250.00\"").unwrap();
        assert_eq!(from_number, Price::from_rupees(250));
        assert_eq!(from_string, Price::from_rupees(250));
    }

    #[test]
    fn test_times() {
        assert_eq!(Price::from_rupees(100).times(3), Price::from_rupees(300));
    }
}

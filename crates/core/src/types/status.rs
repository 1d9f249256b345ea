//! Order lifecycle status and payment method enums.
//!
//! Both are stored as lowercase text in the database and in session state,
//! so `as_str`/`FromStr` are the canonical conversions.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Checkout creates every order as [`OrderStatus::Pending`]; nothing in the
/// storefront advances it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Database/text representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// How the shopper chose to pay.
///
/// No gateway is involved; the choice is recorded on the order as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Upi,
    Card,
    Netbanking,
    Wallet,
}

impl PaymentMethod {
    /// Every method, in the order the payment page lists them.
    pub const ALL: [Self; 4] = [Self::Upi, Self::Card, Self::Netbanking, Self::Wallet];

    /// Database/text representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Upi => "upi",
            Self::Card => "card",
            Self::Netbanking => "netbanking",
            Self::Wallet => "wallet",
        }
    }

    /// Label shown to shoppers.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Upi => "UPI",
            Self::Card => "Credit/Debit Card",
            Self::Netbanking => "Net Banking",
            Self::Wallet => "Wallet",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "upi" => Ok(Self::Upi),
            "card" => Ok(Self::Card),
            "netbanking" => Ok(Self::Netbanking),
            "wallet" => Ok(Self::Wallet),
            other => Err(format!("invalid payment method: {other}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_payment_method_text_roundtrip() {
        for method in PaymentMethod::ALL {
            assert_eq!(method.as_str().parse::<PaymentMethod>().unwrap(), method);
        }
        assert!("cash".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_payment_method_serde_matches_text() {
        let json = serde_json::to_string(&PaymentMethod::Netbanking).unwrap();
        assert_eq!(json, "\"netbanking\"");
    }

    #[test]
    fn test_order_status_parse() {
        assert_eq!("shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert!("lost".parse::<OrderStatus>().is_err());
    }
}

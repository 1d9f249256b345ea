//! Checkout fragments as they sit in the session.
//!
//! The browser posts the cart and the delivery address as free-form JSON and
//! the session keeps them verbatim. They are only given a shape when an order
//! is about to be placed, via [`CheckoutFragments::decode`].

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use sneaker_store_core::Price;

/// Brand recorded for cart entries that do not carry one.
pub const UNKNOWN_BRAND: &str = "Unknown";

fn unknown_brand() -> String {
    UNKNOWN_BRAND.to_owned()
}

/// One entry of the submitted cart.
///
/// Only `name`, `brand` and `price` are read; anything else the browser sends
/// (quantity, size, image) is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CartLine {
    pub name: String,
    #[serde(default = "unknown_brand", deserialize_with = "brand_or_unknown")]
    pub brand: String,
    pub price: Price,
}

/// `"brand": null` is treated the same as a missing brand.
fn brand_or_unknown<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(unknown_brand))
}

/// Where the order is delivered.
///
/// Every field defaults to an empty string when absent. Numbers are accepted
/// and kept as their decimal text, since address forms commonly submit the
/// pincode and phone as numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryAddress {
    #[serde(deserialize_with = "lenient_string")]
    pub first_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub last_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(deserialize_with = "lenient_string")]
    pub address: String,
    #[serde(deserialize_with = "lenient_string")]
    pub city: String,
    #[serde(deserialize_with = "lenient_string")]
    pub state: String,
    #[serde(deserialize_with = "lenient_string")]
    pub pincode: String,
    #[serde(deserialize_with = "lenient_string")]
    pub landmark: String,
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string, got {other}"
        ))),
    }
}

/// Why the stored fragments could not be given a shape.
#[derive(Debug, thiserror::Error)]
pub enum FragmentError {
    #[error("cart: {0}")]
    Cart(serde_json::Error),

    #[error("delivery address: {0}")]
    Address(serde_json::Error),

    #[error("delivery address is not a JSON object")]
    AddressNotObject,
}

/// The decoded cart and address for one checkout attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutFragments {
    /// Cart entries, in the order the shopper added them.
    pub cart: Vec<CartLine>,
    /// `None` when no address was stored or the stored document had no fields.
    pub address: Option<DeliveryAddress>,
}

impl CheckoutFragments {
    /// Decode the stored fragments, failing on the first malformed one.
    ///
    /// A missing cart reads as an empty list and a missing address as an
    /// empty document.
    ///
    /// # Errors
    ///
    /// Returns [`FragmentError`] if the cart is not a list of
    /// `{name, brand?, price}` entries or the address is not a JSON object of
    /// string-like fields.
    pub fn try_decode(cart: Option<Value>, address: Option<Value>) -> Result<Self, FragmentError> {
        let cart = match cart {
            None => Vec::new(),
            Some(value) => serde_json::from_value(value).map_err(FragmentError::Cart)?,
        };

        let address = match address {
            None => None,
            Some(Value::Object(map)) if map.is_empty() => None,
            Some(value @ Value::Object(_)) => {
                Some(serde_json::from_value(value).map_err(FragmentError::Address)?)
            }
            Some(_) => return Err(FragmentError::AddressNotObject),
        };

        Ok(Self { cart, address })
    }

    /// Decode the stored fragments, treating both as empty if either is
    /// malformed.
    #[must_use]
    pub fn decode(cart: Option<Value>, address: Option<Value>) -> Self {
        Self::try_decode(cart, address).unwrap_or_else(|e| {
            warn!(error = %e, "Discarding malformed checkout fragments");
            Self::default()
        })
    }

    /// Whether there is enough to place an order.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.cart.is_empty() && self.address.is_some()
    }

    /// Sum of the cart entry prices, or `None` if it overflows.
    #[must_use]
    pub fn total(&self) -> Option<Price> {
        Price::checked_sum(self.cart.iter().map(|line| line.price))
    }
}

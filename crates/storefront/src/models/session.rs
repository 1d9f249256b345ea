//! Typed access to per-shopper session state.
//!
//! Every value the storefront keeps between requests goes through
//! [`ShopperSession`]; handlers never touch raw session keys.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use serde::Serialize;
use serde_json::Value;
use tower_sessions::Session;
use tower_sessions::session::Error as SessionError;
use tracing::warn;

use sneaker_store_core::{Email, PaymentMethod, Price};

use super::checkout::CheckoutFragments;

/// Session keys.
pub mod session_keys {
    /// Email a login code was just sent to.
    pub const PENDING_LOGIN_EMAIL: &str = "pending_login_email";

    /// Email of the logged-in shopper.
    pub const AUTHENTICATED_EMAIL: &str = "authenticated_email";

    /// Set to `true` once a code has been verified.
    pub const IS_AUTHENTICATED: &str = "is_authenticated";

    /// Cart as submitted by the browser.
    pub const CART: &str = "cart";

    /// Cart total as submitted by the browser.
    pub const CART_TOTAL: &str = "cart_total";

    /// Delivery address as submitted by the browser.
    pub const DELIVERY_ADDRESS: &str = "delivery_address";

    /// Chosen payment method.
    pub const PAYMENT_METHOD: &str = "payment_method";
}

use session_keys as keys;

/// Placeholder shown by the debug view for absent keys.
const NOT_FOUND: &str = "Not found";

/// Raw view of the checkout fragments, for the debug endpoint.
#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub cart: Value,
    pub cart_total: Value,
    pub delivery_address: Value,
    pub payment_method: Value,
    pub user_email: Value,
}

/// A shopper's session.
#[derive(Debug, Clone)]
pub struct ShopperSession(Session);

impl ShopperSession {
    /// Wrap a raw session.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self(session)
    }

    // -------------------------------------------------------------------------
    // Login
    // -------------------------------------------------------------------------

    /// Remember which mailbox a code was sent to.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn set_pending_email(&self, email: &Email) -> Result<(), SessionError> {
        self.0.insert(keys::PENDING_LOGIN_EMAIL, email).await
    }

    /// The mailbox awaiting code verification, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn pending_email(&self) -> Result<Option<Email>, SessionError> {
        self.lenient_get(keys::PENDING_LOGIN_EMAIL).await
    }

    /// Record a successful login.
    ///
    /// The session ID is rotated first so a pre-login ID cannot be reused.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn mark_authenticated(&self, email: &Email) -> Result<(), SessionError> {
        self.0.cycle_id().await?;
        self.0.insert(keys::AUTHENTICATED_EMAIL, email).await?;
        self.0.insert(keys::IS_AUTHENTICATED, true).await?;
        self.0.remove_value(keys::PENDING_LOGIN_EMAIL).await?;
        Ok(())
    }

    /// Whether the shopper has verified a code in this session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn is_authenticated(&self) -> Result<bool, SessionError> {
        Ok(self
            .lenient_get::<bool>(keys::IS_AUTHENTICATED)
            .await?
            .unwrap_or(false))
    }

    /// Email of the logged-in shopper.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn authenticated_email(&self) -> Result<Option<Email>, SessionError> {
        self.lenient_get(keys::AUTHENTICATED_EMAIL).await
    }

    // -------------------------------------------------------------------------
    // Checkout fragments
    // -------------------------------------------------------------------------

    /// Store the cart verbatim along with its total, replacing any previous cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn store_cart(&self, cart: Value, total: Price) -> Result<(), SessionError> {
        self.0.insert(keys::CART, cart).await?;
        self.0.insert(keys::CART_TOTAL, total).await
    }

    /// Store the delivery address verbatim, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn store_address(&self, address: Value) -> Result<(), SessionError> {
        self.0.insert(keys::DELIVERY_ADDRESS, address).await
    }

    /// Store the chosen payment method.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn store_payment_method(&self, method: PaymentMethod) -> Result<(), SessionError> {
        self.0.insert(keys::PAYMENT_METHOD, method).await
    }

    /// The chosen payment method, if one was stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn payment_method(&self) -> Result<Option<PaymentMethod>, SessionError> {
        self.lenient_get(keys::PAYMENT_METHOD).await
    }

    /// Decode the stored cart and address.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails. Malformed fragments are
    /// not an error; see [`CheckoutFragments::decode`].
    pub async fn checkout_fragments(&self) -> Result<CheckoutFragments, SessionError> {
        let cart = self.0.get::<Value>(keys::CART).await?;
        let address = self.0.get::<Value>(keys::DELIVERY_ADDRESS).await?;
        Ok(CheckoutFragments::decode(cart, address))
    }

    /// Drop the cart, its total, the address and the payment method.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn clear_checkout(&self) -> Result<(), SessionError> {
        for key in [
            keys::CART,
            keys::CART_TOTAL,
            keys::DELIVERY_ADDRESS,
            keys::PAYMENT_METHOD,
        ] {
            self.0.remove_value(key).await?;
        }
        Ok(())
    }

    /// Raw fragment values, with `"Not found"` for absent keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        Ok(SessionSnapshot {
            cart: self.raw(keys::CART).await?,
            cart_total: self.raw(keys::CART_TOTAL).await?,
            delivery_address: self.raw(keys::DELIVERY_ADDRESS).await?,
            payment_method: self.raw(keys::PAYMENT_METHOD).await?,
            user_email: self.raw(keys::AUTHENTICATED_EMAIL).await?,
        })
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Delete the session entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn flush(&self) -> Result<(), SessionError> {
        self.0.flush().await
    }

    async fn raw(&self, key: &str) -> Result<Value, SessionError> {
        Ok(self
            .0
            .get::<Value>(key)
            .await?
            .unwrap_or_else(|| Value::String(NOT_FOUND.to_owned())))
    }

    /// Read a typed value, treating an undecodable value as absent.
    async fn lenient_get<T: serde::de::DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, SessionError> {
        match self.0.get::<T>(key).await {
            Ok(value) => Ok(value),
            Err(SessionError::SerdeJson(e)) => {
                warn!(key, error = %e, "Ignoring undecodable session value");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl<S> FromRequestParts<S> for ShopperSession
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Session::from_request_parts(parts, state).await.map(Self)
    }
}

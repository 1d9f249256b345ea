//! Order materialization.
//!
//! Turns the cart, address and payment method a shopper has accumulated in
//! their session into a stored order. Everything up to this point lives only
//! in the session; nothing is written to the database until the success page
//! asks for the order.

use thiserror::Error;
use tower_sessions::session::Error as SessionError;
use tracing::instrument;

use sneaker_store_core::{Email, OrderNumber, OrderStatus, PaymentMethod};

use crate::db::{OrderStore, RepositoryError};
use crate::models::{CheckoutFragments, NewOrder, NewOrderItem, Order, ShopperSession};

/// Quantity recorded on every line item. The cart's own quantities are ignored.
pub const LINE_QUANTITY: u32 = 1;

/// Errors that can occur while placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The order could not be stored. Nothing was written.
    #[error("failed to store order: {0}")]
    Persistence(#[from] RepositoryError),

    /// The session could not be read.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// The cart prices add up to more than an amount can hold.
    #[error("cart total is out of range")]
    TotalOutOfRange,
}

/// Build the order to insert from decoded fragments.
///
/// Returns `Ok(None)` when the cart or address is empty.
///
/// # Errors
///
/// Returns `CheckoutError::TotalOutOfRange` if the cart total overflows.
pub fn build_order(
    fragments: CheckoutFragments,
    email: Email,
    payment_method: PaymentMethod,
    number: OrderNumber,
) -> Result<Option<NewOrder>, CheckoutError> {
    let total_amount = fragments.total().ok_or(CheckoutError::TotalOutOfRange)?;
    let CheckoutFragments { cart, address } = fragments;
    let Some(address) = address else {
        return Ok(None);
    };
    if cart.is_empty() {
        return Ok(None);
    }

    let items = cart
        .into_iter()
        .map(|line| NewOrderItem {
            product_name: line.name,
            brand: line.brand,
            unit_price: line.price,
            quantity: LINE_QUANTITY,
        })
        .collect();

    Ok(Some(NewOrder {
        number,
        email,
        address,
        payment_method,
        payment_status: true,
        transaction_id: None,
        status: OrderStatus::Pending,
        total_amount,
        items,
    }))
}

/// Places orders from session fragments.
pub struct OrderMaterializer<'a> {
    orders: &'a dyn OrderStore,
}

impl<'a> OrderMaterializer<'a> {
    /// Create a new materializer.
    #[must_use]
    pub const fn new(orders: &'a dyn OrderStore) -> Self {
        Self { orders }
    }

    /// Place an order from the session, if it holds a complete checkout.
    ///
    /// Returns `Ok(None)` when there is nothing to place: no authenticated
    /// email, an empty or malformed cart, or an empty or malformed address.
    /// On success the checkout fragments are removed from the session, so a
    /// second call returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Persistence` if the order cannot be stored; the
    /// session fragments are left intact so the shopper can retry.
    /// Returns `CheckoutError::Session` if the session cannot be read.
    /// Returns `CheckoutError::TotalOutOfRange` if the cart prices overflow
    /// when summed; nothing is written and the fragments are left intact.
    #[instrument(skip_all)]
    pub async fn materialize(&self, session: &ShopperSession) -> Result<Option<Order>, CheckoutError> {
        let Some(email) = session.authenticated_email().await? else {
            tracing::debug!("No authenticated email; nothing to place");
            return Ok(None);
        };

        let fragments = session.checkout_fragments().await?;
        if !fragments.is_complete() {
            tracing::debug!(
                cart_items = fragments.cart.len(),
                has_address = fragments.address.is_some(),
                "Checkout incomplete; nothing to place"
            );
            return Ok(None);
        }

        let payment_method = session.payment_method().await?.unwrap_or_default();
        let Some(new_order) =
            build_order(fragments, email, payment_method, OrderNumber::generate())?
        else {
            return Ok(None);
        };

        let order = self.orders.create(&new_order).await.inspect_err(|e| {
            tracing::error!(error = %e, order_number = %new_order.number, "Failed to store order");
        })?;

        tracing::info!(
            order_number = %order.number,
            total = %order.total_amount,
            items = order.items.len(),
            "Order placed"
        );

        if let Err(e) = session.clear_checkout().await {
            tracing::warn!(error = %e, order_number = %order.number, "Failed to clear checkout fragments");
        }

        Ok(Some(order))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use tower_sessions::{MemoryStore, Session};

    use sneaker_store_core::Price;

    use super::*;
    use crate::db::memory::MemoryOrderStore;

    async fn logged_in_session() -> ShopperSession {
        let session =
            ShopperSession::new(Session::new(None, Arc::new(MemoryStore::default()), None));
        session
            .mark_authenticated(&Email::parse("runner@example.com").unwrap())
            .await
            .unwrap();
        session
    }

    async fn fill_checkout(session: &ShopperSession) {
        session
            .store_cart(
                json!([
                    {"name": "A", "brand": "Nike", "price": 100, "quantity": 4},
                    {"name": "B", "price": 250}
                ]),
                Price::from_rupees(350),
            )
            .await
            .unwrap();
        session
            .store_address(json!({"firstName": "Asha", "phone": "9800000000", "city": "Pune"}))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_places_order_from_fragments() {
        let orders = MemoryOrderStore::new();
        let session = logged_in_session().await;
        fill_checkout(&session).await;
        session
            .store_payment_method(PaymentMethod::Wallet)
            .await
            .unwrap();

        let order = OrderMaterializer::new(&orders)
            .materialize(&session)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(order.total_amount, Price::from_rupees(350));
        assert_eq!(order.items.len(), 2);
        assert!(order.items.iter().all(|i| i.quantity == 1));
        assert_eq!(order.items[1].brand, "Unknown");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_method, PaymentMethod::Wallet);
        assert!(order.payment_status);
        assert_eq!(order.transaction_id, None);
        assert_eq!(order.address.phone, "9800000000");
        assert_eq!(order.address.last_name, "");
        assert_eq!(order.email.as_str(), "runner@example.com");
        assert_eq!(orders.all().len(), 1);
    }

    #[tokio::test]
    async fn test_second_materialize_places_nothing() {
        let orders = MemoryOrderStore::new();
        let session = logged_in_session().await;
        fill_checkout(&session).await;
        let materializer = OrderMaterializer::new(&orders);

        assert!(materializer.materialize(&session).await.unwrap().is_some());
        assert!(materializer.materialize(&session).await.unwrap().is_none());
        assert_eq!(orders.all().len(), 1);
        assert!(session.is_authenticated().await.unwrap());
    }

    #[tokio::test]
    async fn test_payment_method_defaults_to_upi() {
        let orders = MemoryOrderStore::new();
        let session = logged_in_session().await;
        fill_checkout(&session).await;

        let order = OrderMaterializer::new(&orders)
            .materialize(&session)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.payment_method, PaymentMethod::Upi);
    }

    #[tokio::test]
    async fn test_empty_cart_places_nothing() {
        let orders = MemoryOrderStore::new();
        let session = logged_in_session().await;
        session
            .store_address(json!({"firstName": "Asha"}))
            .await
            .unwrap();

        let result = OrderMaterializer::new(&orders)
            .materialize(&session)
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(orders.all().is_empty());
    }

    #[tokio::test]
    async fn test_without_login_places_nothing() {
        let orders = MemoryOrderStore::new();
        let session =
            ShopperSession::new(Session::new(None, Arc::new(MemoryStore::default()), None));
        fill_checkout(&session).await;

        let result = OrderMaterializer::new(&orders)
            .materialize(&session)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_persistence_failure_keeps_fragments() {
        let orders = MemoryOrderStore::new();
        orders.fail_next_create();
        let session = logged_in_session().await;
        fill_checkout(&session).await;
        let materializer = OrderMaterializer::new(&orders);

        let result = materializer.materialize(&session).await;
        assert!(matches!(result, Err(CheckoutError::Persistence(_))));
        assert!(orders.all().is_empty());
        assert_eq!(session.checkout_fragments().await.unwrap().cart.len(), 2);

        // Fragments survived, so a retry goes through.
        assert!(materializer.materialize(&session).await.unwrap().is_some());
    }

    #[test]
    fn test_build_order_requires_address() {
        let fragments = CheckoutFragments::decode(Some(json!([{"name": "A", "price": 1}])), None);
        let order = build_order(
            fragments,
            Email::parse("runner@example.com").unwrap(),
            PaymentMethod::Card,
            OrderNumber::generate(),
        );
        assert!(order.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_overflowing_cart_total_is_an_error_not_a_panic() {
        let orders = MemoryOrderStore::new();
        let session = logged_in_session().await;
        session
            .store_cart(
                json!([{"name": "A", "price": 7e28}, {"name": "B", "price": 7e28}]),
                Price::ZERO,
            )
            .await
            .unwrap();
        session
            .store_address(json!({"firstName": "Asha", "city": "Pune"}))
            .await
            .unwrap();

        let result = OrderMaterializer::new(&orders).materialize(&session).await;

        assert!(matches!(result, Err(CheckoutError::TotalOutOfRange)));
        assert!(orders.all().is_empty());
        assert_eq!(session.checkout_fragments().await.unwrap().cart.len(), 2);
    }
}

//! Placed orders.

use chrono::{DateTime, Utc};

use sneaker_store_core::{Email, OrderId, OrderItemId, OrderNumber, OrderStatus, PaymentMethod, Price};

use super::checkout::DeliveryAddress;

/// An order ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub number: OrderNumber,
    pub email: Email,
    pub address: DeliveryAddress,
    pub payment_method: PaymentMethod,
    /// Whether payment was taken. There is no gateway, so checkout records `true`.
    pub payment_status: bool,
    pub transaction_id: Option<String>,
    pub status: OrderStatus,
    pub total_amount: Price,
    pub items: Vec<NewOrderItem>,
}

/// A line item ready to be inserted, copied by value from the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_name: String,
    pub brand: String,
    pub unit_price: Price,
    pub quantity: u32,
}

/// A stored order with its items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub number: OrderNumber,
    pub order_date: DateTime<Utc>,
    pub email: Email,
    pub address: DeliveryAddress,
    pub payment_method: PaymentMethod,
    pub payment_status: bool,
    pub transaction_id: Option<String>,
    pub status: OrderStatus,
    pub total_amount: Price,
    pub items: Vec<OrderItem>,
}

/// A stored line item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_name: String,
    pub brand: String,
    pub unit_price: Price,
    pub quantity: u32,
}

impl OrderItem {
    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// One row of an order listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    pub number: OrderNumber,
    pub email: Email,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub total_amount: Price,
    pub item_count: u32,
}

impl From<&Order> for OrderSummary {
    fn from(order: &Order) -> Self {
        Self {
            number: order.number.clone(),
            email: order.email.clone(),
            order_date: order.order_date,
            status: order.status,
            payment_method: order.payment_method,
            total_amount: order.total_amount,
            item_count: u32::try_from(order.items.len()).unwrap_or(u32::MAX),
        }
    }
}

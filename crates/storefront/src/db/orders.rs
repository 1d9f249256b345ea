//! Order repository.
//!
//! An order and its items are written in one transaction; dropping the
//! transaction on any error rolls the whole order back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use sneaker_store_core::{
    Email, OrderId, OrderItemId, OrderNumber, OrderStatus, PaymentMethod, Price,
};

use super::{OrderStore, RepositoryError, conflict_or_database};
use crate::models::{DeliveryAddress, NewOrder, Order, OrderItem, OrderSummary};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    order_number: String,
    order_date: DateTime<Utc>,
    status: String,
    total_amount: Decimal,
    user_email: String,
    user_phone: String,
    first_name: String,
    last_name: String,
    address: String,
    city: String,
    state: String,
    pincode: String,
    landmark: String,
    payment_method: String,
    payment_status: bool,
    transaction_id: Option<String>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    product_name: String,
    brand: String,
    price: Decimal,
    quantity: i32,
}

#[derive(sqlx::FromRow)]
struct OrderSummaryRow {
    order_number: String,
    user_email: String,
    order_date: DateTime<Utc>,
    status: String,
    payment_method: String,
    total_amount: Decimal,
    item_count: i64,
}

fn corrupt(what: &str, e: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::DataCorruption(format!("invalid {what} in database: {e}"))
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OrderItemId::new(row.id),
            product_name: row.product_name,
            brand: row.brand,
            unit_price: Price::new(row.price),
            quantity: u32::try_from(row.quantity).map_err(|e| corrupt("quantity", e))?,
        })
    }
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, RepositoryError> {
        Ok(Order {
            id: OrderId::new(self.id),
            number: OrderNumber::parse(&self.order_number).map_err(|e| corrupt("order number", e))?,
            order_date: self.order_date,
            email: Email::parse(&self.user_email).map_err(|e| corrupt("email", e))?,
            address: DeliveryAddress {
                first_name: self.first_name,
                last_name: self.last_name,
                phone: self.user_phone,
                address: self.address,
                city: self.city,
                state: self.state,
                pincode: self.pincode,
                landmark: self.landmark,
            },
            payment_method: self
                .payment_method
                .parse::<PaymentMethod>()
                .map_err(|e| corrupt("payment method", e))?,
            payment_status: self.payment_status,
            transaction_id: self.transaction_id,
            status: self
                .status
                .parse::<OrderStatus>()
                .map_err(|e| corrupt("status", e))?,
            total_amount: Price::new(self.total_amount),
            items,
        })
    }
}

impl TryFrom<OrderSummaryRow> for OrderSummary {
    type Error = RepositoryError;

    fn try_from(row: OrderSummaryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            number: OrderNumber::parse(&row.order_number).map_err(|e| corrupt("order number", e))?,
            email: Email::parse(&row.user_email).map_err(|e| corrupt("email", e))?,
            order_date: row.order_date,
            status: row
                .status
                .parse::<OrderStatus>()
                .map_err(|e| corrupt("status", e))?,
            payment_method: row
                .payment_method
                .parse::<PaymentMethod>()
                .map_err(|e| corrupt("payment method", e))?,
            total_amount: Price::new(row.total_amount),
            item_count: u32::try_from(row.item_count).map_err(|e| corrupt("item count", e))?,
        })
    }
}

/// `PostgreSQL`-backed [`OrderStore`].
#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn items_for(&self, order_id: i32) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows: Vec<OrderItemRow> = sqlx::query_as(
            r"
            SELECT id, product_name, brand, price, quantity
            FROM store.order_item
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OrderItem::try_from).collect()
    }
}

#[async_trait]
impl OrderStore for OrderRepository {
    async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (order_id, order_date): (i32, DateTime<Utc>) = sqlx::query_as(
            r"
            INSERT INTO store.customer_order (
                order_number, status, total_amount, user_email, user_phone,
                first_name, last_name, address, city, state, pincode, landmark,
                payment_method, payment_status, transaction_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING id, order_date
            ",
        )
        .bind(order.number.as_str())
        .bind(order.status.as_str())
        .bind(order.total_amount.amount())
        .bind(order.email.as_str())
        .bind(&order.address.phone)
        .bind(&order.address.first_name)
        .bind(&order.address.last_name)
        .bind(&order.address.address)
        .bind(&order.address.city)
        .bind(&order.address.state)
        .bind(&order.address.pincode)
        .bind(&order.address.landmark)
        .bind(order.payment_method.as_str())
        .bind(order.payment_status)
        .bind(order.transaction_id.as_deref())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_or_database(e, "order number"))?;

        let mut items = Vec::with_capacity(order.items.len());
        for item in &order.items {
            let quantity = i32::try_from(item.quantity).map_err(|_| {
                RepositoryError::DataCorruption(format!("quantity {} out of range", item.quantity))
            })?;

            let (item_id,): (i32,) = sqlx::query_as(
                r"
                INSERT INTO store.order_item (order_id, product_name, brand, price, quantity)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id
                ",
            )
            .bind(order_id)
            .bind(&item.product_name)
            .bind(&item.brand)
            .bind(item.unit_price.amount())
            .bind(quantity)
            .fetch_one(&mut *tx)
            .await?;

            items.push(OrderItem {
                id: OrderItemId::new(item_id),
                product_name: item.product_name.clone(),
                brand: item.brand.clone(),
                unit_price: item.unit_price,
                quantity: item.quantity,
            });
        }

        tx.commit().await?;

        Ok(Order {
            id: OrderId::new(order_id),
            number: order.number.clone(),
            order_date,
            email: order.email.clone(),
            address: order.address.clone(),
            payment_method: order.payment_method,
            payment_status: order.payment_status,
            transaction_id: order.transaction_id.clone(),
            status: order.status,
            total_amount: order.total_amount,
            items,
        })
    }

    async fn get_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(
            r"
            SELECT id, order_number, order_date, status, total_amount,
                   user_email, user_phone, first_name, last_name, address,
                   city, state, pincode, landmark,
                   payment_method, payment_status, transaction_id
            FROM store.customer_order
            WHERE order_number = $1
            ",
        )
        .bind(number.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = self.items_for(row.id).await?;
        row.into_order(items).map(Some)
    }

    async fn list_recent(
        &self,
        email: Option<&Email>,
        limit: u32,
    ) -> Result<Vec<OrderSummary>, RepositoryError> {
        let rows: Vec<OrderSummaryRow> = sqlx::query_as(
            r"
            SELECT o.order_number, o.user_email, o.order_date, o.status,
                   o.payment_method, o.total_amount, COUNT(i.id) AS item_count
            FROM store.customer_order o
            LEFT JOIN store.order_item i ON i.order_id = o.id
            WHERE ($1::text IS NULL OR o.user_email = $1)
            GROUP BY o.id
            ORDER BY o.order_date DESC, o.id DESC
            LIMIT $2
            ",
        )
        .bind(email.map(Email::as_str))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OrderSummary::try_from).collect()
    }
}

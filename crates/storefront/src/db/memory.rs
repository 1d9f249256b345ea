//! In-memory store implementations for tests.
//!
//! They follow the same contracts as the `PostgreSQL` repositories, including
//! the unique order number and the verified-flag compare-and-swap.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use sneaker_store_core::{
    Email, LoginCode, OneTimeCodeId, OrderId, OrderItemId, OrderNumber, ProductId,
};

use super::{OneTimeCodeStore, OrderStore, ProductStore, RepositoryError};
use crate::models::{
    NewOrder, NewProduct, OneTimeCode, Order, OrderItem, OrderSummary, Product, ProductFilter,
};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

// =============================================================================
// Codes
// =============================================================================

/// In-memory [`OneTimeCodeStore`].
#[derive(Debug, Default)]
pub struct MemoryCodeStore {
    codes: Mutex<Vec<OneTimeCode>>,
    next_id: AtomicI32,
}

impl MemoryCodeStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored code for `email`, verified or not.
    #[must_use]
    pub fn codes_for(&self, email: &Email) -> Vec<OneTimeCode> {
        lock(&self.codes)
            .iter()
            .filter(|c| &c.email == email)
            .cloned()
            .collect()
    }

    /// Move a code's issue time, e.g. to simulate expiry.
    pub fn set_issued_at(&self, id: OneTimeCodeId, issued_at: DateTime<Utc>) {
        if let Some(code) = lock(&self.codes).iter_mut().find(|c| c.id == id) {
            code.issued_at = issued_at;
        }
    }
}

#[async_trait]
impl OneTimeCodeStore for MemoryCodeStore {
    async fn replace(
        &self,
        email: &Email,
        code: &LoginCode,
        issued_at: DateTime<Utc>,
    ) -> Result<OneTimeCode, RepositoryError> {
        let record = OneTimeCode {
            id: OneTimeCodeId::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1),
            email: email.clone(),
            code: code.clone(),
            issued_at,
            verified: false,
        };

        let mut codes = lock(&self.codes);
        codes.retain(|c| &c.email != email);
        codes.push(record.clone());
        Ok(record)
    }

    async fn find_unverified(
        &self,
        email: &Email,
        code: &LoginCode,
    ) -> Result<Option<OneTimeCode>, RepositoryError> {
        Ok(lock(&self.codes)
            .iter()
            .rev()
            .find(|c| &c.email == email && &c.code == code && !c.verified)
            .cloned())
    }

    async fn mark_verified(&self, id: OneTimeCodeId) -> Result<bool, RepositoryError> {
        let mut codes = lock(&self.codes);
        match codes.iter_mut().find(|c| c.id == id && !c.verified) {
            Some(code) => {
                code.verified = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn purge_stale(&self, issued_before: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let mut codes = lock(&self.codes);
        let before = codes.len();
        codes.retain(|c| !c.verified && c.issued_at >= issued_before);
        Ok((before - codes.len()) as u64)
    }
}

// =============================================================================
// Orders
// =============================================================================

/// In-memory [`OrderStore`].
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    orders: Mutex<Vec<Order>>,
    next_id: AtomicI32,
    fail_next_create: AtomicBool,
}

impl MemoryOrderStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next [`OrderStore::create`] fail as if the database were down.
    pub fn fail_next_create(&self) {
        self.fail_next_create.store(true, Ordering::SeqCst);
    }

    /// Every stored order, oldest first.
    #[must_use]
    pub fn all(&self) -> Vec<Order> {
        lock(&self.orders).clone()
    }

    fn next_id(&self) -> i32 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        if self.fail_next_create.swap(false, Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }

        let mut orders = lock(&self.orders);
        if orders.iter().any(|o| o.number == order.number) {
            return Err(RepositoryError::Conflict(
                "order number already exists".to_owned(),
            ));
        }

        let items = order
            .items
            .iter()
            .map(|item| OrderItem {
                id: OrderItemId::new(self.next_id()),
                product_name: item.product_name.clone(),
                brand: item.brand.clone(),
                unit_price: item.unit_price,
                quantity: item.quantity,
            })
            .collect();

        let stored = Order {
            id: OrderId::new(self.next_id()),
            number: order.number.clone(),
            order_date: Utc::now(),
            email: order.email.clone(),
            address: order.address.clone(),
            payment_method: order.payment_method,
            payment_status: order.payment_status,
            transaction_id: order.transaction_id.clone(),
            status: order.status,
            total_amount: order.total_amount,
            items,
        };
        orders.push(stored.clone());
        Ok(stored)
    }

    async fn get_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, RepositoryError> {
        Ok(lock(&self.orders)
            .iter()
            .find(|o| &o.number == number)
            .cloned())
    }

    async fn list_recent(
        &self,
        email: Option<&Email>,
        limit: u32,
    ) -> Result<Vec<OrderSummary>, RepositoryError> {
        Ok(lock(&self.orders)
            .iter()
            .rev()
            .filter(|o| email.is_none_or(|e| &o.email == e))
            .take(limit as usize)
            .map(OrderSummary::from)
            .collect())
    }
}

// =============================================================================
// Products
// =============================================================================

/// In-memory [`ProductStore`].
#[derive(Debug, Default)]
pub struct MemoryProductStore {
    products: Mutex<Vec<Product>>,
    list_calls: AtomicI32,
}

impl MemoryProductStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times [`ProductStore::list`] has been called.
    #[must_use]
    pub fn list_calls(&self) -> i32 {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn list(&self, filter: ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(lock(&self.products)
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(lock(&self.products).len() as u64)
    }

    async fn insert(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let mut products = lock(&self.products);
        let id = i32::try_from(products.len() + 1)
            .map_err(|e| RepositoryError::Conflict(e.to_string()))?;
        let stored = Product {
            id: ProductId::new(id),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            category: product.category.clone(),
            brand: product.brand.clone(),
            featured: product.featured,
            size_range: product.size_range.clone(),
            trending: product.trending,
            limited_edition: product.limited_edition,
            image_url: product.image_url.clone(),
        };
        products.push(stored.clone());
        Ok(stored)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn email() -> Email {
        Email::parse("runner@example.com").unwrap()
    }

    #[tokio::test]
    async fn test_replace_leaves_one_code() {
        let store = MemoryCodeStore::new();
        store
            .replace(&email(), &LoginCode::parse("111111").unwrap(), Utc::now())
            .await
            .unwrap();
        store
            .replace(&email(), &LoginCode::parse("222222").unwrap(), Utc::now())
            .await
            .unwrap();

        let codes = store.codes_for(&email());
        assert_eq!(codes.len(), 1);
        assert_eq!(codes[0].code.as_str(), "222222");
    }

    #[tokio::test]
    async fn test_mark_verified_only_once() {
        let store = MemoryCodeStore::new();
        let code = store
            .replace(&email(), &LoginCode::parse("111111").unwrap(), Utc::now())
            .await
            .unwrap();

        assert!(store.mark_verified(code.id).await.unwrap());
        assert!(!store.mark_verified(code.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_purge_stale() {
        let store = MemoryCodeStore::new();
        let now = Utc::now();
        let other = Email::parse("other@example.com").unwrap();
        let old = store
            .replace(&email(), &LoginCode::parse("111111").unwrap(), now)
            .await
            .unwrap();
        store.set_issued_at(old.id, now - Duration::minutes(30));
        store
            .replace(&other, &LoginCode::parse("222222").unwrap(), now)
            .await
            .unwrap();

        let purged = store
            .purge_stale(now - Duration::minutes(10))
            .await
            .unwrap();
        assert_eq!(purged, 1);
        assert!(store.codes_for(&email()).is_empty());
        assert_eq!(store.codes_for(&other).len(), 1);
    }
}

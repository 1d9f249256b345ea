//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::db::{
    OneTimeCodeRepository, OneTimeCodeStore, OrderRepository, OrderStore, ProductRepository,
    ProductStore,
};
use crate::services::catalog::Catalog;
use crate::services::email::Mailer;

/// The persistence backends the storefront runs against.
#[derive(Clone)]
pub struct Stores {
    pub codes: Arc<dyn OneTimeCodeStore>,
    pub orders: Arc<dyn OrderStore>,
    pub products: Arc<dyn ProductStore>,
}

impl Stores {
    /// `PostgreSQL` repositories sharing one pool.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            codes: Arc::new(OneTimeCodeRepository::new(pool.clone())),
            orders: Arc::new(OrderRepository::new(pool.clone())),
            products: Arc::new(ProductRepository::new(pool.clone())),
        }
    }
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the stores, the catalog cache, the mailer and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    codes: Arc<dyn OneTimeCodeStore>,
    orders: Arc<dyn OrderStore>,
    catalog: Catalog,
    mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, stores: Stores, mailer: Arc<dyn Mailer>) -> Self {
        let catalog = Catalog::new(stores.products, config.catalog_cache_ttl);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                codes: stores.codes,
                orders: stores.orders,
                catalog,
                mailer,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Login code store.
    #[must_use]
    pub fn codes(&self) -> &dyn OneTimeCodeStore {
        self.inner.codes.as_ref()
    }

    /// Order store.
    #[must_use]
    pub fn orders(&self) -> &dyn OrderStore {
        self.inner.orders.as_ref()
    }

    /// Cached product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Login code mailer.
    #[must_use]
    pub fn mailer(&self) -> &dyn Mailer {
        self.inner.mailer.as_ref()
    }
}

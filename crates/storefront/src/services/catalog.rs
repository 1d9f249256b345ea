//! Product catalog.
//!
//! Listings are cached with `moka` for the configured TTL. The catalog only
//! changes when `ss-cli seed catalog` runs in another process, so there is no
//! write path to invalidate from.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use sneaker_store_core::Price;

use crate::db::{ProductStore, RepositoryError};
use crate::models::{NewProduct, Product, ProductFilter};

/// The three listings shown on the home page.
#[derive(Debug, Clone)]
pub struct HomeListings {
    pub featured: Arc<Vec<Product>>,
    pub trending: Arc<Vec<Product>>,
    pub all: Arc<Vec<Product>>,
}

/// Cached read access to the catalog.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    store: Arc<dyn ProductStore>,
    cache: Cache<ProductFilter, Arc<Vec<Product>>>,
}

impl Catalog {
    /// Create a catalog over `store`, caching listings for `ttl`.
    #[must_use]
    pub fn new(store: Arc<dyn ProductStore>, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(16).time_to_live(ttl).build();

        Self {
            inner: Arc::new(CatalogInner { store, cache }),
        }
    }

    /// Products matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the listing is not cached and the store fails.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: ProductFilter) -> Result<Arc<Vec<Product>>, RepositoryError> {
        if let Some(products) = self.inner.cache.get(&filter).await {
            debug!("Cache hit for product listing");
            return Ok(products);
        }

        let products = Arc::new(self.inner.store.list(filter).await?);
        self.inner.cache.insert(filter, Arc::clone(&products)).await;
        Ok(products)
    }

    /// Featured, trending and full listings for the home page.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if any listing fails to load.
    pub async fn home(&self) -> Result<HomeListings, RepositoryError> {
        let (featured, trending, all) = tokio::try_join!(
            self.list(ProductFilter::Featured),
            self.list(ProductFilter::Trending),
            self.list(ProductFilter::All),
        )?;

        Ok(HomeListings {
            featured,
            trending,
            all,
        })
    }

    /// Drop every cached listing.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

// =============================================================================
// Seeding
// =============================================================================

const SAMPLE_CATALOG: [(&str, i64, &str, &str, &str, bool, &str, bool, bool); 6] = [
    (
        "Nike Air Jordan 1 Chicago",
        45999,
        "Limited Edition",
        "Nike",
        "https://images.unsplash.com/photo-1542291026-7eec264c27ff?w=500",
        true,
        "6-12",
        true,
        true,
    ),
    (
        "Adidas Yeezy Boost 350 V2",
        29999,
        "Limited Edition",
        "Adidas",
        "https://images.unsplash.com/photo-1606107557195-0e29a4b5b4aa?w=500",
        true,
        "7-13",
        true,
        true,
    ),
    (
        "Nike Air Force 1 White",
        8999,
        "Casual",
        "Nike",
        "https://images.unsplash.com/photo-1595950653106-6c9ebd614d3a?w=500",
        false,
        "6-12",
        true,
        false,
    ),
    (
        "Adidas Ultraboost 21",
        17999,
        "Running",
        "Adidas",
        "https://images.unsplash.com/photo-1549289524-06cf8837ace5?w=500",
        true,
        "7-13",
        false,
        false,
    ),
    (
        "Puma RS-X Toys",
        12999,
        "Casual",
        "Puma",
        "https://images.unsplash.com/photo-1604671368394-97cbc3f2ec0f?w=500",
        false,
        "6-12",
        true,
        true,
    ),
    (
        "New Balance 550 White",
        14999,
        "Luxury",
        "New Balance",
        "https://images.unsplash.com/photo-1600185365483-26d7a4cc7519?w=500",
        true,
        "7-13",
        false,
        false,
    ),
];

/// The sample sneakers a fresh store is seeded with.
#[must_use]
pub fn sample_products() -> Vec<NewProduct> {
    SAMPLE_CATALOG
        .iter()
        .map(
            |&(name, price, category, brand, image_url, featured, size_range, trending, limited)| {
                NewProduct {
                    name: name.to_owned(),
                    description: format!(
                        "Premium {name}. Authentic {brand} product with premium materials and exclusive design."
                    ),
                    price: Price::from_rupees(price),
                    category: category.to_owned(),
                    brand: brand.to_owned(),
                    featured,
                    size_range: size_range.to_owned(),
                    trending,
                    limited_edition: limited,
                    image_url: Some(image_url.to_owned()),
                }
            },
        )
        .collect()
}

/// Insert the sample sneakers if the catalog is empty.
///
/// Returns the number of products inserted (zero if the catalog already had
/// products).
///
/// # Errors
///
/// Returns `RepositoryError` if the store fails.
pub async fn seed_if_empty(store: &dyn ProductStore) -> Result<usize, RepositoryError> {
    if store.count().await? > 0 {
        return Ok(0);
    }

    let products = sample_products();
    for product in &products {
        store.insert(product).await?;
    }
    Ok(products.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryProductStore;

    #[tokio::test]
    async fn test_seed_only_when_empty() {
        let store = MemoryProductStore::new();
        assert_eq!(seed_if_empty(&store).await.unwrap(), 6);
        assert_eq!(seed_if_empty(&store).await.unwrap(), 0);
        assert_eq!(store.count().await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_home_listings() {
        let store = Arc::new(MemoryProductStore::new());
        seed_if_empty(store.as_ref()).await.unwrap();
        let catalog = Catalog::new(store, Duration::from_secs(60));

        let home = catalog.home().await.unwrap();

        assert_eq!(home.all.len(), 6);
        assert_eq!(home.featured.len(), 4);
        assert_eq!(home.trending.len(), 4);
        assert!(home.featured.iter().all(|p| p.featured));
        assert_eq!(home.all[0].name, "Nike Air Jordan 1 Chicago");
    }

    #[tokio::test]
    async fn test_listings_are_cached() {
        let store = Arc::new(MemoryProductStore::new());
        seed_if_empty(store.as_ref()).await.unwrap();
        let catalog = Catalog::new(Arc::clone(&store) as Arc<dyn ProductStore>, Duration::from_secs(60));

        catalog.list(ProductFilter::All).await.unwrap();
        catalog.list(ProductFilter::All).await.unwrap();
        assert_eq!(store.list_calls(), 1);

        catalog.invalidate_all().await;
        catalog.list(ProductFilter::All).await.unwrap();
        assert_eq!(store.list_calls(), 2);
    }

    #[test]
    fn test_sample_description() {
        let products = sample_products();
        assert_eq!(
            products[5].description,
            "Premium New Balance 550 White. Authentic New Balance product with premium materials and exclusive design."
        );
        assert_eq!(products[2].price, Price::from_rupees(8999));
    }
}

//! Product catalog repository.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use sneaker_store_core::{Price, ProductId};

use super::{ProductStore, RepositoryError};
use crate::models::{NewProduct, Product, ProductFilter};

const PRODUCT_COLUMNS: &str = "id, name, description, price, category, brand, featured, \
     size_range, trending, limited_edition, image_url";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    price: Decimal,
    category: String,
    brand: String,
    featured: bool,
    size_range: String,
    trending: bool,
    limited_edition: bool,
    image_url: Option<String>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: Price::new(row.price),
            category: row.category,
            brand: row.brand,
            featured: row.featured,
            size_range: row.size_range,
            trending: row.trending,
            limited_edition: row.limited_edition,
            image_url: row.image_url,
        }
    }
}

/// `PostgreSQL`-backed [`ProductStore`].
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for ProductRepository {
    async fn list(&self, filter: ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let condition = match filter {
            ProductFilter::All => "TRUE",
            ProductFilter::Featured => "featured",
            ProductFilter::Trending => "trending",
        };
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM store.product WHERE {condition} ORDER BY id");

        let rows: Vec<ProductRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM store.product")
            .fetch_one(&self.pool)
            .await?;

        u64::try_from(count)
            .map_err(|e| RepositoryError::DataCorruption(format!("negative product count: {e}")))
    }

    async fn insert(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO store.product (
                name, description, price, category, brand, featured,
                size_range, trending, limited_edition, image_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {PRODUCT_COLUMNS}
            "
        );

        let row: ProductRow = sqlx::query_as(&sql)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price.amount())
            .bind(&product.category)
            .bind(&product.brand)
            .bind(product.featured)
            .bind(&product.size_range)
            .bind(product.trending)
            .bind(product.limited_edition)
            .bind(product.image_url.as_deref())
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }
}

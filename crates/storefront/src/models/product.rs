//! Catalog products.

use sneaker_store_core::{Price, ProductId};

/// A product as listed on the home page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub brand: String,
    pub featured: bool,
    pub size_range: String,
    pub trending: bool,
    pub limited_edition: bool,
    pub image_url: Option<String>,
}

/// A product to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub brand: String,
    pub featured: bool,
    pub size_range: String,
    pub trending: bool,
    pub limited_edition: bool,
    pub image_url: Option<String>,
}

/// Which slice of the catalog to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductFilter {
    All,
    Featured,
    Trending,
}

impl ProductFilter {
    /// Whether `product` belongs in this slice.
    #[must_use]
    pub const fn matches(self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Featured => product.featured,
            Self::Trending => product.trending,
        }
    }
}

//! In-process catalog store.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use bazaar_core::{Category, CategoryFilter, CategoryId, Price, Product, ProductId};
use chrono::Utc;
use serde::Deserialize;
use tokio::sync::RwLock;

use super::{CatalogError, CatalogStore};

/// Initial catalog contents, as read from `CATALOG_SEED_PATH`.
///
/// ```json
/// {
///   "categories": [{ "id": "c1", "name": "Books", "slug": "books" }],
///   "products": [{ "id": "p1", "title": "Novel", "price": "12.00",
///                  "image": "/images/novel.png", "category_id": "c1" }]
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

/// A seeded product. Timestamps are set when the seed is loaded.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedProduct {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub image: String,
    pub category_id: CategoryId,
}

#[derive(Debug, Default)]
struct Records {
    categories: BTreeMap<CategoryId, Category>,
    products: BTreeMap<ProductId, Product>,
}

/// Catalog held in memory behind an async `RwLock`.
///
/// Records are listed in id order.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    records: RwLock<Records>,
}

impl MemoryCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from seed data.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidSeed` for duplicate ids or products that
    /// refer to unknown categories.
    pub fn from_seed(seed: CatalogSeed) -> Result<Self, CatalogError> {
        let mut records = Records::default();

        for category in seed.categories {
            let id = category.id.clone();
            if records.categories.insert(id.clone(), category).is_some() {
                return Err(CatalogError::InvalidSeed(format!(
                    "duplicate category id: {id}"
                )));
            }
        }

        let now = Utc::now();
        for seeded in seed.products {
            if !records.categories.contains_key(&seeded.category_id) {
                return Err(CatalogError::InvalidSeed(format!(
                    "product {} refers to unknown category {}",
                    seeded.id, seeded.category_id
                )));
            }

            let product = Product {
                id: seeded.id,
                title: seeded.title,
                price: seeded.price,
                image: seeded.image,
                category_id: seeded.category_id,
                created_at: now,
                updated_at: now,
            };
            let id = product.id.clone();
            if records.products.insert(id.clone(), product).is_some() {
                return Err(CatalogError::InvalidSeed(format!(
                    "duplicate product id: {id}"
                )));
            }
        }

        Ok(Self {
            records: RwLock::new(records),
        })
    }

    /// Read and parse a JSON seed file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the seed is
    /// inconsistent.
    pub async fn from_seed_file(path: &Path) -> Result<Self, CatalogError> {
        let bytes = tokio::fs::read(path).await?;
        let seed: CatalogSeed = serde_json::from_slice(&bytes)?;
        tracing::info!(
            path = %path.display(),
            categories = seed.categories.len(),
            products = seed.products.len(),
            "Loaded catalog seed"
        );
        Self::from_seed(seed)
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn list_categories(&self, active_only: bool) -> Result<Vec<Category>, CatalogError> {
        let records = self.records.read().await;
        Ok(records
            .categories
            .values()
            .filter(|category| !active_only || category.is_active)
            .cloned()
            .collect())
    }

    async fn get_category(&self, id: &CategoryId) -> Result<Option<Category>, CatalogError> {
        Ok(self.records.read().await.categories.get(id).cloned())
    }

    async fn list_products(&self, filter: &CategoryFilter) -> Result<Vec<Product>, CatalogError> {
        let records = self.records.read().await;
        Ok(records
            .products
            .values()
            .filter(|product| filter.matches(product))
            .cloned()
            .collect())
    }

    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError> {
        Ok(self.records.read().await.products.get(id).cloned())
    }

    async fn insert_product(&self, product: Product) -> Result<Product, CatalogError> {
        let mut records = self.records.write().await;
        if records.products.contains_key(&product.id) {
            return Err(CatalogError::Conflict(format!(
                "product already exists: {}",
                product.id
            )));
        }
        records
            .products
            .insert(product.id.clone(), product.clone());
        Ok(product)
    }

    async fn update_product(&self, product: Product) -> Result<Product, CatalogError> {
        let mut records = self.records.write().await;
        let Some(existing) = records.products.get_mut(&product.id) else {
            return Err(CatalogError::NotFound(format!(
                "Product not found: {}",
                product.id
            )));
        };
        existing.clone_from(&product);
        Ok(product)
    }
}

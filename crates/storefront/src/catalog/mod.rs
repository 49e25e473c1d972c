//! Product catalog access.
//!
//! # Architecture
//!
//! - [`CatalogStore`] is the seam to the document store holding products and
//!   categories. [`MemoryCatalog`] is the in-process implementation.
//! - [`CatalogService`] wraps a store with validation and an in-memory `moka`
//!   cache (5 minute TTL). Product writes invalidate cached product listings
//!   and bump a generation counter; a listing read from the store before
//!   the bump is never cached.
//!
//! # Example
//!
//! ```rust,ignore
//! let service = CatalogService::new(Arc::new(MemoryCatalog::new()));
//!
//! // Shop listing for `/shop?category=books`
//! let listing = service.shop(Some("books")).await?;
//! ```

mod cache;
mod memory;

pub use memory::{CatalogSeed, MemoryCatalog, SeedProduct};

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bazaar_core::{
    Category, CategoryFilter, CategoryId, Product, ProductDraft, ProductDraftError, ProductId,
    ProductUpdate, select_category,
};
use chrono::Utc;
use moka::future::Cache;
use thiserror::Error;
use tracing::{debug, instrument};

use cache::{CacheKey, CacheValue};

/// Errors that can occur when reading or writing the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A record with the same id already exists.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Admin input failed validation.
    #[error("Invalid product: {0}")]
    Invalid(#[from] ProductDraftError),

    /// The product refers to a category that does not exist.
    #[error("Unknown category: {0}")]
    UnknownCategory(CategoryId),

    /// The seed document could not be read.
    #[error("Seed I/O error: {0}")]
    SeedIo(#[from] std::io::Error),

    /// The seed document could not be parsed.
    #[error("Seed parse error: {0}")]
    SeedParse(#[from] serde_json::Error),

    /// The seed document is inconsistent.
    #[error("Invalid seed: {0}")]
    InvalidSeed(String),

    /// The backing store failed.
    #[error("Store error: {0}")]
    Backend(String),
}

/// Storage backend for products and categories.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All categories, or only active ones.
    async fn list_categories(&self, active_only: bool) -> Result<Vec<Category>, CatalogError>;

    async fn get_category(&self, id: &CategoryId) -> Result<Option<Category>, CatalogError>;

    /// Products passing `filter`.
    async fn list_products(&self, filter: &CategoryFilter) -> Result<Vec<Product>, CatalogError>;

    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError>;

    /// Store a new product. Fails with `Conflict` if the id is taken.
    async fn insert_product(&self, product: Product) -> Result<Product, CatalogError>;

    /// Replace an existing product. Fails with `NotFound` if it is missing.
    async fn update_product(&self, product: Product) -> Result<Product, CatalogError>;
}

/// The shop page: active categories, the selected one, and matching products.
#[derive(Debug, Clone)]
pub struct ShopListing {
    pub categories: Vec<Category>,
    /// `None` when no slug was requested or it matched nothing.
    pub active_category: Option<Category>,
    pub products: Vec<Product>,
}

// =============================================================================
// CatalogService
// =============================================================================

/// Cached, validating access to a [`CatalogStore`].
#[derive(Clone)]
pub struct CatalogService {
    inner: Arc<CatalogServiceInner>,
}

struct CatalogServiceInner {
    store: Arc<dyn CatalogStore>,
    cache: Cache<CacheKey, CacheValue>,
    /// Bumped by every product write.
    listing_generation: AtomicU64,
}

impl CatalogService {
    /// Create a new catalog service over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .support_invalidation_closures()
            .build();

        Self {
            inner: Arc::new(CatalogServiceInner {
                store,
                cache,
                listing_generation: AtomicU64::new(0),
            }),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// List categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    #[instrument(skip(self))]
    pub async fn categories(&self, active_only: bool) -> Result<Vec<Category>, CatalogError> {
        let cache_key = CacheKey::Categories { active_only };

        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories = self.inner.store.list_categories(active_only).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// List products passing `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    #[instrument(skip(self))]
    pub async fn products(&self, filter: &CategoryFilter) -> Result<Vec<Product>, CatalogError> {
        let cache_key = CacheKey::Products(filter.clone());

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let generation = self.listing_generation();
        let products = self.inner.store.list_products(filter).await?;

        self.cache_listing(cache_key, products.clone(), generation)
            .await;

        Ok(products)
    }

    /// Build the shop listing for an optional category slug.
    ///
    /// An unknown slug falls back to the full product list.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    #[instrument(skip(self))]
    pub async fn shop(&self, requested_slug: Option<&str>) -> Result<ShopListing, CatalogError> {
        let categories = self.categories(true).await?;
        let active_category = select_category(requested_slug, &categories).cloned();

        if requested_slug.is_some() && active_category.is_none() {
            debug!("Unknown category slug, showing all products");
        }

        let filter = active_category
            .as_ref()
            .map_or(CategoryFilter::All, |category| {
                CategoryFilter::Category(category.id.clone())
            });
        let products = self.products(&filter).await?;

        Ok(ShopListing {
            categories,
            active_category,
            products,
        })
    }

    /// Get a single product. Not cached, so admin edits are visible at once.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if there is no such product.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        self.inner
            .store
            .get_product(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("Product not found: {id}")))
    }

    /// Check that the store answers, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    pub async fn check(&self) -> Result<(), CatalogError> {
        self.inner.store.list_categories(false).await.map(|_| ())
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Validate a draft and store it as a new product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Invalid` or `CatalogError::UnknownCategory` for
    /// bad input, or an error if the store fails.
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create_product(&self, draft: ProductDraft) -> Result<Product, CatalogError> {
        self.ensure_category(&draft.category_id).await?;

        let product = draft.into_product(ProductId::generate(), Utc::now())?;
        let product = self.inner.store.insert_product(product).await?;

        self.invalidate_product_listings();
        tracing::info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    /// Apply a partial update to an existing product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the product does not exist,
    /// `CatalogError::Invalid` or `CatalogError::UnknownCategory` for bad
    /// input, or an error if the store fails.
    #[instrument(skip(self, update), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        update: ProductUpdate,
    ) -> Result<Product, CatalogError> {
        let mut product = self.product(id).await?;

        if let Some(category_id) = &update.category_id {
            self.ensure_category(category_id).await?;
        }

        update.apply(&mut product, Utc::now())?;
        let product = self.inner.store.update_product(product).await?;

        self.invalidate_product_listings();
        tracing::info!(product_id = %product.id, "Product updated");
        Ok(product)
    }

    async fn ensure_category(&self, id: &CategoryId) -> Result<(), CatalogError> {
        match self.inner.store.get_category(id).await? {
            Some(_) => Ok(()),
            None => Err(CatalogError::UnknownCategory(id.clone())),
        }
    }

    fn listing_generation(&self) -> u64 {
        self.inner.listing_generation.load(Ordering::Acquire)
    }

    /// Cache a listing fetched at `generation` unless a write has happened
    /// since. The second check catches a write that lands during the insert.
    async fn cache_listing(&self, key: CacheKey, products: Vec<Product>, generation: u64) {
        if self.listing_generation() != generation {
            debug!("Catalog changed during read, not caching listing");
            return;
        }

        self.inner
            .cache
            .insert(key.clone(), CacheValue::Products(products))
            .await;

        if self.listing_generation() != generation {
            self.inner.cache.invalidate(&key).await;
        }
    }

    fn invalidate_product_listings(&self) {
        self.inner.listing_generation.fetch_add(1, Ordering::AcqRel);

        if let Err(e) = self
            .inner
            .cache
            .invalidate_entries_if(|key, _| key.is_product_listing())
        {
            tracing::warn!("Failed to invalidate product listings, clearing cache: {e}");
            self.inner.cache.invalidate_all();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bazaar_core::{Price, Slug};
    use rust_decimal::Decimal;

    use super::*;

    fn seeded() -> CatalogService {
        let seed = CatalogSeed {
            categories: vec![
                Category {
                    id: CategoryId::new("c-books"),
                    name: "Books".to_string(),
                    slug: Slug::parse("books").unwrap(),
                    is_active: true,
                },
                Category {
                    id: CategoryId::new("c-games"),
                    name: "Games".to_string(),
                    slug: Slug::parse("games").unwrap(),
                    is_active: true,
                },
                Category {
                    id: CategoryId::new("c-old"),
                    name: "Old".to_string(),
                    slug: Slug::parse("old").unwrap(),
                    is_active: false,
                },
            ],
            products: vec![
                SeedProduct {
                    id: ProductId::new("p-novel"),
                    title: "Novel".to_string(),
                    price: Price::from_cents(1200).unwrap(),
                    image: "/images/novel.png".to_string(),
                    category_id: CategoryId::new("c-books"),
                },
                SeedProduct {
                    id: ProductId::new("p-chess"),
                    title: "Chess".to_string(),
                    price: Price::from_cents(3000).unwrap(),
                    image: "/images/chess.png".to_string(),
                    category_id: CategoryId::new("c-games"),
                },
            ],
        };
        CatalogService::new(Arc::new(MemoryCatalog::from_seed(seed).unwrap()))
    }

    fn draft(category: &str) -> ProductDraft {
        ProductDraft {
            title: "Puzzle".to_string(),
            price: Decimal::new(1500, 2),
            image: Some("/images/puzzle.png".to_string()),
            category_id: CategoryId::new(category),
        }
    }

    #[tokio::test]
    async fn test_shop_without_filter_lists_everything() {
        let service = seeded();
        let listing = service.shop(None).await.unwrap();

        assert!(listing.active_category.is_none());
        assert_eq!(listing.products.len(), 2);
        // Inactive categories are not offered
        assert_eq!(listing.categories.len(), 2);
    }

    #[tokio::test]
    async fn test_shop_filters_by_slug() {
        let service = seeded();
        let listing = service.shop(Some("games")).await.unwrap();

        assert_eq!(
            listing.active_category.map(|c| c.id),
            Some(CategoryId::new("c-games"))
        );
        assert_eq!(listing.products.len(), 1);
        assert_eq!(listing.products[0].id, ProductId::new("p-chess"));
    }

    #[tokio::test]
    async fn test_shop_unknown_slug_shows_all() {
        let service = seeded();
        let listing = service.shop(Some("garden")).await.unwrap();

        assert!(listing.active_category.is_none());
        assert_eq!(listing.products.len(), 2);
    }

    #[tokio::test]
    async fn test_shop_inactive_slug_shows_all() {
        let service = seeded();
        let listing = service.shop(Some("old")).await.unwrap();
        assert!(listing.active_category.is_none());
    }

    #[tokio::test]
    async fn test_create_invalidates_listing() {
        let service = seeded();
        assert_eq!(service.shop(Some("games")).await.unwrap().products.len(), 1);

        let created = service.create_product(draft("c-games")).await.unwrap();

        let listing = service.shop(Some("games")).await.unwrap();
        assert_eq!(listing.products.len(), 2);
        assert!(listing.products.iter().any(|p| p.id == created.id));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_category() {
        let service = seeded();
        let err = service.create_product(draft("c-nope")).await.unwrap_err();
        assert!(matches!(err, CatalogError::UnknownCategory(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_draft() {
        let service = seeded();
        let mut d = draft("c-games");
        d.image = None;
        let err = service.create_product(d).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Invalid(ProductDraftError::MissingImage)
        ));
    }

    #[tokio::test]
    async fn test_update_moves_product_between_listings() {
        let service = seeded();
        let id = ProductId::new("p-novel");
        assert_eq!(service.shop(Some("games")).await.unwrap().products.len(), 1);

        let updated = service
            .update_product(
                &id,
                ProductUpdate {
                    category_id: Some(CategoryId::new("c-games")),
                    ..ProductUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.image, "/images/novel.png");
        assert_eq!(service.shop(Some("games")).await.unwrap().products.len(), 2);
        assert!(service.shop(Some("books")).await.unwrap().products.is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let service = seeded();
        let err = service
            .update_product(&ProductId::new("p-ghost"), ProductUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_product_lookup() {
        let service = seeded();
        let product = service.product(&ProductId::new("p-chess")).await.unwrap();
        assert_eq!(product.title, "Chess");

        let err = service.product(&ProductId::new("p-ghost")).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_listing_read_before_write_is_not_cached() {
        let service = seeded();
        let filter = CategoryFilter::Category(CategoryId::new("c-books"));

        // A read that started before the write
        let generation = service.listing_generation();
        let stale = service.inner.store.list_products(&filter).await.unwrap();

        let mut d = draft("c-books");
        d.title = "Atlas".to_string();
        service.create_product(d).await.unwrap();

        service
            .cache_listing(CacheKey::Products(filter.clone()), stale, generation)
            .await;
        assert!(
            service
                .inner
                .cache
                .get(&CacheKey::Products(filter.clone()))
                .await
                .is_none()
        );

        let books = service.products(&filter).await.unwrap();
        assert!(books.iter().any(|product| product.title == "Atlas"));
        assert!(
            service
                .inner
                .cache
                .get(&CacheKey::Products(filter))
                .await
                .is_some()
        );
    }
}

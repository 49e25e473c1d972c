//! Catalog records and the pure rules around them.
//!
//! - [`Product`] and [`Category`] mirror the documents held by the catalog store.
//! - [`select_category`] and [`CategoryFilter`] implement the shop's
//!   category filter: an unknown slug falls back to showing everything.
//! - [`ProductDraft`] and [`ProductUpdate`] validate admin input before it
//!   reaches the store.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Price, PriceError, ProductId, Slug};

/// A product as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    /// Absolute URL or root-relative path of the product image.
    pub image: String,
    pub category_id: CategoryId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: Slug,
    /// Inactive categories are hidden from the shop's filter list.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

// =============================================================================
// Category Filter
// =============================================================================

/// Find the category whose slug equals `requested`.
///
/// Returns `None` when no slug was requested or nothing matches, which the
/// shop treats as "no filter".
#[must_use]
pub fn select_category<'a>(
    requested: Option<&str>,
    categories: &'a [Category],
) -> Option<&'a Category> {
    let requested = requested?;
    categories
        .iter()
        .find(|category| category.slug.as_str() == requested)
}

/// Which products the shop listing shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum CategoryFilter {
    /// Every product.
    #[default]
    All,
    /// Only products in this category.
    Category(CategoryId),
}

impl CategoryFilter {
    /// Resolve a requested slug against the known categories.
    ///
    /// ```
    /// use bazaar_core::{Category, CategoryFilter, CategoryId, Slug};
    ///
    /// let categories = vec![Category {
    ///     id: CategoryId::new("c1"),
    ///     name: "Books".to_string(),
    ///     slug: Slug::parse("books").unwrap(),
    ///     is_active: true,
    /// }];
    ///
    /// assert_eq!(
    ///     CategoryFilter::from_slug(Some("books"), &categories),
    ///     CategoryFilter::Category(CategoryId::new("c1"))
    /// );
    /// assert_eq!(CategoryFilter::from_slug(Some("toys"), &categories), CategoryFilter::All);
    /// ```
    #[must_use]
    pub fn from_slug(requested: Option<&str>, categories: &[Category]) -> Self {
        select_category(requested, categories)
            .map_or(Self::All, |category| Self::Category(category.id.clone()))
    }

    /// Whether `product` passes this filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Category(id) => &product.category_id == id,
        }
    }
}

// =============================================================================
// Admin Input
// =============================================================================

/// Errors that can occur when validating admin product input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductDraftError {
    /// The title is empty after trimming.
    #[error("title cannot be empty")]
    EmptyTitle,
    /// The title is too long.
    #[error("title must be at most {max} characters")]
    TitleTooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The price is invalid.
    #[error("{0}")]
    InvalidPrice(#[from] PriceError),
    /// No image was supplied (the upload has not finished).
    #[error("an image is required")]
    MissingImage,
    /// The image is neither an http(s) URL nor a root-relative path.
    #[error("image must be an http(s) URL or a path starting with '/'")]
    InvalidImage,
}

/// Maximum length of a product title, in characters.
pub const MAX_TITLE_LENGTH: usize = 200;

fn validate_title(title: &str) -> Result<String, ProductDraftError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ProductDraftError::EmptyTitle);
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ProductDraftError::TitleTooLong {
            max: MAX_TITLE_LENGTH,
        });
    }
    Ok(title.to_owned())
}

fn validate_image(image: &str) -> Result<String, ProductDraftError> {
    let image = image.trim();
    if image.is_empty() {
        return Err(ProductDraftError::MissingImage);
    }
    if image.starts_with('/') && !image.starts_with("//") {
        return Ok(image.to_owned());
    }
    match url::Url::parse(image) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(image.to_owned()),
        _ => Err(ProductDraftError::InvalidImage),
    }
}

/// Admin input for a new product.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductDraft {
    pub title: String,
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    pub category_id: CategoryId,
}

impl ProductDraft {
    /// Validate the draft and build a product with the given id.
    ///
    /// Does not check that `category_id` exists; the caller owns the catalog.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure found.
    pub fn into_product(
        self,
        id: ProductId,
        now: DateTime<Utc>,
    ) -> Result<Product, ProductDraftError> {
        let title = validate_title(&self.title)?;
        let price = Price::new(self.price)?;
        let image = validate_image(self.image.as_deref().unwrap_or_default())?;

        Ok(Product {
            id,
            title,
            price,
            image,
            category_id: self.category_id,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Admin edits to an existing product. Absent fields are left unchanged;
/// in particular an absent `image` keeps the existing one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

impl ProductUpdate {
    /// Validate every present field, then apply them to `product`.
    ///
    /// On error `product` is left untouched.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure found.
    pub fn apply(self, product: &mut Product, now: DateTime<Utc>) -> Result<(), ProductDraftError> {
        let title = self.title.as_deref().map(validate_title).transpose()?;
        let price = self.price.map(Price::new).transpose()?;
        let image = self.image.as_deref().map(validate_image).transpose()?;

        if let Some(title) = title {
            product.title = title;
        }
        if let Some(price) = price {
            product.price = price;
        }
        if let Some(image) = image {
            product.image = image;
        }
        if let Some(category_id) = self.category_id {
            product.category_id = category_id;
        }
        product.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn category(id: &str, slug: &str) -> Category {
        Category {
            id: CategoryId::new(id),
            name: slug.to_uppercase(),
            slug: Slug::parse(slug).unwrap(),
            is_active: true,
        }
    }

    fn draft() -> ProductDraft {
        ProductDraft {
            title: "  Desk Lamp ".to_string(),
            price: Decimal::new(2499, 2),
            image: Some("https://img.example.com/lamp.png".to_string()),
            category_id: CategoryId::new("home"),
        }
    }

    #[test]
    fn test_select_category_matches_slug() {
        let categories = vec![category("c1", "books"), category("c2", "games")];
        let found = select_category(Some("games"), &categories).unwrap();
        assert_eq!(found.id, CategoryId::new("c2"));
    }

    #[test]
    fn test_select_category_unknown_or_absent() {
        let categories = vec![category("c1", "books")];
        assert!(select_category(Some("toys"), &categories).is_none());
        assert!(select_category(None, &categories).is_none());
        assert!(select_category(Some("books"), &[]).is_none());
    }

    #[test]
    fn test_filter_matches() {
        let now = Utc::now();
        let product = draft()
            .into_product(ProductId::new("p1"), now)
            .unwrap();

        assert!(CategoryFilter::All.matches(&product));
        assert!(CategoryFilter::Category(CategoryId::new("home")).matches(&product));
        assert!(!CategoryFilter::Category(CategoryId::new("garden")).matches(&product));
    }

    #[test]
    fn test_draft_into_product_trims_title() {
        let now = Utc::now();
        let product = draft().into_product(ProductId::new("p1"), now).unwrap();
        assert_eq!(product.title, "Desk Lamp");
        assert_eq!(product.price, Price::from_cents(2499).unwrap());
        assert_eq!(product.created_at, product.updated_at);
    }

    #[test]
    fn test_draft_rejects_empty_title() {
        let mut d = draft();
        d.title = "   ".to_string();
        assert_eq!(
            d.into_product(ProductId::new("p1"), Utc::now()),
            Err(ProductDraftError::EmptyTitle)
        );
    }

    #[test]
    fn test_draft_rejects_long_title() {
        let mut d = draft();
        d.title = "x".repeat(MAX_TITLE_LENGTH + 1);
        assert!(matches!(
            d.into_product(ProductId::new("p1"), Utc::now()),
            Err(ProductDraftError::TitleTooLong { .. })
        ));
    }

    #[test]
    fn test_draft_rejects_negative_price() {
        let mut d = draft();
        d.price = Decimal::new(-100, 2);
        assert!(matches!(
            d.into_product(ProductId::new("p1"), Utc::now()),
            Err(ProductDraftError::InvalidPrice(_))
        ));
    }

    #[test]
    fn test_draft_requires_image() {
        let mut d = draft();
        d.image = None;
        assert_eq!(
            d.into_product(ProductId::new("p1"), Utc::now()),
            Err(ProductDraftError::MissingImage)
        );
    }

    #[test]
    fn test_image_validation() {
        assert!(validate_image("/images/abc.png").is_ok());
        assert!(validate_image("http://cdn.example.com/a.jpg").is_ok());
        assert_eq!(
            validate_image("ftp://example.com/a.jpg"),
            Err(ProductDraftError::InvalidImage)
        );
        assert_eq!(
            validate_image("//evil.example.com/a.jpg"),
            Err(ProductDraftError::InvalidImage)
        );
        assert_eq!(
            validate_image("lamp.png"),
            Err(ProductDraftError::InvalidImage)
        );
    }

    #[test]
    fn test_update_keeps_existing_image() {
        let created = Utc::now();
        let mut product = draft().into_product(ProductId::new("p1"), created).unwrap();
        let later = created + chrono::Duration::seconds(5);

        ProductUpdate {
            price: Some(Decimal::new(1999, 2)),
            ..ProductUpdate::default()
        }
        .apply(&mut product, later)
        .unwrap();

        assert_eq!(product.image, "https://img.example.com/lamp.png");
        assert_eq!(product.price, Price::from_cents(1999).unwrap());
        assert_eq!(product.updated_at, later);
        assert_eq!(product.created_at, created);
    }

    #[test]
    fn test_update_is_all_or_nothing() {
        let mut product = draft().into_product(ProductId::new("p1"), Utc::now()).unwrap();
        let before = product.clone();

        let result = ProductUpdate {
            title: Some("New title".to_string()),
            price: Some(Decimal::new(-1, 0)),
            ..ProductUpdate::default()
        }
        .apply(&mut product, Utc::now());

        assert!(result.is_err());
        assert_eq!(product, before);
    }

    #[test]
    fn test_category_defaults_to_active() {
        let category: Category =
            serde_json::from_str(r#"{"id":"c1","name":"Books","slug":"books"}"#).unwrap();
        assert!(category.is_active);
    }
}

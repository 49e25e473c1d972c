//! Product route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use bazaar_core::{Category, CurrencyCode, Product, ProductId};
use serde::Serialize;
use tracing::instrument;

use crate::error::Result;
use crate::state::AppState;

/// Product display data.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: String,
    pub title: String,
    /// Formatted price, e.g. `$19.99`.
    pub price: String,
    pub image: String,
    pub category_id: String,
}

impl ProductView {
    #[must_use]
    pub fn new(product: &Product, currency: CurrencyCode) -> Self {
        Self {
            id: product.id.to_string(),
            title: product.title.clone(),
            price: product.price.display(currency),
            image: product.image.clone(),
            category_id: product.category_id.to_string(),
        }
    }
}

/// Category display data.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryView {
    pub id: String,
    pub name: String,
    pub slug: String,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name.clone(),
            slug: category.slug.to_string(),
        }
    }
}

/// Display product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductView>> {
    let product = state.catalog().product(&ProductId::new(id)).await?;
    Ok(Json(ProductView::new(&product, state.config().currency)))
}

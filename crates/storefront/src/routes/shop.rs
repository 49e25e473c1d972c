//! Shop listing route handlers.
//!
//! `GET /shop?category=<slug>` lists the products of one category. A missing
//! or unknown slug lists every product.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::products::{CategoryView, ProductView};
use crate::error::Result;
use crate::state::AppState;

/// Shop query parameters.
#[derive(Debug, Deserialize)]
pub struct ShopQuery {
    pub category: Option<String>,
}

/// Shop listing display data.
#[derive(Debug, Serialize)]
pub struct ShopView {
    pub categories: Vec<CategoryView>,
    /// Slug of the selected category, if the requested one exists.
    pub active_category: Option<String>,
    pub products: Vec<ProductView>,
}

/// Display the shop listing.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ShopQuery>,
) -> Result<Json<ShopView>> {
    let requested = query.category.as_deref().filter(|slug| !slug.is_empty());
    let listing = state.catalog().shop(requested).await?;
    let currency = state.config().currency;

    Ok(Json(ShopView {
        categories: listing.categories.iter().map(CategoryView::from).collect(),
        active_category: listing
            .active_category
            .map(|category| category.slug.to_string()),
        products: listing
            .products
            .iter()
            .map(|product| ProductView::new(product, currency))
            .collect(),
    }))
}

/// List active categories.
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<CategoryView>>> {
    let categories = state.catalog().categories(true).await?;
    Ok(Json(categories.iter().map(CategoryView::from).collect()))
}

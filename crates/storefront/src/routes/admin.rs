//! Catalog management route handlers.
//!
//! Served only on the admin listener. Products and categories are returned
//! as stored, including inactive categories.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use bazaar_core::{Category, CategoryFilter, Product, ProductDraft, ProductId, ProductUpdate};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::images::UploadedImage;
use crate::state::AppState;

/// Multipart field holding the uploaded image.
pub const UPLOAD_FIELD: &str = "file";

/// List all products.
#[instrument(skip(state))]
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = state.catalog().products(&CategoryFilter::All).await?;
    Ok(Json(products))
}

/// Create a product.
#[instrument(skip(state, draft))]
pub async fn create_product(
    State(state): State<AppState>,
    Json(draft): Json<ProductDraft>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = state.catalog().create_product(draft).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Show one product.
#[instrument(skip(state))]
pub async fn show_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let product = state.catalog().product(&ProductId::new(id)).await?;
    Ok(Json(product))
}

/// Apply a partial update to a product.
#[instrument(skip(state, update))]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<ProductUpdate>,
) -> Result<Json<Product>> {
    let product = state
        .catalog()
        .update_product(&ProductId::new(id), update)
        .await?;
    Ok(Json(product))
}

/// List every category, active or not.
#[instrument(skip(state))]
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = state.catalog().categories(false).await?;
    Ok(Json(categories))
}

/// Upload a product image from the `file` multipart field.
#[instrument(skip(state, multipart))]
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadedImage>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_owned);
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_owned();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let image = state
            .images()
            .upload(file_name.as_deref(), &content_type, &bytes)
            .await?;
        return Ok((StatusCode::CREATED, Json(image)));
    }

    Err(AppError::BadRequest(format!(
        "missing multipart field: {UPLOAD_FIELD}"
    )))
}

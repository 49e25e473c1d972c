//! Cart route handlers.
//!
//! Each visitor's cart is a `bazaar_core::Cart` stored in their session.
//! Handlers load it, apply one mutation, save it back, and return the
//! updated cart. `session_lock_middleware` keeps two writes from one
//! session from interleaving.

use axum::{Json, extract::State};
use bazaar_core::{Cart, CartLineItem, CurrencyCode, ProductId};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::models::session_keys;
use crate::state::AppState;

/// Cart item display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub id: String,
    pub title: String,
    pub image: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

/// Cart count badge data.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CartCountView {
    pub count: u32,
}

// =============================================================================
// Type Conversions
// =============================================================================

impl CartItemView {
    fn new(item: &CartLineItem, currency: CurrencyCode) -> Self {
        Self {
            id: item.id.to_string(),
            title: item.title.clone(),
            image: item.image.clone(),
            quantity: item.quantity.get(),
            price: item.price.display(currency),
            line_price: item.line_total().display(currency),
        }
    }
}

impl CartView {
    #[must_use]
    pub fn new(cart: &Cart, currency: CurrencyCode) -> Self {
        Self {
            items: cart
                .items()
                .iter()
                .map(|item| CartItemView::new(item, currency))
                .collect(),
            subtotal: cart.subtotal().display(currency),
            item_count: cart.item_count(),
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the visitor's cart, or an empty one.
async fn load_cart(session: &Session) -> Result<Cart> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

/// Store the visitor's cart.
async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    session.insert(session_keys::CART, cart).await?;
    Ok(())
}

fn respond(state: &AppState, cart: &Cart) -> Json<CartView> {
    Json(CartView::new(cart, state.config().currency))
}

// =============================================================================
// Request Bodies
// =============================================================================

/// Add to cart request.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
}

/// Update quantity request.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Remove from cart request.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub product_id: ProductId,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let cart = load_cart(&session).await?;
    Ok(respond(&state, &cart))
}

/// Add one unit of a product to the cart.
///
/// A product already in the cart has its quantity incremented; its stored
/// title, image, and price are kept.
#[instrument(skip(state, session), fields(product_id = %request.product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let product = state.catalog().product(&request.product_id).await?;

    let mut cart = load_cart(&session).await?;
    cart.add_product(&product);
    save_cart(&session, &cart).await?;

    add_breadcrumb("cart", "Added product", Some(&[("product_id", product.id.as_str())]));
    tracing::info!(items = cart.len(), "Product added to cart");
    Ok(respond(&state, &cart))
}

/// Set the quantity of an item already in the cart.
///
/// Quantities below one are rejected and leave the cart unchanged. An id that
/// is not in the cart is ignored.
#[instrument(skip(state, session), fields(product_id = %request.product_id))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<UpdateCartRequest>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;

    if cart.modify_quantity(&request.product_id, request.quantity)? {
        save_cart(&session, &cart).await?;
    } else {
        tracing::debug!("Quantity update for item not in cart ignored");
    }

    Ok(respond(&state, &cart))
}

/// Remove an item from the cart.
#[instrument(skip(state, session), fields(product_id = %request.product_id))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<RemoveFromCartRequest>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;

    if cart.remove_item(&request.product_id) {
        save_cart(&session, &cart).await?;
    }

    Ok(respond(&state, &cart))
}

/// Empty the cart.
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    cart.clear();
    save_cart(&session, &cart).await?;
    Ok(respond(&state, &cart))
}

/// Cart count badge.
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<Json<CartCountView>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartCountView {
        count: cart.item_count(),
    }))
}

//! HTTP route handlers.
//!
//! # Route Structure
//!
//! Public listener:
//!
//! ```text
//! GET  /health                 - Health check
//! GET  /health/ready           - Catalog readiness check
//!
//! # Shop
//! GET  /shop?category=:slug    - Product listing, optionally filtered by category
//! GET  /categories             - Active categories
//! GET  /products/:id           - Product detail
//! GET  /images/*               - Uploaded images
//!
//! # Cart (JSON, session-scoped)
//! GET  /cart                   - Cart contents and subtotal
//! POST /cart/add               - Add one unit of a product
//! POST /cart/update            - Set an item's quantity
//! POST /cart/remove            - Remove an item
//! POST /cart/clear             - Empty the cart
//! GET  /cart/count             - Cart count badge
//! ```
//!
//! Admin listener:
//!
//! ```text
//! GET  /health                 - Health check
//! GET  /admin/products         - All products
//! POST /admin/products         - Create product
//! GET  /admin/products/:id     - Product detail
//! PUT  /admin/products/:id     - Partial product update
//! GET  /admin/categories       - All categories, including inactive
//! POST /admin/uploads          - Upload a product image (multipart `file`)
//! ```

pub mod admin;
pub mod cart;
pub mod products;
pub mod shop;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Build the public storefront router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/shop", get(shop::index))
        .route("/categories", get(shop::categories))
        .route("/products/{id}", get(products::show))
        .nest("/cart", cart_routes())
}

/// Build the catalog management router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/products",
            get(admin::list_products).post(admin::create_product),
        )
        .route(
            "/products/{id}",
            get(admin::show_product).put(admin::update_product),
        )
        .route("/categories", get(admin::list_categories))
        .route("/uploads", post(admin::upload_image))
}

//! Integration tests for the shop listing and product pages.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use bazaar_integration_tests::TestContext;
use bazaar_storefront::middleware::request_id::REQUEST_ID_HEADER;
use serde_json::Value;

fn product_ids(listing: &Value) -> Vec<&str> {
    listing["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|product| product["id"].as_str().unwrap())
        .collect()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let mut ctx = TestContext::new();
    let response = ctx.get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(&response.body[..], b"ok");
    assert!(response.headers.contains_key(REQUEST_ID_HEADER));
    assert_eq!(response.headers.get("x-content-type-options").unwrap(), "nosniff");
}

#[tokio::test]
async fn test_readiness() {
    let mut ctx = TestContext::new();
    assert_eq!(ctx.get("/health/ready").await.status, StatusCode::OK);
}

// =============================================================================
// Category Filter
// =============================================================================

#[tokio::test]
async fn test_shop_lists_everything_without_filter() {
    let mut ctx = TestContext::new();
    let listing = ctx.get("/shop").await.json();

    assert_eq!(product_ids(&listing), ["p-atlas", "p-ink", "p-novel", "p-pen"]);
    assert!(listing["active_category"].is_null());

    let slugs: Vec<&str> = listing["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|category| category["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, ["books", "stationery"]);
}

#[tokio::test]
async fn test_shop_filters_by_category_slug() {
    let mut ctx = TestContext::new();
    let listing = ctx.get("/shop?category=stationery").await.json();

    assert_eq!(listing["active_category"], "stationery");
    assert_eq!(product_ids(&listing), ["p-ink", "p-pen"]);
}

#[tokio::test]
async fn test_shop_unknown_slug_shows_everything() {
    let mut ctx = TestContext::new();

    for uri in ["/shop?category=garden", "/shop?category=", "/shop?category=archive"] {
        let response = ctx.get(uri).await;
        assert_eq!(response.status, StatusCode::OK, "{uri}");

        let listing = response.json();
        assert!(listing["active_category"].is_null(), "{uri}");
        assert_eq!(listing["products"].as_array().unwrap().len(), 4, "{uri}");
    }
}

#[tokio::test]
async fn test_categories_hide_inactive() {
    let mut ctx = TestContext::new();
    let categories = ctx.get("/categories").await.json();

    let names: Vec<&str> = categories
        .as_array()
        .unwrap()
        .iter()
        .map(|category| category["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Books", "Stationery"]);
}

// =============================================================================
// Product Detail
// =============================================================================

#[tokio::test]
async fn test_product_detail() {
    let mut ctx = TestContext::new();
    let response = ctx.get("/products/p-novel").await;

    assert_eq!(response.status, StatusCode::OK);
    let product = response.json();
    assert_eq!(product["title"], "Novel");
    assert_eq!(product["price"], "$12.50");
    assert_eq!(product["image"], "/images/novel.png");
    assert_eq!(product["category_id"], "c-books");
}

#[tokio::test]
async fn test_product_not_found() {
    let mut ctx = TestContext::new();
    let response = ctx.get("/products/p-missing").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["error"], "Product not found: p-missing");
}

#[tokio::test]
async fn test_admin_routes_not_on_public_listener() {
    let mut ctx = TestContext::new();
    assert_eq!(
        ctx.get("/admin/products").await.status,
        StatusCode::NOT_FOUND
    );
}

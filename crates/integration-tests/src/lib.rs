//! Integration tests for Bazaar.
//!
//! Tests drive the public and admin routers in-process with
//! `tower::ServiceExt::oneshot`; no listener or external service is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bazaar-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_routes` - Session carts
//! - `shop_routes` - Shop listing, category filter, product pages
//! - `admin_routes` - Catalog management and image uploads

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use bazaar_storefront::catalog::{CatalogSeed, MemoryCatalog};
use bazaar_storefront::config::StorefrontConfig;
use bazaar_storefront::images::LocalImageHost;
use bazaar_storefront::state::AppState;
use bazaar_storefront::{admin_app, public_app};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Catalog every test starts from.
///
/// `archive` is inactive, so it never shows up in the shop's category list.
pub const SEED: &str = r#"{
    "categories": [
        { "id": "c-books", "name": "Books", "slug": "books" },
        { "id": "c-stationery", "name": "Stationery", "slug": "stationery" },
        { "id": "c-archive", "name": "Archive", "slug": "archive", "is_active": false }
    ],
    "products": [
        { "id": "p-atlas", "title": "Atlas", "price": "40.00", "image": "/images/atlas.png", "category_id": "c-books" },
        { "id": "p-ink", "title": "Ink", "price": "15.00", "image": "https://cdn.example.com/ink.png", "category_id": "c-stationery" },
        { "id": "p-novel", "title": "Novel", "price": "12.50", "image": "/images/novel.png", "category_id": "c-books" },
        { "id": "p-pen", "title": "Pen", "price": "10.00", "image": "/images/pen.png", "category_id": "c-stationery" }
    ]
}"#;

/// Multipart boundary used by [`multipart_body`].
pub const BOUNDARY: &str = "bazaar-test-boundary";

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    /// Parse the body as JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// Both routers over one seeded catalog, plus a cookie jar for one visitor.
pub struct TestContext {
    pub public: Router,
    pub admin: Router,
    pub uploads: TempDir,
    cookie: Option<String>,
}

impl TestContext {
    /// Build a context with the [`SEED`] catalog and a temporary upload dir.
    #[must_use]
    pub fn new() -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let upload_dir = uploads.path().to_string_lossy().into_owned();

        let config = StorefrontConfig::from_lookup(|key| match key {
            "STOREFRONT_BASE_URL" => Some("http://localhost:3000".to_string()),
            "UPLOAD_DIR" => Some(upload_dir.clone()),
            "UPLOAD_MAX_BYTES" => Some("1024".to_string()),
            _ => None,
        })
        .unwrap();

        let seed: CatalogSeed = serde_json::from_str(SEED).unwrap();
        let catalog = Arc::new(MemoryCatalog::from_seed(seed).unwrap());
        let images = Arc::new(LocalImageHost::new(&config.uploads));
        let state = AppState::new(config, catalog, images);

        Self {
            public: public_app(state.clone()),
            admin: admin_app(state),
            uploads,
            cookie: None,
        }
    }

    /// Forget the session cookie, as a new visitor would.
    pub fn new_visitor(&mut self) {
        self.cookie = None;
    }

    /// The visitor's `name=value` session cookie, once one has been set.
    #[must_use]
    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    /// Send a request to the public router, carrying the session cookie.
    pub async fn send_public(&mut self, mut request: Request<Body>) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = send(&self.public, request).await;

        if let Some(set_cookie) = response.headers.get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }
        response
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send_public(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(&mut self, uri: &str, body: &Value) -> TestResponse {
        self.send_public(json_request("POST", uri, body)).await
    }

    /// Send a request to the admin router.
    pub async fn send_admin(&self, request: Request<Body>) -> TestResponse {
        send(&self.admin, request).await
    }

    pub async fn admin_get(&self, uri: &str) -> TestResponse {
        self.send_admin(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Send one request through `router` and buffer the response.
pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    TestResponse {
        status,
        headers,
        body,
    }
}

/// Build a JSON request.
#[must_use]
pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a `multipart/form-data` body with a single file field.
#[must_use]
pub fn multipart_body(field: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
         Content-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Build an upload request for the admin router.
#[must_use]
pub fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::post("/admin/uploads")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

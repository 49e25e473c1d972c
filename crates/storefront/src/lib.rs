//! Bazaar Storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused. The binary in `main.rs` wires the
//! two routers built here to their listeners:
//!
//! - [`public_app`] - shop listing, product pages, session carts, uploaded images
//! - [`admin_app`] - catalog management and image uploads

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod images;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::{DefaultBodyLimit, State},
    http::{Request, Response, StatusCode},
    routing::get,
};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    services::ServeDir,
    trace::{DefaultOnRequest, DefaultOnResponse, OnResponse, TraceLayer},
};
use tracing::Span;

use crate::images::IMAGES_URL_PREFIX;
use crate::state::AppState;

/// Room left for multipart boundaries and headers around an upload.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the public storefront router.
pub fn public_app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());
    let images = ServeDir::new(&state.config().uploads.dir);

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service(IMAGES_URL_PREFIX, images)
        .layer(session_layer)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::session_lock_middleware,
        ))
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(trace_layer())
        .with_state(state)
}

/// Build the catalog management router.
pub fn admin_app(state: AppState) -> Router {
    let body_limit = state
        .config()
        .uploads
        .max_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/admin", routes::admin_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(trace_layer())
        .with_state(state)
}

type HttpTraceLayer = TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    fn(&Request<Body>) -> Span,
    DefaultOnRequest,
    fn(&Response<Body>, Duration, &Span),
>;

/// Request tracing with a span per request. `request_id` is filled in by
/// [`middleware::request_id_middleware`].
fn trace_layer() -> HttpTraceLayer {
    TraceLayer::new_for_http()
        .make_span_with(make_span as fn(&Request<Body>) -> Span)
        .on_response(record_response as fn(&Response<Body>, Duration, &Span))
}

fn make_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = tracing::field::Empty,
        status = tracing::field::Empty,
        latency_ms = tracing::field::Empty,
    )
}

fn record_response(response: &Response<Body>, latency: Duration, span: &Span) {
    span.record("status", response.status().as_u16());
    span.record(
        "latency_ms",
        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
    );
    DefaultOnResponse::default().on_response(response, latency, span);
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the catalog store does not answer.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.catalog().check().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!("Catalog not ready: {e}");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

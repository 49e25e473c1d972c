//! Bazaar Storefront - Shop, cart, and catalog management.
//!
//! This binary serves two listeners:
//!
//! - Public storefront on port 3000: shop listing, products, session carts
//! - Catalog management on 127.0.0.1:3001: product edits and image uploads
//!
//! # Security
//!
//! The admin listener has no login of its own. It binds to loopback by
//! default and must only be exposed through a trusted network.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use axum::Router;
use bazaar_storefront::catalog::{CatalogStore, MemoryCatalog};
use bazaar_storefront::config::StorefrontConfig;
use bazaar_storefront::images::LocalImageHost;
use bazaar_storefront::state::AppState;
use bazaar_storefront::{admin_app, public_app};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Wrap a router in the Sentry layers (outermost for full request coverage).
fn with_sentry(app: Router) -> Router {
    app.layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bazaar_storefront=info,tower_http=debug".into());

    // JSON logs when LOG_FORMAT=json, text otherwise
    let is_json = std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json");
    let json_layer = is_json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!is_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    // Load the catalog
    let catalog: Arc<dyn CatalogStore> = match &config.catalog_seed_path {
        Some(path) => Arc::new(
            MemoryCatalog::from_seed_file(path)
                .await
                .expect("Failed to load catalog seed"),
        ),
        None => {
            tracing::warn!("CATALOG_SEED_PATH not set, starting with an empty catalog");
            Arc::new(MemoryCatalog::new())
        }
    };

    let images = Arc::new(LocalImageHost::new(&config.uploads));
    tracing::info!(dir = %images.dir().display(), "Serving uploads");

    let state = AppState::new(config.clone(), catalog, images);

    let public = with_sentry(public_app(state.clone()));
    let admin = with_sentry(admin_app(state));

    // Start servers
    let public_addr = config.socket_addr();
    let admin_addr = config.admin_socket_addr();

    let public_listener = tokio::net::TcpListener::bind(public_addr)
        .await
        .expect("Failed to bind storefront address");
    let admin_listener = tokio::net::TcpListener::bind(admin_addr)
        .await
        .expect("Failed to bind admin address");

    tracing::info!("storefront listening on http://{}", public_addr);
    tracing::info!("admin listening on http://{}", admin_addr);

    let public_server =
        axum::serve(public_listener, public).with_graceful_shutdown(shutdown_signal());
    let admin_server =
        axum::serve(admin_listener, admin).with_graceful_shutdown(shutdown_signal());

    tokio::try_join!(
        async { public_server.await },
        async { admin_server.await },
    )
    .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

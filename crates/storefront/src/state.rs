//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::{CatalogService, CatalogStore};
use crate::config::StorefrontConfig;
use crate::images::ImageHost;
use crate::middleware::session_lock::SessionLocks;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the catalog, the image host, and configuration. Carts are not held here;
/// each lives in its owner's session, guarded by a lock from `session_locks`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: CatalogService,
    images: Arc<dyn ImageHost>,
    session_locks: SessionLocks,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `store` - Catalog backend
    /// * `images` - Image upload destination
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        store: Arc<dyn CatalogStore>,
        images: Arc<dyn ImageHost>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog: CatalogService::new(store),
                images,
                session_locks: SessionLocks::new(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog service.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Get a reference to the image host.
    #[must_use]
    pub fn images(&self) -> &dyn ImageHost {
        self.inner.images.as_ref()
    }

    /// Get a reference to the per-session request locks.
    #[must_use]
    pub fn session_locks(&self) -> &SessionLocks {
        &self.inner.session_locks
    }
}

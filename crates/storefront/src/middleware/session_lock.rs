//! Per-session request serialization.
//!
//! Cart handlers read the cart from the session, change it, and the session
//! layer writes it back after the handler returns. Two overlapping writes
//! from one visitor would each start from the same cart. This middleware
//! sits outside the session layer and holds a lock keyed by the session
//! cookie from before the session is loaded until after it is saved.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::header::COOKIE,
    middleware::Next,
    response::Response,
};
use moka::future::Cache;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tower_sessions::cookie::Cookie;

use super::session::SESSION_COOKIE_NAME;
use crate::state::AppState;

/// Locks idle this long are dropped.
const LOCK_IDLE_SECONDS: u64 = 60 * 60;

/// One mutex per live session cookie.
#[derive(Clone)]
pub struct SessionLocks {
    locks: Cache<String, Arc<Mutex<()>>>,
}

impl SessionLocks {
    #[must_use]
    pub fn new() -> Self {
        Self {
            locks: Cache::builder()
                .max_capacity(100_000)
                .time_to_idle(Duration::from_secs(LOCK_IDLE_SECONDS))
                .build(),
        }
    }

    /// Wait for exclusive use of the session identified by `session_key`.
    pub async fn acquire(&self, session_key: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .get_with(session_key.to_string(), async { Arc::new(Mutex::new(())) })
            .await;
        lock.lock_owned().await
    }
}

impl Default for SessionLocks {
    fn default() -> Self {
        Self::new()
    }
}

/// The session cookie's value, if the request carries one.
fn session_cookie(request: &Request) -> Option<String> {
    request
        .headers()
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
}

/// Serialize state-changing requests that share a session.
///
/// Reads and requests without a session cookie pass straight through. A
/// request without a cookie starts a fresh session nobody else can hold.
pub async fn session_lock_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if request.method().is_safe() {
        return next.run(request).await;
    }
    let Some(session_key) = session_cookie(&request) else {
        return next.run(request).await;
    };

    let _guard = state.session_locks().acquire(&session_key).await;
    next.run(request).await
}

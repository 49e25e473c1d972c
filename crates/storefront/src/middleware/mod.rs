//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors), added by `main.rs` around both routers
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (nosniff, frame denial, no referrer)
//! 5. Session lock (serialize writes within one session, public app only)
//! 6. Session layer (tower-sessions with in-memory store, public app only)
//!
//! The admin app has no session layers; its innermost layer is the request
//! body limit sized for image uploads.

pub mod request_id;
pub mod security_headers;
pub mod session;
pub mod session_lock;

pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
pub use session_lock::session_lock_middleware;

//! Request-scoped models for the storefront.
//!
//! Catalog and cart records live in `bazaar_core`; this module only holds
//! what the HTTP layer keeps in the session.

pub mod session;

pub use session::keys as session_keys;

//! Session-related types.
//!
//! Each visitor's cart is stored in their session, so carts are never shared
//! between sessions.

/// Session keys for storefront data.
pub mod keys {
    /// Key for the visitor's serialized `bazaar_core::Cart`.
    pub const CART: &str = "cart";
}

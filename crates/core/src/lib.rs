//! Bazaar Core - Domain types and cart logic.
//!
//! This crate provides the types and pure rules shared by the storefront:
//!
//! - [`types`] - Newtype wrappers for IDs, prices, quantities, and slugs
//! - [`cart`] - The shopping cart state machine
//! - [`catalog`] - Products, categories, the category filter, and admin input validation
//!
//! # Architecture
//!
//! The core crate contains only types and logic - no I/O, no storage, no HTTP.
//! This keeps it lightweight and allows it to be used anywhere.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod types;

pub use cart::{Cart, CartError, CartLineItem};
pub use catalog::{
    Category, CategoryFilter, Product, ProductDraft, ProductDraftError, ProductUpdate,
    select_category,
};
pub use types::*;

#[doc(hidden)]
pub mod __private {
    pub use uuid::Uuid;
}

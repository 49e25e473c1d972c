//! Shopping cart state.
//!
//! A [`Cart`] is an ordered list of line items, unique by product id. It is
//! mutated only through [`Cart::add_product`], [`Cart::remove_item`],
//! [`Cart::modify_quantity`] and [`Cart::clear`]; callers only ever see
//! shared references to its line items.
//!
//! Line items snapshot the product's title, image, and price when first
//! added. Later catalog edits do not reach items already in a cart.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::{Price, ProductId, Quantity, QuantityError};

/// Errors returned by cart mutations.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartError {
    /// The requested quantity would break the `quantity >= 1` invariant.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(#[from] QuantityError),
}

/// One product-and-quantity pair held in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub id: ProductId,
    pub title: String,
    pub image: String,
    /// Unit price at the time the product was first added.
    pub price: Price,
    pub quantity: Quantity,
}

impl CartLineItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// An in-memory shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Look up the line item for a product.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Number of distinct line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add one unit of `product`.
    ///
    /// If the product is already in the cart only its quantity changes; the
    /// incoming title, image, and price are ignored.
    pub fn add_product(&mut self, product: &Product) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == product.id) {
            item.quantity = item.quantity.incremented();
            return;
        }

        self.items.push(CartLineItem {
            id: product.id.clone(),
            title: product.title.clone(),
            image: product.image.clone(),
            price: product.price,
            quantity: Quantity::ONE,
        });
    }

    /// Remove the line item for `id`. Returns `false` if there was none.
    pub fn remove_item(&mut self, id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.id != id);
        self.items.len() != before
    }

    /// Set the quantity of the line item for `id`.
    ///
    /// Returns `Ok(false)` without touching the cart when `id` is not present.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` if `quantity` is below 1 or does
    /// not fit in a `u32`. The cart is left unchanged.
    pub fn modify_quantity(&mut self, id: &ProductId, quantity: i64) -> Result<bool, CartError> {
        let quantity = Quantity::new(quantity)?;

        let Some(item) = self.items.iter_mut().find(|item| &item.id == id) else {
            return Ok(false);
        };
        item.quantity = quantity;
        Ok(true)
    }

    /// Remove every line item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of `price * quantity` over all line items.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    /// Total number of units across all line items.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |acc, item| acc.saturating_add(item.quantity.get()))
    }
}

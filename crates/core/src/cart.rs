//! Cart reconciliation.
//!
//! A [`Cart`] holds at most one [`CartItem`] per product. Adding a product that
//! is already present increments its quantity instead of appending a second
//! line. Every mutation reports a [`LineChange`] so a caller that mirrors the
//! cart into a remote store knows exactly which row to write.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::pricing::OrderTotals;
use crate::types::ProductId;

/// Most units of one product a cart line can hold.
pub const MAX_LINE_QUANTITY: u32 = 10_000;

/// A product and how many of it the shopper wants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    /// Always at least 1 while the item is in a cart.
    pub quantity: u32,
}

impl CartItem {
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product.id
    }
}

/// Effect of a cart mutation on a single product line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineChange {
    /// The line now exists with this quantity.
    Set {
        product_id: ProductId,
        quantity: u32,
    },
    /// The line was removed.
    Removed { product_id: ProductId },
    /// Nothing changed.
    Unchanged,
}

/// Ordered collection of cart items, unique by product id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from stored lines, folding duplicate products together.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            cart.add_item(item.product, item.quantity);
        }
        cart
    }

    /// Add `quantity` of `product`.
    ///
    /// If the product is already in the cart its quantity is incremented,
    /// otherwise a new line is appended. Adding zero is a no-op. Quantities
    /// are capped at [`MAX_LINE_QUANTITY`].
    pub fn add_item(&mut self, product: Product, quantity: u32) -> LineChange {
        if quantity == 0 {
            return LineChange::Unchanged;
        }

        let product_id = product.id;
        let quantity = match self.position(product_id) {
            Some(index) => {
                let Some(item) = self.items.get_mut(index) else {
                    return LineChange::Unchanged;
                };
                item.quantity = item.quantity.saturating_add(quantity).min(MAX_LINE_QUANTITY);
                item.quantity
            }
            None => {
                let quantity = quantity.min(MAX_LINE_QUANTITY);
                self.items.push(CartItem { product, quantity });
                quantity
            }
        };

        LineChange::Set {
            product_id,
            quantity,
        }
    }

    /// Remove any line for `product_id`.
    pub fn remove_item(&mut self, product_id: ProductId) -> LineChange {
        let before = self.items.len();
        self.items.retain(|item| item.product_id() != product_id);
        if self.items.len() == before {
            LineChange::Unchanged
        } else {
            LineChange::Removed { product_id }
        }
    }

    /// Set the quantity of an existing line.
    ///
    /// A quantity of zero or less removes the line and anything above
    /// [`MAX_LINE_QUANTITY`] is capped. Setting the quantity of a product that
    /// is not in the cart does nothing.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i64) -> LineChange {
        if quantity <= 0 {
            return self.remove_item(product_id);
        }

        let quantity = u32::try_from(quantity)
            .unwrap_or(u32::MAX)
            .min(MAX_LINE_QUANTITY);
        match self
            .items
            .iter_mut()
            .find(|item| item.product_id() == product_id)
        {
            Some(item) => {
                item.quantity = quantity;
                LineChange::Set {
                    product_id,
                    quantity,
                }
            }
            None => LineChange::Unchanged,
        }
    }

    /// Fold every line of `other` into this cart using the add rule.
    ///
    /// Returns the changes in the order they were applied.
    pub fn merge(&mut self, other: Self) -> Vec<LineChange> {
        other
            .items
            .into_iter()
            .map(|item| self.add_item(item.product, item.quantity))
            .filter(|change| *change != LineChange::Unchanged)
            .collect()
    }

    /// Cart lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Line for a product, if present.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id() == product_id)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines (the cart badge count).
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Subtotal, shipping fee and grand total for this cart.
    #[must_use]
    pub fn totals(&self) -> OrderTotals {
        OrderTotals::for_items(&self.items)
    }

    /// Consume the cart, returning its lines.
    #[must_use]
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.product_id() == product_id)
    }
}

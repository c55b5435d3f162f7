//! Order total computation.
//!
//! Shipping is a flat fee that is waived once the subtotal is strictly above
//! the free-shipping threshold. Both values are store policy and are applied
//! in whatever single currency the store uses.

use serde::{Deserialize, Serialize};

use crate::cart::CartItem;
use crate::types::Money;

/// Subtotal above which shipping is free.
pub const FREE_SHIPPING_THRESHOLD: u32 = 500;

/// Shipping fee charged at or below the threshold.
pub const FLAT_SHIPPING_FEE: u32 = 50;

/// Money breakdown for a cart or order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub total: Money,
}

impl OrderTotals {
    /// Compute totals for a list of cart items.
    #[must_use]
    pub fn for_items(items: &[CartItem]) -> Self {
        Self::from_subtotal(subtotal(items))
    }

    /// Compute fee and total from a known subtotal.
    #[must_use]
    pub fn from_subtotal(subtotal: Money) -> Self {
        let shipping_fee = shipping_fee(subtotal);
        Self {
            subtotal,
            shipping_fee,
            total: subtotal + shipping_fee,
        }
    }
}

/// Sum of unit price times quantity.
#[must_use]
pub fn subtotal(items: &[CartItem]) -> Money {
    items
        .iter()
        .map(|item| item.product.price * item.quantity)
        .sum()
}

/// Shipping fee for a subtotal: free strictly above the threshold.
#[must_use]
pub fn shipping_fee(subtotal: Money) -> Money {
    if subtotal > Money::from_units(FREE_SHIPPING_THRESHOLD) {
        Money::ZERO
    } else {
        Money::from_units(FLAT_SHIPPING_FEE)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::product;

    fn item(price_minor: u64, quantity: u32) -> CartItem {
        CartItem {
            product: product("p", price_minor),
            quantity,
        }
    }

    #[test]
    fn test_mixed_cart_below_threshold() {
        let items = vec![item(14999, 1), item(8500, 2)];
        let totals = OrderTotals::for_items(&items);
        assert_eq!(totals.subtotal, Money::from_minor(31999));
        assert_eq!(totals.shipping_fee, Money::from_units(50));
        assert_eq!(totals.total, Money::from_minor(36999));
    }

    #[test]
    fn test_free_shipping_above_threshold() {
        let totals = OrderTotals::from_subtotal(Money::from_units(501));
        assert_eq!(totals.shipping_fee, Money::ZERO);
        assert_eq!(totals.total, Money::from_units(501));
    }

    #[test]
    fn test_threshold_is_strict() {
        assert_eq!(shipping_fee(Money::from_units(500)), Money::from_units(50));
        assert_eq!(shipping_fee(Money::from_minor(50001)), Money::ZERO);
        assert_eq!(shipping_fee(Money::ZERO), Money::from_units(50));
    }

    #[test]
    fn test_subtotal_is_order_independent() {
        let mut items = vec![item(14999, 1), item(8500, 2), item(333, 7), item(1, 1)];
        let expected = subtotal(&items);
        items.reverse();
        assert_eq!(subtotal(&items), expected);
        items.rotate_left(2);
        assert_eq!(subtotal(&items), expected);
    }

    #[test]
    fn test_empty_cart() {
        let totals = OrderTotals::for_items(&[]);
        assert_eq!(totals.subtotal, Money::ZERO);
        assert_eq!(totals.total, Money::from_units(50));
    }
}

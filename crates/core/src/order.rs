//! Orders and order statistics.
//!
//! An order is a snapshot: items carry the unit price at the time of purchase
//! so later catalog edits never change what the shopper was charged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::address::ShippingAddress;
use crate::cart::{Cart, CartItem};
use crate::pricing::OrderTotals;
use crate::types::{Money, OrderId, OrderStatus, PaymentMethod, ProductId, UserId};

/// One purchased line, frozen at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub title: String,
    /// Unit price at purchase time.
    pub price: Money,
    pub quantity: u32,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl OrderItem {
    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.price * self.quantity
    }
}

impl From<&CartItem> for OrderItem {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product.id,
            title: item.product.title.clone(),
            price: item.product.price,
            quantity: item.quantity,
            image_url: item.product.image_url.clone(),
        }
    }
}

/// An order ready to be written. The backend assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    /// `None` for guest checkout.
    pub user_id: Option<UserId>,
    pub items: Vec<OrderItem>,
    /// Grand total including shipping.
    pub total_amount: Money,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub is_paid: bool,
}

impl NewOrder {
    /// Snapshot a cart into a pending order.
    #[must_use]
    pub fn from_cart(
        user_id: Option<UserId>,
        cart: &Cart,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
    ) -> Self {
        let totals = cart.totals();
        Self {
            user_id,
            items: cart.items().iter().map(OrderItem::from).collect(),
            total_amount: totals.total,
            shipping_address,
            payment_method,
            status: OrderStatus::Pending,
            is_paid: payment_method.is_prepaid(),
        }
    }
}

/// A stored order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: Option<UserId>,
    pub items: Vec<OrderItem>,
    pub total_amount: Money,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Materialize a new order with an assigned id and timestamp.
    #[must_use]
    pub fn from_new(id: OrderId, order: NewOrder, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: order.user_id,
            items: order.items,
            total_amount: order.total_amount,
            shipping_address: order.shipping_address,
            payment_method: order.payment_method,
            status: order.status,
            is_paid: order.is_paid,
            created_at,
        }
    }

    /// Recompute the money breakdown from the item snapshot.
    #[must_use]
    pub fn totals(&self) -> OrderTotals {
        OrderTotals::from_subtotal(self.items.iter().map(OrderItem::line_total).sum())
    }

    /// Whether the order belongs to `user_id`.
    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == Some(user_id)
    }
}

/// Aggregate figures for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStats {
    pub total_orders: u64,
    /// Sum of totals for paid orders only.
    pub total_revenue: Money,
    pub pending_orders: u64,
    /// Delivered orders.
    pub completed_orders: u64,
}

impl OrderStats {
    #[must_use]
    pub fn from_orders(orders: &[Order]) -> Self {
        orders.iter().fold(Self::default(), |mut stats, order| {
            stats.total_orders += 1;
            if order.is_paid {
                stats.total_revenue = stats.total_revenue + order.total_amount;
            }
            match order.status {
                OrderStatus::Pending => stats.pending_orders += 1,
                OrderStatus::Delivered => stats.completed_orders += 1,
                _ => {}
            }
            stats
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::product;

    fn address() -> ShippingAddress {
        ShippingAddress {
            name: "Asha".to_string(),
            phone: "9876543210".to_string(),
            address_line1: "12 MG Road".to_string(),
            address_line2: None,
            city: "Pune".to_string(),
            state: "MH".to_string(),
            postal_code: "411001".to_string(),
        }
    }

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.add_item(product("Neon Pack", 14999), 1);
        cart.add_item(product("Retro Pack", 8500), 2);
        cart
    }

    fn order(status: OrderStatus, is_paid: bool, total_minor: u64) -> Order {
        Order {
            id: OrderId::generate(),
            user_id: None,
            items: vec![],
            total_amount: Money::from_minor(total_minor),
            shipping_address: address(),
            payment_method: PaymentMethod::Cod,
            status,
            is_paid,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_from_cart_snapshots_items_and_total() {
        let user = UserId::generate();
        let new_order = NewOrder::from_cart(Some(user), &cart(), address(), PaymentMethod::Cod);

        assert_eq!(new_order.items.len(), 2);
        assert_eq!(new_order.items.first().unwrap().title, "Neon Pack");
        assert_eq!(new_order.total_amount, Money::from_minor(36999));
        assert_eq!(new_order.status, OrderStatus::Pending);
        assert!(!new_order.is_paid);
    }

    #[test]
    fn test_prepaid_orders_start_paid() {
        let new_order = NewOrder::from_cart(None, &cart(), address(), PaymentMethod::Stripe);
        assert!(new_order.is_paid);
    }

    #[test]
    fn test_item_wire_format_is_camel_case() {
        let item = OrderItem::from(cart().items().first().unwrap());
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("productId").is_some());
        assert!(json.get("imageUrl").is_some());
    }

    #[test]
    fn test_totals_recomputed_from_snapshot() {
        let new_order = NewOrder::from_cart(None, &cart(), address(), PaymentMethod::Cod);
        let order = Order::from_new(OrderId::generate(), new_order, Utc::now());
        let totals = order.totals();
        assert_eq!(totals.subtotal, Money::from_minor(31999));
        assert_eq!(totals.total, order.total_amount);
    }

    #[test]
    fn test_stats() {
        let orders = vec![
            order(OrderStatus::Pending, false, 10000),
            order(OrderStatus::Pending, true, 20000),
            order(OrderStatus::Delivered, true, 5000),
            order(OrderStatus::Cancelled, false, 7000),
        ];
        let stats = OrderStats::from_orders(&orders);
        assert_eq!(stats.total_orders, 4);
        assert_eq!(stats.total_revenue, Money::from_units(250));
        assert_eq!(stats.pending_orders, 2);
        assert_eq!(stats.completed_orders, 1);
    }

    #[test]
    fn test_stats_empty() {
        assert_eq!(OrderStats::from_orders(&[]), OrderStats::default());
    }
}

//! Checkout: validate the address, snapshot the cart into an order, clear
//! the cart.
//!
//! Validation runs before anything is read or written. The order is created
//! before the cart is cleared; if clearing fails the order still stands and
//! the caller is told the cart was left behind.

use neobazaar_backend::{Backend, BackendError};
use neobazaar_core::{
    AddressError, NewOrder, Order, OrderTotals, PaymentMethod, ShippingAddress, UserId,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, instrument};

use super::cart::{CartError, CartService};

/// Checkout form submitted by the shopper.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

/// Errors from placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    InvalidAddress(#[from] AddressError),

    #[error("cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Outcome of a successful checkout.
#[derive(Debug)]
pub struct PlacedOrder {
    pub order: Order,
    pub totals: OrderTotals,
    /// `false` when the order was stored but the cart could not be emptied.
    pub cart_cleared: bool,
}

/// Checkout for one request.
pub struct CheckoutService<'a> {
    backend: &'a Backend,
    carts: &'a CartService<'a>,
    user_id: Option<UserId>,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(
        backend: &'a Backend,
        carts: &'a CartService<'a>,
        user_id: Option<UserId>,
    ) -> Self {
        Self {
            backend,
            carts,
            user_id,
        }
    }

    /// Place an order for the current cart.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidAddress` for the first failed address
    /// rule, `CheckoutError::EmptyCart` when there is nothing to buy, or a
    /// backend error if the order cannot be stored.
    #[instrument(skip(self, request), fields(payment_method = %request.payment_method))]
    pub async fn place_order(&self, request: CheckoutRequest) -> Result<PlacedOrder, CheckoutError> {
        request.shipping_address.validate()?;

        let cart = self.carts.load().await?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let totals = cart.totals();
        let order = NewOrder::from_cart(
            self.user_id,
            &cart,
            request.shipping_address.normalized(),
            request.payment_method,
        );
        let order = self.backend.orders().create_order(order).await?;
        info!(order_id = %order.id, total = %order.total_amount, "Order placed");

        let cart_cleared = match self.carts.clear().await {
            Ok(()) => true,
            Err(e) => {
                error!(order_id = %order.id, error = %e, "Order stored but cart was not cleared");
                false
            }
        };

        Ok(PlacedOrder {
            order,
            totals,
            cart_cleared,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use neobazaar_backend::InMemoryBackend;
    use neobazaar_core::{Money, NewProduct, OrderStatus, ProductPatch};
    use tower_sessions::{MemoryStore, Session};

    use super::*;
    use crate::services::CartOwner;

    fn address() -> ShippingAddress {
        ShippingAddress {
            name: "Ana Lima".to_string(),
            phone: "9876543210".to_string(),
            address_line1: "12 Neon Street".to_string(),
            address_line2: None,
            city: "Pune".to_string(),
            state: "MH".to_string(),
            postal_code: "411001".to_string(),
        }
    }

    async fn backend_with_product(price_minor: u64) -> (Arc<InMemoryBackend>, Backend, neobazaar_core::Product) {
        let store = Arc::new(InMemoryBackend::new());
        let backend = Backend::in_memory(store.clone());
        let product = backend
            .catalog()
            .create_product(NewProduct {
                title: "Synthwave Print".to_string(),
                description: String::new(),
                price: Money::from_minor(price_minor),
                category: "art".to_string(),
                tags: vec![],
                image_url: None,
                stock: None,
                author: None,
                author_handle: None,
            })
            .await
            .unwrap();
        (store, backend, product)
    }

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_invalid_address_rejected_before_cart_read() {
        let backend = Backend::unconfigured();
        let session = session();
        let carts = CartService::new(&backend, &session, CartOwner::Guest);
        let checkout = CheckoutService::new(&backend, &carts, None);

        let mut bad = address();
        bad.phone = "12345".to_string();
        let err = checkout
            .place_order(CheckoutRequest {
                shipping_address: bad,
                payment_method: PaymentMethod::Cod,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::InvalidAddress(AddressError::InvalidPhone)
        ));
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let (_, backend, _) = backend_with_product(10_000).await;
        let session = session();
        let carts = CartService::new(&backend, &session, CartOwner::Guest);
        let checkout = CheckoutService::new(&backend, &carts, None);

        let err = checkout
            .place_order(CheckoutRequest {
                shipping_address: address(),
                payment_method: PaymentMethod::Cod,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
    }

    #[tokio::test]
    async fn test_account_checkout_snapshots_and_clears() {
        let (_, backend, product) = backend_with_product(31_999).await;
        let session = session();
        let user = UserId::generate();
        let carts = CartService::new(&backend, &session, CartOwner::Account(user));
        carts.add(product.id, 1).await.unwrap();

        let checkout = CheckoutService::new(&backend, &carts, Some(user));
        let placed = checkout
            .place_order(CheckoutRequest {
                shipping_address: address(),
                payment_method: PaymentMethod::Razorpay,
            })
            .await
            .unwrap();

        assert!(placed.cart_cleared);
        assert_eq!(placed.order.total_amount, Money::from_minor(36_999));
        assert_eq!(placed.order.status, OrderStatus::Pending);
        assert!(placed.order.is_paid);
        assert_eq!(placed.order.items[0].title, "Synthwave Print");
        assert!(carts.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_order_stands_when_cart_clear_fails() {
        let (store, backend, product) = backend_with_product(60_000).await;
        let session = session();
        let user = UserId::generate();
        let carts = CartService::new(&backend, &session, CartOwner::Account(user));
        carts.add(product.id, 1).await.unwrap();

        store.set_fail_cart_writes(true);
        let checkout = CheckoutService::new(&backend, &carts, Some(user));
        let placed = checkout
            .place_order(CheckoutRequest {
                shipping_address: address(),
                payment_method: PaymentMethod::Cod,
            })
            .await
            .unwrap();

        assert!(!placed.cart_cleared);
        assert_eq!(placed.totals.shipping_fee, Money::ZERO);
        assert_eq!(backend.orders().orders_for_user(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_guest_order_charges_current_price() {
        let (_, backend, product) = backend_with_product(10_000).await;
        let session = session();
        let carts = CartService::new(&backend, &session, CartOwner::Guest);
        carts.add(product.id, 1).await.unwrap();

        backend
            .catalog()
            .update_product(
                product.id,
                ProductPatch {
                    price: Some(Money::from_units(600)),
                    ..ProductPatch::default()
                },
            )
            .await
            .unwrap();

        let placed = CheckoutService::new(&backend, &carts, None)
            .place_order(CheckoutRequest {
                shipping_address: address(),
                payment_method: PaymentMethod::Cod,
            })
            .await
            .unwrap();

        assert_eq!(placed.order.items[0].price, Money::from_units(600));
        assert_eq!(placed.order.total_amount, Money::from_units(600));
    }

    #[tokio::test]
    async fn test_guest_cannot_order_deleted_product() {
        let (_, backend, product) = backend_with_product(10_000).await;
        let session = session();
        let carts = CartService::new(&backend, &session, CartOwner::Guest);
        carts.add(product.id, 2).await.unwrap();
        backend.catalog().delete_product(product.id).await.unwrap();

        let err = CheckoutService::new(&backend, &carts, None)
            .place_order(CheckoutRequest {
                shipping_address: address(),
                payment_method: PaymentMethod::Cod,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
        assert!(backend.orders().all_orders().await.unwrap().is_empty());
    }
}

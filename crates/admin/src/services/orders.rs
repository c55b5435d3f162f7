//! Order administration.
//!
//! Status changes are checked against the order lifecycle here and then
//! written with a compare-and-set on the status the order was read in, so
//! two admins racing on the same order cannot both win.

use neobazaar_backend::{Backend, BackendError};
use neobazaar_core::{Order, OrderId, OrderStats, OrderStatus, StatusTransitionError};
use thiserror::Error;
use tracing::{info, instrument};

/// Errors from order administration.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("order not found: {0}")]
    NotFound(OrderId),

    #[error(transparent)]
    InvalidTransition(#[from] StatusTransitionError),

    /// Another change landed between read and write.
    #[error("order {0} was changed by someone else; reload and retry")]
    Conflict(OrderId),

    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Order administration service.
pub struct OrderService<'a> {
    backend: &'a Backend,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(backend: &'a Backend) -> Self {
        Self { backend }
    }

    /// All orders newest first, optionally only those in `status`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails.
    pub async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, OrderError> {
        let mut orders = self.backend.orders().all_orders().await?;
        if let Some(status) = status {
            orders.retain(|order| order.status == status);
        }
        Ok(orders)
    }

    /// One order.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if no such order exists.
    pub async fn get(&self, id: OrderId) -> Result<Order, OrderError> {
        self.backend
            .orders()
            .get_order(id)
            .await?
            .ok_or(OrderError::NotFound(id))
    }

    /// Move an order to `status`.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InvalidTransition` when the lifecycle forbids the
    /// move, or `OrderError::Conflict` when the order changed underneath us.
    #[instrument(skip(self), fields(order_id = %id, to = %status))]
    pub async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<Order, OrderError> {
        let order = self.get(id).await?;
        let from = order.status;
        let to = from.transition(status)?;

        let updated = self.backend.orders().update_status(id, from, to).await?;
        match updated {
            Some(order) => {
                info!(%from, %to, "Order status updated");
                Ok(order)
            }
            None if self.backend.orders().get_order(id).await?.is_some() => {
                Err(OrderError::Conflict(id))
            }
            None => Err(OrderError::NotFound(id)),
        }
    }

    /// Set or clear the paid flag.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if no such order exists.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn set_paid(&self, id: OrderId, is_paid: bool) -> Result<Order, OrderError> {
        let order = self
            .backend
            .orders()
            .set_paid(id, is_paid)
            .await?
            .ok_or(OrderError::NotFound(id))?;
        info!(is_paid, "Order payment flag updated");
        Ok(order)
    }

    /// Dashboard counters. An unconfigured backend reports zeros.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails.
    pub async fn stats(&self) -> Result<OrderStats, OrderError> {
        let orders = self.backend.orders().all_orders().await?;
        Ok(OrderStats::from_orders(&orders))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use neobazaar_backend::InMemoryBackend;
    use neobazaar_core::{Money, NewOrder, PaymentMethod, ShippingAddress};

    use super::*;

    fn new_order(method: PaymentMethod) -> NewOrder {
        NewOrder {
            user_id: None,
            items: vec![],
            total_amount: Money::from_units(550),
            shipping_address: ShippingAddress::default(),
            payment_method: method,
            status: OrderStatus::Pending,
            is_paid: method.is_prepaid(),
        }
    }

    async fn backend_with_order(method: PaymentMethod) -> (Backend, Order) {
        let backend = Backend::in_memory(Arc::new(InMemoryBackend::new()));
        let order = backend
            .orders()
            .create_order(new_order(method))
            .await
            .unwrap();
        (backend, order)
    }

    #[tokio::test]
    async fn test_lifecycle_walk() {
        let (backend, order) = backend_with_order(PaymentMethod::Cod).await;
        let orders = OrderService::new(&backend);

        for status in [OrderStatus::Processing, OrderStatus::Shipped, OrderStatus::Delivered] {
            let updated = orders.update_status(order.id, status).await.unwrap();
            assert_eq!(updated.status, status);
        }
    }

    #[tokio::test]
    async fn test_illegal_transition_rejected() {
        let (backend, order) = backend_with_order(PaymentMethod::Cod).await;
        let orders = OrderService::new(&backend);

        let err = orders
            .update_status(order.id, OrderStatus::Delivered)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OrderError::InvalidTransition(StatusTransitionError {
                from: OrderStatus::Pending,
                to: OrderStatus::Delivered,
            })
        ));
        assert_eq!(orders.get(order.id).await.unwrap().status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_cancelled_is_terminal() {
        let (backend, order) = backend_with_order(PaymentMethod::Cod).await;
        let orders = OrderService::new(&backend);
        orders
            .update_status(order.id, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert!(
            orders
                .update_status(order.id, OrderStatus::Processing)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let backend = Backend::in_memory(Arc::new(InMemoryBackend::new()));
        let orders = OrderService::new(&backend);
        assert!(matches!(
            orders.set_paid(OrderId::generate(), true).await,
            Err(OrderError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_stats_and_filter() {
        let (backend, cod) = backend_with_order(PaymentMethod::Cod).await;
        backend
            .orders()
            .create_order(new_order(PaymentMethod::Stripe))
            .await
            .unwrap();
        let orders = OrderService::new(&backend);
        orders.update_status(cod.id, OrderStatus::Processing).await.unwrap();

        let stats = orders.stats().await.unwrap();
        assert_eq!(stats.total_orders, 2);
        assert_eq!(stats.pending_orders, 1);
        assert_eq!(stats.total_revenue, Money::from_units(550));

        let pending = orders.list(Some(OrderStatus::Pending)).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].payment_method, PaymentMethod::Stripe);
    }

    #[tokio::test]
    async fn test_stats_zero_when_unconfigured() {
        let backend = Backend::unconfigured();
        let stats = OrderService::new(&backend).stats().await.unwrap();
        assert_eq!(stats.total_orders, 0);
        assert_eq!(stats.total_revenue, Money::ZERO);
    }
}

//! Order commands.

use neobazaar_admin::services::OrderService;
use neobazaar_core::{OrderId, OrderStatus};
use tracing::info;

/// Log the dashboard figures.
///
/// # Errors
///
/// Returns an error if the backend is not configured or the read fails.
pub async fn stats() -> Result<(), Box<dyn std::error::Error>> {
    let backend = super::backend_from_env()?;
    let stats = OrderService::new(&backend).stats().await?;

    info!("Orders: {}", stats.total_orders);
    info!("  Pending: {}", stats.pending_orders);
    info!("  Delivered: {}", stats.completed_orders);
    info!("  Paid revenue: {}", stats.total_revenue);
    Ok(())
}

/// Move an order to `status`, enforcing the order lifecycle.
///
/// # Errors
///
/// Returns an error if the order is missing, the transition is not allowed
/// or someone else changed the order first.
pub async fn set_status(id: OrderId, status: OrderStatus) -> Result<(), Box<dyn std::error::Error>> {
    let backend = super::backend_from_env()?;
    let order = OrderService::new(&backend).update_status(id, status).await?;
    info!(order_id = %order.id, status = %order.status, "Order updated");
    Ok(())
}

//! Order management route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use neobazaar_core::{Order, OrderId, OrderStatus};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::services::OrderService;
use crate::state::AppState;

/// Query parameters for the order list.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub status: Option<OrderStatus>,
}

/// Order detail with the statuses it may move to next.
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub next_statuses: Vec<OrderStatus>,
}

/// Status change request.
#[derive(Debug, Deserialize)]
pub struct StatusInput {
    pub status: OrderStatus,
}

/// Payment flag change request.
#[derive(Debug, Deserialize)]
pub struct PaymentInput {
    pub is_paid: bool,
}

/// List orders, newest first.
pub async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(OrderService::new(state.backend()).list(query.status).await?))
}

/// Order detail.
pub async fn show(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetail>> {
    let order = OrderService::new(state.backend()).get(id).await?;
    Ok(Json(OrderDetail {
        next_statuses: order.status.next_statuses().to_vec(),
        order,
    }))
}

/// Move an order to a new status.
#[instrument(skip(state, admin), fields(admin_id = %admin.id, order_id = %id))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<OrderId>,
    Json(input): Json<StatusInput>,
) -> Result<Json<Order>> {
    Ok(Json(
        OrderService::new(state.backend())
            .update_status(id, input.status)
            .await?,
    ))
}

/// Set or clear the paid flag.
#[instrument(skip(state, admin), fields(admin_id = %admin.id, order_id = %id))]
pub async fn update_payment(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<OrderId>,
    Json(input): Json<PaymentInput>,
) -> Result<Json<Order>> {
    Ok(Json(
        OrderService::new(state.backend())
            .set_paid(id, input.is_paid)
            .await?,
    ))
}

//! Account route handlers. All require a signed-in shopper.

use axum::{
    Json,
    extract::{Path, State},
};
use neobazaar_core::{Order, OrderId};
use tracing::instrument;

use super::auth::SessionUser;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// The signed-in shopper.
pub async fn profile(RequireAuth(user): RequireAuth) -> Json<SessionUser> {
    Json(SessionUser::from(&user))
}

/// The shopper's orders, newest first.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.backend().orders().orders_for_user(user.id).await?))
}

/// One of the shopper's orders. Someone else's order reads as not found.
#[instrument(skip(state, user), fields(user_id = %user.id, order_id = %id))]
pub async fn order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    state
        .backend()
        .orders()
        .get_order(id)
        .await?
        .filter(|order| order.is_owned_by(user.id))
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))
}

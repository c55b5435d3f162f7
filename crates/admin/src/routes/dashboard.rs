//! Dashboard route handlers.

use axum::{Json, extract::State};
use neobazaar_core::OrderStats;

use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::services::OrderService;
use crate::state::AppState;

/// Order counters and revenue.
pub async fn stats(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
) -> Result<Json<OrderStats>> {
    Ok(Json(OrderService::new(state.backend()).stats().await?))
}

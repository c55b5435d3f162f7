//! Checkout route handlers.

use axum::{Json, extract::State, http::StatusCode};
use neobazaar_core::{Order, OrderTotals, PaymentMethod};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::OptionalAuth;
use crate::services::{CartOwner, CartService, CheckoutRequest, CheckoutService};
use crate::state::AppState;

/// Order summary shown beside the checkout form.
#[derive(Debug, Serialize)]
pub struct CheckoutSummary {
    pub item_count: u64,
    #[serde(flatten)]
    pub totals: OrderTotals,
    pub payment_methods: Vec<PaymentMethod>,
}

/// Response for a placed order.
#[derive(Debug, Serialize)]
pub struct PlacedOrderResponse {
    pub order: Order,
    #[serde(flatten)]
    pub totals: OrderTotals,
    pub cart_cleared: bool,
}

/// Totals for the current cart.
pub async fn summary(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<Json<CheckoutSummary>> {
    let carts = CartService::new(state.backend(), &session, CartOwner::for_user(user.as_ref()));
    let cart = carts.load().await?;
    Ok(Json(CheckoutSummary {
        item_count: cart.item_count(),
        totals: cart.totals(),
        payment_methods: PaymentMethod::ALL.to_vec(),
    }))
}

/// Place an order for the current cart.
#[instrument(skip(state, session, user, request))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<PlacedOrderResponse>)> {
    let user_id = user.as_ref().map(|user| user.id);
    let carts = CartService::new(state.backend(), &session, CartOwner::for_user(user.as_ref()));
    let placed = CheckoutService::new(state.backend(), &carts, user_id)
        .place_order(request)
        .await?;

    let order_id = placed.order.id.to_string();
    add_breadcrumb("checkout", "Placed order", Some(&[("order_id", order_id.as_str())]));

    Ok((
        StatusCode::CREATED,
        Json(PlacedOrderResponse {
            order: placed.order,
            totals: placed.totals,
            cart_cleared: placed.cart_cleared,
        }),
    ))
}

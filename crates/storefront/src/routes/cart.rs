//! Cart route handlers.
//!
//! Signed-in shoppers read and write their account cart; guests use the
//! session cart. Every mutation answers with the full updated cart.

use axum::{
    Json,
    extract::{Path, State},
};
use neobazaar_core::{Cart, CartItem, OrderTotals, ProductId};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::OptionalAuth;
use crate::services::{CartOwner, CartService};
use crate::state::AppState;

/// Cart as returned to the client.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub item_count: u64,
    #[serde(flatten)]
    pub totals: OrderTotals,
}

impl From<Cart> for CartView {
    fn from(cart: Cart) -> Self {
        Self {
            item_count: cart.item_count(),
            totals: cart.totals(),
            items: cart.into_items(),
        }
    }
}

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

/// Quantity update request body. Zero or negative removes the line.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i64,
}

/// Units-in-cart badge.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u64,
}

/// Show the current cart.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<Json<CartView>> {
    let carts = CartService::new(state.backend(), &session, CartOwner::for_user(user.as_ref()));
    Ok(Json(carts.load().await?.into()))
}

/// Add a product to the cart.
#[instrument(skip(state, session, user), fields(product_id = %body.product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Json(body): Json<AddItemRequest>,
) -> Result<Json<CartView>> {
    let carts = CartService::new(state.backend(), &session, CartOwner::for_user(user.as_ref()));
    let cart = carts.add(body.product_id, body.quantity).await?;

    let product_id = body.product_id.to_string();
    add_breadcrumb("cart", "Added item", Some(&[("product_id", product_id.as_str())]));
    Ok(Json(cart.into()))
}

/// Set the quantity of a cart line.
#[instrument(skip(state, session, user), fields(product_id = %product_id))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(product_id): Path<ProductId>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<CartView>> {
    let carts = CartService::new(state.backend(), &session, CartOwner::for_user(user.as_ref()));
    Ok(Json(carts.set_quantity(product_id, body.quantity).await?.into()))
}

/// Remove a product from the cart.
#[instrument(skip(state, session, user), fields(product_id = %product_id))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(product_id): Path<ProductId>,
) -> Result<Json<CartView>> {
    let carts = CartService::new(state.backend(), &session, CartOwner::for_user(user.as_ref()));
    Ok(Json(carts.remove(product_id).await?.into()))
}

/// Number of units in the cart.
pub async fn count(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<Json<CartCount>> {
    let carts = CartService::new(state.backend(), &session, CartOwner::for_user(user.as_ref()));
    Ok(Json(CartCount {
        count: carts.load().await?.item_count(),
    }))
}

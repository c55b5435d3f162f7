//! HTTP route handlers for the storefront.
//!
//! Every endpoint speaks JSON. Errors come back as `{"error": "..."}`.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                        - Liveness
//! GET    /health/ready                  - Readiness (backend reachable)
//!
//! # Catalog
//! GET    /api/products                  - List (?sort=&category=&q=)
//! GET    /api/products/{id}             - Product detail
//!
//! # Cart (guest or account)
//! GET    /api/cart                      - Cart with totals
//! GET    /api/cart/count                - Units in cart
//! POST   /api/cart/items                - Add item
//! PUT    /api/cart/items/{product_id}   - Set quantity (<= 0 removes)
//! DELETE /api/cart/items/{product_id}   - Remove item
//!
//! # Checkout
//! GET    /api/checkout/summary          - Totals and payment methods
//! POST   /api/checkout                  - Place order
//!
//! # Auth
//! POST   /api/auth/register             - Create account
//! POST   /api/auth/login                - Sign in (merges guest cart)
//! POST   /api/auth/logout               - Sign out
//! POST   /api/auth/reset-password       - Send reset email
//!
//! # Account (requires auth)
//! GET    /api/account                   - Profile
//! GET    /api/account/orders            - Order history
//! GET    /api/account/orders/{id}       - One order
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod products;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .route("/items", post(cart::add))
        .route(
            "/items/{product_id}",
            put(cart::update).delete(cart::remove),
        )
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout::place_order))
        .route("/summary", get(checkout::summary))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/reset-password", post(auth::reset_password))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::profile))
        .route("/orders", get(account::orders))
        .route("/orders/{id}", get(account::order))
}

/// Create all API routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/products", product_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/checkout", checkout_routes())
        .nest("/api/auth", auth_routes())
        .nest("/api/account", account_routes())
}

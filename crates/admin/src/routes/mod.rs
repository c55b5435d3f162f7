//! HTTP route handlers for admin.
//!
//! Every route except login requires a signed-in admin.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Liveness
//!
//! # Auth
//! POST   /api/auth/login                  - Sign in (admin role required)
//! POST   /api/auth/logout                 - Sign out
//! GET    /api/auth/me                     - Current admin
//!
//! # Dashboard
//! GET    /api/dashboard/stats             - Order counters and revenue
//!
//! # Products
//! GET    /api/products                    - List
//! POST   /api/products                    - Create
//! GET    /api/products/{id}               - Detail
//! PATCH  /api/products/{id}               - Partial update
//! DELETE /api/products/{id}               - Delete (and its image)
//! POST   /api/products/{id}/image         - Upload image (multipart, field `image`)
//! DELETE /api/products/{id}/image         - Remove image
//!
//! # Orders
//! GET    /api/orders                      - List (?status=)
//! GET    /api/orders/{id}                 - Detail with allowed next statuses
//! PUT    /api/orders/{id}/status          - Move through the lifecycle
//! PUT    /api/orders/{id}/payment         - Set paid flag
//! ```

pub mod auth;
pub mod dashboard;
pub mod orders;
pub mod products;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};

use crate::services::products::MAX_IMAGE_BYTES;
use crate::state::AppState;

/// Headroom for multipart framing around the image bytes.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .patch(products::update)
                .delete(products::delete),
        )
        .route(
            "/{id}/image",
            post(products::upload_image)
                .delete(products::remove_image)
                .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + MULTIPART_OVERHEAD)),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", put(orders::update_status))
        .route("/{id}/payment", put(orders::update_payment))
}

/// Create all routes for admin.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes())
        .route("/api/dashboard/stats", get(dashboard::stats))
        .nest("/api/products", product_routes())
        .nest("/api/orders", order_routes())
}

//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Server-side failures are
//! captured to Sentry before the response goes out; clients get a JSON body
//! `{"error": "..."}` with a message safe to show a shopper.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use neobazaar_backend::BackendError;
use serde_json::json;
use thiserror::Error;

use crate::services::{AuthError, CartError, CheckoutError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Hosted backend call failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Session store read or write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Backend(err) => backend_status(err),
            Self::Cart(err) => match err {
                CartError::ProductNotFound(_) => StatusCode::NOT_FOUND,
                CartError::Backend(err) => backend_status(err),
                CartError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Checkout(err) => match err {
                CheckoutError::InvalidAddress(_) => StatusCode::UNPROCESSABLE_ENTITY,
                CheckoutError::EmptyCart => StatusCode::BAD_REQUEST,
                CheckoutError::Cart(CartError::Backend(err)) | CheckoutError::Backend(err) => {
                    backend_status(err)
                }
                CheckoutError::Cart(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                AuthError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
                AuthError::Backend(err) => backend_status(err),
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client. Internal details stay in the logs.
    fn client_message(&self) -> String {
        match self {
            Self::Backend(err)
            | Self::Cart(CartError::Backend(err))
            | Self::Checkout(CheckoutError::Backend(err) | CheckoutError::Cart(CartError::Backend(err)))
            | Self::Auth(AuthError::Backend(err)) => backend_message(err).to_string(),
            Self::Cart(CartError::ProductNotFound(_)) => "Product not found".to_string(),
            Self::Checkout(CheckoutError::InvalidAddress(err)) => err.to_string(),
            Self::Checkout(CheckoutError::EmptyCart) => "Your cart is empty".to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid email or password".to_string(),
                AuthError::UserAlreadyExists => {
                    "An account with this email already exists".to_string()
                }
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                _ => "Store backend is not configured".to_string(),
            },
            Self::NotFound(_) => "Not found".to_string(),
            Self::Unauthorized(_) => "Please log in to continue".to_string(),
            Self::BadRequest(msg) => msg.clone(),
            Self::Cart(_) | Self::Checkout(_) | Self::Session(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

fn backend_status(err: &BackendError) -> StatusCode {
    match err {
        BackendError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        BackendError::NotFound(_) => StatusCode::NOT_FOUND,
        BackendError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        _ => StatusCode::BAD_GATEWAY,
    }
}

const fn backend_message(err: &BackendError) -> &'static str {
    match err {
        BackendError::NotConfigured => "Store backend is not configured",
        BackendError::NotFound(_) => "Not found",
        BackendError::RateLimited(_) => "Too many requests, please try again shortly",
        _ => "External service error",
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "error": self.client_message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for a shopper action.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data.unwrap_or_default() {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}

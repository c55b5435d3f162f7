//! Unified error handling for admin.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use neobazaar_backend::BackendError;
use serde_json::json;
use thiserror::Error;

use crate::services::{AdminAuthError, OrderError, ProductError};

/// Application-level error type for the admin panel.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Auth error: {0}")]
    Auth(#[from] AdminAuthError),

    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    #[error("Product error: {0}")]
    Product(#[from] ProductError),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn backend_status(err: &BackendError) -> StatusCode {
    match err {
        BackendError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        BackendError::NotFound(_) => StatusCode::NOT_FOUND,
        BackendError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Backend(err)
            | Self::Auth(AdminAuthError::Backend(err))
            | Self::Order(OrderError::Backend(err))
            | Self::Product(ProductError::Backend(err)) => backend_status(err),
            Self::Auth(AdminAuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            Self::Auth(AdminAuthError::NotAdmin) | Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Auth(AdminAuthError::InvalidEmail(_)) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Auth(AdminAuthError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Order(OrderError::NotFound(_))
            | Self::Product(ProductError::NotFound(_))
            | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Order(OrderError::InvalidTransition(_)) | Self::Product(ProductError::Invalid(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Order(OrderError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Session(_) | Self::Internal(_) => "Internal server error".to_string(),
            _ if status == StatusCode::SERVICE_UNAVAILABLE => {
                "Store backend is not configured".to_string()
            }
            _ if status == StatusCode::BAD_GATEWAY => "External service error".to_string(),
            Self::Auth(AdminAuthError::InvalidCredentials) => "Invalid email or password".to_string(),
            Self::Auth(AdminAuthError::NotAdmin) => "This account does not have admin access".to_string(),
            Self::Order(err) => err.to_string(),
            Self::Product(err) => err.to_string(),
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for a signed-in admin.
pub fn set_sentry_user(admin_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

//! Authentication error types.

use neobazaar_backend::BackendError;
use thiserror::Error;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] neobazaar_core::EmailError),

    /// Wrong password or unknown account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Email is already registered.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// No identity provider behind the storefront.
    #[error("authentication is not configured")]
    NotConfigured,

    /// Identity provider or profile table failed.
    #[error("backend error: {0}")]
    Backend(BackendError),
}

impl From<BackendError> for AuthError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotConfigured => Self::NotConfigured,
            BackendError::Unauthorized(_) => Self::InvalidCredentials,
            BackendError::Api { status: 422, ref message }
                if message.to_lowercase().contains("already registered") =>
            {
                Self::UserAlreadyExists
            }
            other => Self::Backend(other),
        }
    }
}

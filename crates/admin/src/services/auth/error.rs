//! Admin authentication error types.

use neobazaar_backend::BackendError;
use thiserror::Error;

/// Errors that can occur during admin sign-in.
#[derive(Debug, Error)]
pub enum AdminAuthError {
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] neobazaar_core::EmailError),

    /// Wrong password or unknown account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Credentials were fine but the profile is not an admin.
    #[error("account is not an admin")]
    NotAdmin,

    #[error("authentication is not configured")]
    NotConfigured,

    #[error("backend error: {0}")]
    Backend(BackendError),
}

impl From<BackendError> for AdminAuthError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotConfigured => Self::NotConfigured,
            BackendError::Unauthorized(_) => Self::InvalidCredentials,
            other => Self::Backend(other),
        }
    }
}

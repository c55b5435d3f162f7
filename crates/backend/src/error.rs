//! Backend error types.

use thiserror::Error;

/// Errors that can occur when talking to the hosted backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message extracted from the body.
        message: String,
    },

    /// Response body could not be decoded.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Invalid URL built from configuration.
    #[error("invalid backend URL: {0}")]
    Url(#[from] url::ParseError),

    /// Requested row does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Backend URL or key missing from configuration.
    #[error("backend is not configured")]
    NotConfigured,

    /// Credentials rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limited by the backend.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

impl BackendError {
    /// Whether the error means the row is missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

//! Application state shared across handlers.

use std::sync::Arc;

use neobazaar_backend::Backend;

use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and hands out the backend
/// handle and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backend: Backend,
}

impl AppState {
    /// Create application state over an explicit backend.
    #[must_use]
    pub fn new(config: StorefrontConfig, backend: Backend) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, backend }),
        }
    }

    /// Create application state with the backend described by `config`.
    #[must_use]
    pub fn from_config(config: StorefrontConfig) -> Self {
        let backend = Backend::from_config(config.backend.as_ref());
        Self::new(config, backend)
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the backend handle.
    #[must_use]
    pub fn backend(&self) -> &Backend {
        &self.inner.backend
    }

    /// Configured admin email, if any.
    #[must_use]
    pub fn admin_email(&self) -> Option<&str> {
        self.inner.config.admin_email.as_deref()
    }
}

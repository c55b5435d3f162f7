//! Application state shared across handlers.

use std::sync::Arc;

use neobazaar_backend::Backend;

use crate::config::AdminConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    backend: Backend,
}

impl AppState {
    #[must_use]
    pub fn new(config: AdminConfig, backend: Backend) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, backend }),
        }
    }

    /// Create application state with the backend described by `config`.
    #[must_use]
    pub fn from_config(config: AdminConfig) -> Self {
        let backend = Backend::from_config(config.backend.as_ref());
        Self::new(config, backend)
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn backend(&self) -> &Backend {
        &self.inner.backend
    }

    #[must_use]
    pub fn admin_email(&self) -> Option<&str> {
        self.inner.config.admin_email.as_deref()
    }
}

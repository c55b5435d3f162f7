//! Neo Bazaar Backend - access to the hosted backend-as-a-service.
//!
//! Auth, tables and object storage all live in a hosted service reached over
//! REST. This crate wraps it behind small async traits so the HTTP services
//! can be tested against an in-memory implementation.
//!
//! # Flavors
//!
//! - [`BackendClient`] - the real REST client
//! - [`Unconfigured`] - used when no URL/key is set; reads are empty, writes fail
//! - `InMemoryBackend` - behind the `memory` feature, for tests
//!
//! # Example
//!
//! ```rust,ignore
//! use neobazaar_backend::{Backend, BackendConfig};
//!
//! let backend = Backend::from_config(config.backend.as_ref());
//! let products = backend.catalog().list_products().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod auth;
mod client;
mod config;
mod error;
#[cfg(feature = "memory")]
mod memory;
mod rows;
pub mod storage;
mod store;
mod unconfigured;

use std::sync::Arc;

pub use auth::{AuthSession, AuthUser};
pub use client::BackendClient;
pub use config::BackendConfig;
pub use error::BackendError;
#[cfg(feature = "memory")]
pub use memory::{InMemoryBackend, MEMORY_BASE_URL};
pub use store::{CartStore, CatalogStore, IdentityProvider, ImageStore, OrderStore, ProfileStore};
pub use unconfigured::Unconfigured;

/// Handle to whichever backend the process runs against.
///
/// Cheap to clone. Passed explicitly into application state and services.
#[derive(Clone)]
pub struct Backend {
    catalog: Arc<dyn CatalogStore>,
    carts: Arc<dyn CartStore>,
    orders: Arc<dyn OrderStore>,
    profiles: Arc<dyn ProfileStore>,
    identity: Arc<dyn IdentityProvider>,
    images: Arc<dyn ImageStore>,
    configured: bool,
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("configured", &self.configured)
            .finish_non_exhaustive()
    }
}

impl Backend {
    /// Build a handle where one value implements every store.
    fn from_store<S>(store: Arc<S>, configured: bool) -> Self
    where
        S: CatalogStore
            + CartStore
            + OrderStore
            + ProfileStore
            + IdentityProvider
            + ImageStore
            + 'static,
    {
        Self {
            catalog: store.clone(),
            carts: store.clone(),
            orders: store.clone(),
            profiles: store.clone(),
            identity: store.clone(),
            images: store,
            configured,
        }
    }

    /// Backend reached through the REST client.
    #[must_use]
    pub fn remote(client: BackendClient) -> Self {
        Self::from_store(Arc::new(client), true)
    }

    /// Backend with nothing behind it.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self::from_store(Arc::new(Unconfigured), false)
    }

    /// Remote backend when configured, otherwise [`Backend::unconfigured`].
    #[must_use]
    pub fn from_config(config: Option<&BackendConfig>) -> Self {
        config.map_or_else(Self::unconfigured, |config| {
            Self::remote(BackendClient::new(config))
        })
    }

    /// Backend over a shared in-memory store.
    #[cfg(feature = "memory")]
    #[must_use]
    pub fn in_memory(store: Arc<InMemoryBackend>) -> Self {
        Self::from_store(store, true)
    }

    /// Whether a real backend is behind this handle.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.configured
    }

    #[must_use]
    pub fn catalog(&self) -> &dyn CatalogStore {
        self.catalog.as_ref()
    }

    #[must_use]
    pub fn carts(&self) -> &dyn CartStore {
        self.carts.as_ref()
    }

    #[must_use]
    pub fn orders(&self) -> &dyn OrderStore {
        self.orders.as_ref()
    }

    #[must_use]
    pub fn profiles(&self) -> &dyn ProfileStore {
        self.profiles.as_ref()
    }

    #[must_use]
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.identity.as_ref()
    }

    #[must_use]
    pub fn images(&self) -> &dyn ImageStore {
        self.images.as_ref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_config_gives_unconfigured_backend() {
        let backend = Backend::from_config(None);
        assert!(!backend.is_configured());
        assert!(backend.catalog().list_products().await.unwrap().is_empty());
    }

    #[test]
    fn test_config_gives_remote_backend() {
        let config = BackendConfig::new(
            "https://proj.example.co",
            secrecy::SecretString::from("anon"),
        )
        .unwrap();
        assert!(Backend::from_config(Some(&config)).is_configured());
    }
}

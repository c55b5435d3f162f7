//! End-to-end tests for Neo Bazaar.
//!
//! Each test boots the storefront and admin routers on ephemeral ports over
//! one shared in-memory backend, then drives them with a cookie-keeping HTTP
//! client the way a browser would.
//!
//! ```bash
//! cargo test -p neobazaar-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::sync::Arc;

use neobazaar_admin::config::AdminConfig;
use neobazaar_backend::{Backend, InMemoryBackend};
use neobazaar_core::{Money, Product, ProductId};
use neobazaar_storefront::config::StorefrontConfig;
use reqwest::{Client, Response};
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// Address granted the admin role on first sign-in.
pub const ADMIN_EMAIL: &str = "ops@neobazaar.test";

/// Password used for every test account.
pub const PASSWORD: &str = "hunter22";

/// Running storefront and admin servers sharing one backend.
pub struct TestContext {
    pub store: Arc<InMemoryBackend>,
    pub backend: Backend,
    pub storefront_url: String,
    pub admin_url: String,
}

impl TestContext {
    /// Boot both servers.
    ///
    /// # Panics
    ///
    /// Panics if a listener cannot be bound.
    pub async fn new() -> Self {
        let store = Arc::new(InMemoryBackend::new());
        let backend = Backend::in_memory(store.clone());

        let storefront_config = StorefrontConfig {
            host: "127.0.0.1".parse().expect("valid host"),
            port: 0,
            base_url: "http://localhost".to_string(),
            backend: None,
            admin_email: Some(ADMIN_EMAIL.to_string()),
            sentry_dsn: None,
            sentry_environment: None,
        };
        let storefront = neobazaar_storefront::app(neobazaar_storefront::state::AppState::new(
            storefront_config,
            backend.clone(),
        ));

        let admin_config = AdminConfig {
            host: "127.0.0.1".parse().expect("valid host"),
            port: 0,
            base_url: "http://localhost".to_string(),
            backend: None,
            admin_email: Some(ADMIN_EMAIL.to_string()),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 0.0,
            sentry_traces_sample_rate: 0.0,
        };
        let admin = neobazaar_admin::app(neobazaar_admin::state::AppState::new(
            admin_config,
            backend.clone(),
        ));

        let storefront_addr = serve(storefront).await;
        let admin_addr = serve(admin).await;

        Self {
            store,
            backend,
            storefront_url: format!("http://{storefront_addr}"),
            admin_url: format!("http://{admin_addr}"),
        }
    }

    /// A fresh browser: its own cookie jar, so its own session.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn browser() -> Client {
        Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client")
    }

    #[must_use]
    pub fn storefront(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url)
    }

    #[must_use]
    pub fn admin(&self, path: &str) -> String {
        format!("{}{path}", self.admin_url)
    }

    /// Put a product straight into the catalog.
    pub async fn add_product(&self, title: &str, price: u32, category: &str) -> Product {
        let product = Product {
            id: ProductId::generate(),
            title: title.to_string(),
            description: format!("{title} description"),
            price: Money::from_units(price),
            category: category.to_string(),
            tags: Vec::new(),
            image_url: None,
            stock: Some(10),
            author: None,
            author_handle: None,
            created_at: None,
        };
        self.store.insert_product(product.clone()).await;
        product
    }

    /// Register an account through the storefront.
    ///
    /// # Panics
    ///
    /// Panics if registration does not return 201.
    pub async fn register(&self, browser: &Client, email: &str) {
        let resp = browser
            .post(self.storefront("/api/auth/register"))
            .json(&json!({ "email": email, "password": PASSWORD, "display_name": "" }))
            .send()
            .await
            .expect("register request");
        assert_eq!(resp.status(), 201, "registering {email}");
    }

    /// Sign a browser in to the storefront, returning the login body.
    ///
    /// # Panics
    ///
    /// Panics if login does not return 200.
    pub async fn login(&self, browser: &Client, email: &str) -> Value {
        let resp = browser
            .post(self.storefront("/api/auth/login"))
            .json(&json!({ "email": email, "password": PASSWORD }))
            .send()
            .await
            .expect("login request");
        assert_eq!(resp.status(), 200, "signing in {email}");
        body(resp).await
    }

    /// A browser signed in to the admin as [`ADMIN_EMAIL`].
    ///
    /// # Panics
    ///
    /// Panics if the admin account cannot be created or signed in.
    pub async fn admin_browser(&self) -> Client {
        let browser = Self::browser();
        self.register(&browser, ADMIN_EMAIL).await;

        let resp = browser
            .post(self.admin("/api/auth/login"))
            .json(&json!({ "email": ADMIN_EMAIL, "password": PASSWORD }))
            .send()
            .await
            .expect("admin login request");
        assert_eq!(resp.status(), 200, "admin login");
        browser
    }
}

/// Serve `router` on an ephemeral local port.
async fn serve(router: axum::Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    addr
}

/// Parse a JSON response body.
///
/// # Panics
///
/// Panics if the body is not JSON.
pub async fn body(resp: Response) -> Value {
    resp.json().await.expect("JSON response body")
}

/// Read a money field from a JSON body.
///
/// # Panics
///
/// Panics if the field is missing or not an amount.
#[must_use]
pub fn money(value: &Value) -> Money {
    serde_json::from_value(value.clone()).expect("money value")
}

/// Shipping address that passes checkout validation.
#[must_use]
pub fn valid_address() -> Value {
    json!({
        "name": "Asha Rao",
        "phone": "9876543210",
        "address_line1": "12 Lotus Lane",
        "city": "Pune",
        "state": "Maharashtra",
        "pincode": "411001"
    })
}

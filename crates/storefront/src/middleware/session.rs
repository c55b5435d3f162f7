//! Cookie sessions.
//!
//! A session holds the signed-in identity and the guest cart. The store is
//! process memory, so a restart signs everyone out and drops guest carts.

use tower_sessions::cookie::{SameSite, time::Duration};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "nb_session";

/// Idle days after which a session is dropped.
const SESSION_IDLE_DAYS: i64 = 7;

/// Session layer over an in-memory store.
///
/// `Lax` keeps the cookie on top-level navigations from other sites, so a
/// shopper following a link back to the store keeps their cart.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::days(SESSION_IDLE_DAYS)))
        .with_secure(config.is_https())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, http::Request, http::header::SET_COOKIE, routing::get};
    use tower::ServiceExt;
    use tower_sessions::Session;

    use super::*;

    fn config(base_url: &str) -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: base_url.to_string(),
            backend: None,
            admin_email: None,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    async fn cookie_for(config: &StorefrontConfig) -> String {
        let router = Router::new()
            .route(
                "/",
                get(|session: Session| async move {
                    session.insert("seen", true).await.unwrap();
                }),
            )
            .layer(create_session_layer(config));

        let response = router
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        response.headers()[SET_COOKIE].to_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_cookie_attributes() {
        let cookie = cookie_for(&config("http://localhost:3000")).await;
        assert!(cookie.starts_with("nb_session="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(!cookie.contains("Secure"));
    }

    #[tokio::test]
    async fn test_https_cookie_is_secure() {
        let cookie = cookie_for(&config("https://shop.neobazaar.test")).await;
        assert!(cookie.contains("Secure"));
    }
}

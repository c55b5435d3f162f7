//! Neo Bazaar Storefront library.
//!
//! The shopper-facing JSON API: catalog browsing, the cart (guest or
//! account), checkout, sign-in and order history. Built as a library so the
//! router can be driven in tests without binding a socket.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;

use axum::{Router, extract::State, http::StatusCode, middleware as axum_middleware, routing::get};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the storefront router with its middleware stack.
///
/// Sentry layers are added by the binary, outside this router.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .layer(session_layer)
        .layer(axum_middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable when no backend is configured or the
/// catalog cannot be read.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    if !state.backend().is_configured() {
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    match state.backend().catalog().list_products().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use neobazaar_backend::Backend;
    use tower::ServiceExt;

    use super::*;
    use crate::config::StorefrontConfig;

    fn state() -> AppState {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            backend: None,
            admin_email: None,
            sentry_dsn: None,
            sentry_environment: None,
        };
        AppState::new(config, Backend::unconfigured())
    }

    #[tokio::test]
    async fn test_health_and_readiness_without_backend() {
        let router = app(state());

        let health = router
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(health.status(), StatusCode::OK);
        assert!(health.headers().contains_key("x-request-id"));

        let ready = router
            .oneshot(Request::get("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(ready.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_catalog_is_empty_without_backend() {
        let response = app(state())
            .oneshot(Request::get("/api/products").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

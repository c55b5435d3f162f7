//! Neo Bazaar Storefront - public shopping API.
//!
//! Serves the shopper-facing JSON API on port 3000 by default.
//!
//! The storefront starts without backend credentials: the catalog is empty
//! and writes answer 503 until `BACKEND_URL` and `BACKEND_ANON_KEY` are set.
//! Set `LOG_FORMAT=json` for structured log lines.

#![cfg_attr(not(test), forbid(unsafe_code))]

use neobazaar_storefront::{app, config::StorefrontConfig, state::AppState, telemetry};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");
    let _sentry_guard = telemetry::init(&config);

    let addr = config.socket_addr();
    let state = AppState::from_config(config);
    if !state.backend().is_configured() {
        tracing::warn!("Running without a backend; catalog is empty and writes are rejected");
    }

    // Sentry layers wrap everything so every request gets a hub and transaction
    let router = app(state)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "storefront listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Resolve on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut terminate =
            signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");
        tokio::select! {
            result = tokio::signal::ctrl_c() => result.expect("Failed to listen for Ctrl+C"),
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for Ctrl+C");

    tracing::info!("Shutdown signal received, draining connections");
}

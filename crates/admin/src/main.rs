//! Neo Bazaar Admin - back-office API.
//!
//! Serves the admin JSON API on port 3001 by default, bound to 127.0.0.1.
//! Run it with `BACKEND_SERVICE_KEY` set; the key bypasses row-level
//! security, so keep the port off the public internet.

#![cfg_attr(not(test), forbid(unsafe_code))]

use neobazaar_admin::{app, config::AdminConfig, state::AppState, telemetry};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    let config = AdminConfig::from_env().expect("Failed to load configuration");
    let _sentry_guard = telemetry::init(&config);

    let addr = config.socket_addr();
    let state = AppState::from_config(config);

    let router = app(state)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "admin listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            wait_for_shutdown().await;
            tracing::info!("Shutdown signal received");
        })
        .await
        .expect("Server error");
}

#[cfg(unix)]
async fn wait_for_shutdown() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.expect("Failed to listen for Ctrl+C"),
        _ = terminate.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for Ctrl+C");
}

//! Admin cookie sessions.
//!
//! Stricter than the storefront: the cookie never rides a cross-site request
//! and an idle admin is signed out after a day.

use tower_sessions::cookie::{SameSite, time::Duration};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::AdminConfig;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "nb_admin_session";

const SESSION_IDLE_HOURS: i64 = 24;

#[must_use]
pub fn create_session_layer(config: &AdminConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::hours(SESSION_IDLE_HOURS)))
        .with_secure(config.is_https())
        .with_same_site(SameSite::Strict)
        .with_http_only(true)
}

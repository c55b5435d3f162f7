//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, added in `main`)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions, in-memory store, SameSite=Strict)
//!
//! Route handlers opt into authentication with [`RequireAdminAuth`].

pub mod auth;
pub mod session;

pub use auth::{OptionalAdminAuth, RequireAdminAuth, clear_current_admin, set_current_admin};
pub use session::create_session_layer;

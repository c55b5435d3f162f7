//! Session models for the admin panel.

pub mod session;

pub use session::CurrentAdmin;
pub use session::keys as session_keys;

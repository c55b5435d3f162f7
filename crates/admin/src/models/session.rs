//! Session-related types for admin authentication.

use serde::{Deserialize, Serialize};

use neobazaar_backend::AuthSession;
use neobazaar_core::{Email, UserId, UserProfile};

/// Session-stored admin identity.
///
/// Only profiles with the admin role are ever stored here.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Identity provider user ID.
    pub id: UserId,
    /// Admin's email address.
    pub email: Email,
    /// Admin's display name.
    pub name: String,
    access_token: String,
}

impl CurrentAdmin {
    #[must_use]
    pub fn new(session: &AuthSession, profile: &UserProfile) -> Self {
        Self {
            id: profile.id,
            email: profile.email.clone(),
            name: profile.display_name.clone(),
            access_token: session.access_token.clone(),
        }
    }

    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl std::fmt::Debug for CurrentAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentAdmin")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}

//! Admin sign-in.
//!
//! Admins sign in with the same identity provider as shoppers. Access is
//! granted only when the profile row carries the admin role; any other
//! account is signed straight back out.

mod error;

pub use error::AdminAuthError;

use neobazaar_backend::Backend;
use neobazaar_core::{Email, UserProfile};
use tracing::{info, instrument, warn};

use crate::models::CurrentAdmin;

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    backend: &'a Backend,
    admin_email: Option<&'a str>,
}

impl<'a> AdminAuthService<'a> {
    #[must_use]
    pub const fn new(backend: &'a Backend, admin_email: Option<&'a str>) -> Self {
        Self {
            backend,
            admin_email,
        }
    }

    /// Sign in and check the admin role.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidCredentials` for a wrong email or
    /// password and `AdminAuthError::NotAdmin` when the account lacks the
    /// admin role.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<CurrentAdmin, AdminAuthError> {
        let email = Email::parse(email)?;
        let session = self.backend.identity().sign_in(&email, password).await?;
        let user = &session.user;

        let profile = match self.backend.profiles().get_profile(user.id).await? {
            Some(profile) => profile,
            None => {
                let profile = UserProfile::new_for_identity(
                    user.id,
                    user.email.clone(),
                    user.display_name.as_deref(),
                    self.admin_email,
                );
                if let Err(e) = self.backend.profiles().insert_profile(&profile).await {
                    warn!(user_id = %profile.id, error = %e, "Failed to create missing profile");
                }
                profile
            }
        };

        if !profile.is_admin() {
            warn!(user_id = %profile.id, "Non-admin account attempted admin sign-in");
            self.logout(&session.access_token).await;
            return Err(AdminAuthError::NotAdmin);
        }

        info!(user_id = %profile.id, "Admin signed in");
        Ok(CurrentAdmin::new(&session, &profile))
    }

    /// Revoke the remote session. Failures are logged only.
    pub async fn logout(&self, access_token: &str) {
        if let Err(e) = self.backend.identity().sign_out(access_token).await {
            warn!(error = %e, "Failed to revoke admin session");
        }
    }
}

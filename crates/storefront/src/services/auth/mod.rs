//! Authentication service.
//!
//! Credentials are checked by the hosted identity provider. This service adds
//! the profile row: created at registration, and created on first sign-in for
//! identities that never got one.

mod error;

pub use error::AuthError;

use neobazaar_backend::{AuthSession, Backend};
use neobazaar_core::{Email, UserProfile};
use tracing::{info, instrument, warn};

/// Minimum password length accepted by the identity provider.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Result of a successful sign-in.
#[derive(Debug)]
pub struct SignedIn {
    pub session: AuthSession,
    pub profile: UserProfile,
}

/// Authentication service.
pub struct AuthService<'a> {
    backend: &'a Backend,
    admin_email: Option<&'a str>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(backend: &'a Backend, admin_email: Option<&'a str>) -> Self {
        Self {
            backend,
            admin_email,
        }
    }

    /// Register a new account and create its profile row.
    ///
    /// The profile gets the admin role only when the email matches the
    /// configured admin address. A failed profile insert is logged; sign-in
    /// creates the row later.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<UserProfile, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        let user = self
            .backend
            .identity()
            .sign_up(&email, password, display_name.trim())
            .await?;

        let profile = UserProfile::new_for_identity(
            user.id,
            email,
            Some(display_name),
            self.admin_email,
        );
        if let Err(e) = self.backend.profiles().insert_profile(&profile).await {
            warn!(user_id = %profile.id, error = %e, "Failed to create profile at registration");
        }

        info!(user_id = %profile.id, role = %profile.role, "Registered account");
        Ok(profile)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<SignedIn, AuthError> {
        let email = Email::parse(email)?;
        let session = self.backend.identity().sign_in(&email, password).await?;
        let profile = self.profile_for(&session).await?;
        Ok(SignedIn { session, profile })
    }

    /// Revoke the remote session. Failures are logged, never surfaced.
    pub async fn logout(&self, access_token: &str) {
        if let Err(e) = self.backend.identity().sign_out(access_token).await {
            warn!(error = %e, "Failed to revoke remote session");
        }
    }

    /// Email a password reset link pointing at `redirect_to`.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is invalid or the provider rejects the request.
    #[instrument(skip(self))]
    pub async fn send_password_reset(&self, email: &str, redirect_to: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;
        self.backend
            .identity()
            .send_password_reset(&email, redirect_to)
            .await?;
        Ok(())
    }

    /// Existing profile, or one built from the identity and stored.
    async fn profile_for(&self, session: &AuthSession) -> Result<UserProfile, AuthError> {
        let user = &session.user;
        if let Some(profile) = self.backend.profiles().get_profile(user.id).await? {
            return Ok(profile);
        }

        let profile = UserProfile::new_for_identity(
            user.id,
            user.email.clone(),
            user.display_name.as_deref(),
            self.admin_email,
        );
        if let Err(e) = self.backend.profiles().insert_profile(&profile).await {
            warn!(user_id = %profile.id, error = %e, "Failed to create missing profile");
        }
        Ok(profile)
    }
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

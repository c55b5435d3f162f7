//! Authentication route handlers.

use axum::{Json, extract::State, http::StatusCode};
use neobazaar_core::{UserProfile, UserRole};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::{AuthService, has_guest_lines, merge_guest_cart};
use crate::state::AppState;

/// Registration form.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: String,
}

/// Login form.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Password reset request.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
}

/// Signed-in shopper as returned to the client.
#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: UserRole,
}

impl From<&CurrentUser> for SessionUser {
    fn from(user: &CurrentUser) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.as_str().to_string(),
            display_name: user.display_name.clone(),
            role: user.role,
        }
    }
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: SessionUser,
    /// Cart lines carried over from the guest cart.
    pub merged_cart_lines: usize,
}

/// Simple acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Create an account.
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserProfile>)> {
    let auth = AuthService::new(state.backend(), state.admin_email());
    let profile = auth
        .register(&form.email, &form.password, &form.display_name)
        .await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// Sign in and fold the guest cart into the account cart.
///
/// A failed merge does not fail the login. Unwritten guest lines stay in the
/// session and are folded in on the next cart load.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let auth = AuthService::new(state.backend(), state.admin_email());
    let signed_in = auth.login(&form.email, &form.password).await?;

    let user = CurrentUser::new(&signed_in.session, &signed_in.profile);
    set_current_user(&session, &user).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    let merged_cart_lines = match merge_guest_cart(state.backend(), &session, user.id).await {
        Ok(lines) => lines,
        Err(e) => {
            warn!(user_id = %user.id, error = %e, "Failed to merge guest cart");
            0
        }
    };

    info!(user_id = %user.id, "Signed in");
    Ok(Json(LoginResponse {
        user: SessionUser::from(&user),
        merged_cart_lines,
    }))
}

/// Sign out and drop the session.
///
/// Guest cart lines that were never merged survive the sign-out under a fresh
/// session id.
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<StatusCode> {
    if let Some(user) = user {
        AuthService::new(state.backend(), state.admin_email())
            .logout(user.access_token())
            .await;
    }

    clear_current_user(&session).await?;
    if has_guest_lines(&session).await? {
        session.cycle_id().await?;
    } else {
        session.flush().await?;
    }
    clear_sentry_user();

    Ok(StatusCode::NO_CONTENT)
}

/// Send a password reset email.
#[instrument(skip(state, form))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(form): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    let auth = AuthService::new(state.backend(), state.admin_email());
    auth.send_password_reset(&form.email, &state.config().password_reset_url())
        .await?;
    Ok(Json(MessageResponse {
        message: "Check your email for a password reset link".to_string(),
    }))
}

//! Admin authentication route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAdminAuth, RequireAdminAuth, clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::services::AdminAuthService;
use crate::state::AppState;

/// Login form.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Admin identity returned to the client.
#[derive(Debug, Serialize)]
pub struct AdminView {
    pub id: String,
    pub email: String,
    pub name: String,
}

impl From<&CurrentAdmin> for AdminView {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            id: admin.id.to_string(),
            email: admin.email.as_str().to_string(),
            name: admin.name.clone(),
        }
    }
}

/// Sign in. Non-admin accounts get 403.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginRequest>,
) -> Result<Json<AdminView>> {
    let admin = AdminAuthService::new(state.backend(), state.admin_email())
        .login(&form.email, &form.password)
        .await?;

    set_current_admin(&session, &admin).await?;
    set_sentry_user(&admin.id, Some(admin.email.as_str()));

    Ok(Json(AdminView::from(&admin)))
}

/// Sign out.
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    OptionalAdminAuth(admin): OptionalAdminAuth,
) -> Result<StatusCode> {
    if let Some(admin) = admin {
        AdminAuthService::new(state.backend(), state.admin_email())
            .logout(admin.access_token())
            .await;
    }

    clear_current_admin(&session).await?;
    session.flush().await?;
    clear_sentry_user();

    Ok(StatusCode::NO_CONTENT)
}

/// Current admin.
pub async fn me(RequireAdminAuth(admin): RequireAdminAuth) -> Json<AdminView> {
    Json(AdminView::from(&admin))
}

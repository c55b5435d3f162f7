//! Managed authentication endpoints.

use async_trait::async_trait;
use neobazaar_core::Email;
use reqwest::Method;
use serde_json::json;
use tracing::instrument;

use super::BackendClient;
use crate::auth::{AuthSession, AuthUser, SessionPayload, SignUpPayload};
use crate::error::BackendError;
use crate::store::IdentityProvider;

#[async_trait]
impl IdentityProvider for BackendClient {
    #[instrument(skip(self, password, display_name), fields(email = %email))]
    async fn sign_up(
        &self,
        email: &Email,
        password: &str,
        display_name: &str,
    ) -> Result<AuthUser, BackendError> {
        let body = json!({
            "email": email.as_str(),
            "password": password,
            "data": { "display_name": display_name },
        });
        let payload: SignUpPayload = self
            .send_json(self.auth_request(Method::POST, "signup", &[])?.json(&body))
            .await?;
        Ok(payload.into_user().into_auth_user(email))
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_in(&self, email: &Email, password: &str) -> Result<AuthSession, BackendError> {
        let body = json!({ "email": email.as_str(), "password": password });
        let payload: SessionPayload = self
            .send_json(
                self.auth_request(Method::POST, "token", &[("grant_type", "password")])?
                    .json(&body),
            )
            .await
            .map_err(|e| match e {
                // Wrong credentials come back as 400 invalid_grant
                BackendError::Api {
                    status: 400,
                    message,
                } => BackendError::Unauthorized(message),
                other => other,
            })?;
        Ok(AuthSession {
            access_token: payload.access_token,
            user: payload.user.into_auth_user(email),
        })
    }

    #[instrument(skip(self, access_token))]
    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        self.send(
            self.auth_request(Method::POST, "logout", &[])?
                .bearer_auth(access_token),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(email = %email))]
    async fn send_password_reset(
        &self,
        email: &Email,
        redirect_to: &str,
    ) -> Result<(), BackendError> {
        self.send(
            self.auth_request(Method::POST, "recover", &[("redirect_to", redirect_to)])?
                .json(&json!({ "email": email.as_str() })),
        )
        .await?;
        Ok(())
    }
}

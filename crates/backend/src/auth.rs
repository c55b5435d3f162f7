//! Identity types returned by the managed auth service.

use neobazaar_core::{Email, UserId};
use serde::Deserialize;

/// An authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub email: Email,
    /// Display name captured at sign-up, if any.
    pub display_name: Option<String>,
}

/// A signed-in session.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct AuthSession {
    pub access_token: String,
    pub user: AuthUser,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

/// User object as the auth service serializes it.
#[derive(Debug, Deserialize)]
pub(crate) struct UserPayload {
    pub id: UserId,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Option<serde_json::Value>,
}

/// Token grant response.
#[derive(Debug, Deserialize)]
pub(crate) struct SessionPayload {
    pub access_token: String,
    pub user: UserPayload,
}

/// Sign-up answers with a session when email confirmation is off and with a
/// bare user otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SignUpPayload {
    Session(SessionPayload),
    User(UserPayload),
}

impl SignUpPayload {
    pub(crate) fn into_user(self) -> UserPayload {
        match self {
            Self::Session(session) => session.user,
            Self::User(user) => user,
        }
    }
}

impl UserPayload {
    /// Convert, falling back to `fallback_email` when the payload omits it.
    pub(crate) fn into_auth_user(self, fallback_email: &Email) -> AuthUser {
        let display_name = self
            .user_metadata
            .as_ref()
            .and_then(|meta| meta.get("display_name"))
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);
        let email = self
            .email
            .as_deref()
            .and_then(|e| Email::parse(e).ok())
            .unwrap_or_else(|| fallback_email.clone());
        AuthUser {
            id: self.id,
            email,
            display_name,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_up_payload_accepts_both_shapes() {
        let id = UserId::generate();
        let fallback = Email::parse("a@b.co").unwrap();

        let bare = serde_json::json!({
            "id": id,
            "email": "new@shop.in",
            "user_metadata": { "display_name": "New" }
        });
        let user = serde_json::from_value::<SignUpPayload>(bare)
            .unwrap()
            .into_user()
            .into_auth_user(&fallback);
        assert_eq!(user.id, id);
        assert_eq!(user.email.as_str(), "new@shop.in");
        assert_eq!(user.display_name.as_deref(), Some("New"));

        let with_session = serde_json::json!({
            "access_token": "tok",
            "user": { "id": id }
        });
        let user = serde_json::from_value::<SignUpPayload>(with_session)
            .unwrap()
            .into_user()
            .into_auth_user(&fallback);
        assert_eq!(user.email, fallback);
        assert_eq!(user.display_name, None);
    }

    #[test]
    fn test_session_debug_redacts_token() {
        let session = AuthSession {
            access_token: "secret-token".to_string(),
            user: AuthUser {
                id: UserId::generate(),
                email: Email::parse("a@b.co").unwrap(),
                display_name: None,
            },
        };
        assert!(!format!("{session:?}").contains("secret-token"));
    }
}

//! User profiles.

use serde::{Deserialize, Serialize};

use crate::types::{Email, UserId, UserRole};

/// Row in the `users` table, keyed by the identity provider's user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: Email,
    pub display_name: String,
    #[serde(default)]
    pub role: UserRole,
}

impl UserProfile {
    /// Build the profile for a newly registered or first-seen identity.
    ///
    /// A blank display name falls back to the local part of the email.
    #[must_use]
    pub fn new_for_identity(
        id: UserId,
        email: Email,
        display_name: Option<&str>,
        admin_email: Option<&str>,
    ) -> Self {
        let display_name = display_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| email.local_part())
            .to_string();
        let role = UserRole::for_new_profile(&email, admin_email);
        Self {
            id,
            email,
            display_name,
            role,
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_local_part() {
        let email = Email::parse("meera@example.com").unwrap();
        let profile = UserProfile::new_for_identity(UserId::generate(), email, Some("  "), None);
        assert_eq!(profile.display_name, "meera");
        assert!(!profile.is_admin());
    }

    #[test]
    fn test_admin_email_grants_admin() {
        let email = Email::parse("boss@example.com").unwrap();
        let profile = UserProfile::new_for_identity(
            UserId::generate(),
            email,
            Some("Boss"),
            Some("BOSS@example.com"),
        );
        assert_eq!(profile.display_name, "Boss");
        assert!(profile.is_admin());
    }

    #[test]
    fn test_legacy_role_value() {
        let json = serde_json::json!({
            "id": UserId::generate(),
            "email": "a@b.co",
            "display_name": "A",
            "role": "user",
        });
        let profile: UserProfile = serde_json::from_value(json).unwrap();
        assert_eq!(profile.role, UserRole::Customer);
    }
}

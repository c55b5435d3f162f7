//! Session-related types.
//!
//! Types stored in the session for authentication state and the guest cart.

use serde::{Deserialize, Serialize};

use neobazaar_backend::AuthSession;
use neobazaar_core::{Cart, Email, ProductId, UserId, UserProfile, UserRole};

/// Session-stored user identity.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Identity provider user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Name shown in the header.
    pub display_name: String,
    /// Role from the profile row.
    pub role: UserRole,
    /// Token used to revoke the remote session on logout.
    access_token: String,
}

impl CurrentUser {
    /// Build the session identity from a fresh sign-in.
    #[must_use]
    pub fn new(session: &AuthSession, profile: &UserProfile) -> Self {
        Self {
            id: profile.id,
            email: profile.email.clone(),
            display_name: profile.display_name.clone(),
            role: profile.role,
            access_token: session.access_token.clone(),
        }
    }

    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl std::fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentUser")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("role", &self.role)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// One line of the guest cart as kept in the session.
///
/// Only the product id and quantity are stored; product data and prices are
/// read from the catalog whenever the cart is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestCartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl GuestCartLine {
    /// The session form of `cart`.
    #[must_use]
    pub fn from_cart(cart: &Cart) -> Vec<Self> {
        cart.items()
            .iter()
            .map(|item| Self {
                product_id: item.product_id(),
                quantity: item.quantity,
            })
            .collect()
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the anonymous shopper's cart.
    pub const GUEST_CART: &str = "guest_cart";
}

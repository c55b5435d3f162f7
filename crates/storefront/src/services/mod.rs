//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Registration, sign-in, sign-out, password reset
//! - `cart` - Cart persistence routing (account rows vs. guest session)
//! - `checkout` - Address validation, order placement, cart clearing

pub mod auth;
pub mod cart;
pub mod checkout;

pub use auth::{AuthError, AuthService};
pub use cart::{CartError, CartOwner, CartService, has_guest_lines, merge_guest_cart};
pub use checkout::{CheckoutError, CheckoutRequest, CheckoutService, PlacedOrder};

//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Role-gated admin sign-in
//! - `orders` - Order listing, status lifecycle, payment flag, stats
//! - `products` - Product CRUD and image management

pub mod auth;
pub mod orders;
pub mod products;

pub use auth::{AdminAuthError, AdminAuthService};
pub use orders::{OrderError, OrderService};
pub use products::{ImageUpload, ProductError, ProductService};

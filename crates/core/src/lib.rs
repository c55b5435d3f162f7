//! Neo Bazaar Core - Shared domain library.
//!
//! This crate provides the domain rules used across all Neo Bazaar components:
//! - `storefront` - Public catalog, cart and checkout service
//! - `admin` - Back-office for products and orders
//! - `cli` - Operator tooling
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no storage. Everything here is deterministic and testable in
//! isolation.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, money and status enums
//! - [`catalog`] - Products and admin product input
//! - [`cart`] - Cart reconciliation (merge-by-product rules)
//! - [`pricing`] - Subtotal, shipping fee and grand total
//! - [`address`] - Shipping address validation
//! - [`order`] - Immutable order snapshots and order statistics
//! - [`user`] - User profiles and role assignment

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod address;
pub mod cart;
pub mod catalog;
pub mod order;
pub mod pricing;
pub mod types;
pub mod user;

pub use address::{AddressError, ShippingAddress};
pub use cart::{Cart, CartItem, LineChange};
pub use catalog::{NewProduct, Product, ProductPatch, ProductSort};
pub use order::{NewOrder, Order, OrderItem, OrderStats};
pub use pricing::OrderTotals;
pub use types::*;
pub use user::UserProfile;

//! Storage traits implemented by every backend flavor.
//!
//! Services depend on these traits through the [`Backend`](crate::Backend)
//! handle, never on a concrete client.

use async_trait::async_trait;
use neobazaar_core::{
    Cart, Email, NewOrder, NewProduct, Order, OrderId, OrderStatus, Product, ProductId,
    ProductPatch, UserId, UserProfile,
};

use crate::auth::{AuthSession, AuthUser};
use crate::error::BackendError;

/// Product catalog reads and admin writes.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All products, newest first.
    async fn list_products(&self) -> Result<Vec<Product>, BackendError>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, BackendError>;

    /// Products with an exact category match, newest first.
    async fn products_by_category(&self, category: &str) -> Result<Vec<Product>, BackendError>;

    /// Case-insensitive substring search over title, description and category.
    async fn search_products(&self, term: &str) -> Result<Vec<Product>, BackendError>;

    async fn create_product(&self, product: NewProduct) -> Result<Product, BackendError>;

    /// Apply a partial update. Fails with `NotFound` when the product is missing.
    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, BackendError>;

    /// Set `image_url` to null. Fails with `NotFound` when the product is missing.
    async fn clear_image(&self, id: ProductId) -> Result<Product, BackendError>;

    async fn delete_product(&self, id: ProductId) -> Result<(), BackendError>;
}

/// Account carts, one row per (user, product).
#[async_trait]
pub trait CartStore: Send + Sync {
    /// The stored cart for a user, joined with current product data.
    async fn load_cart(&self, user_id: UserId) -> Result<Cart, BackendError>;

    /// Upsert the quantity of one line.
    async fn save_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), BackendError>;

    async fn remove_line(&self, user_id: UserId, product_id: ProductId)
    -> Result<(), BackendError>;

    async fn clear_cart(&self, user_id: UserId) -> Result<(), BackendError>;
}

/// Orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create_order(&self, order: NewOrder) -> Result<Order, BackendError>;

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, BackendError>;

    /// Orders placed by a user, newest first.
    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, BackendError>;

    /// Every order, newest first.
    async fn all_orders(&self) -> Result<Vec<Order>, BackendError>;

    /// Set the status only if the order is still in `expected`.
    ///
    /// Returns `None` when no order with that id is in `expected`.
    async fn update_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        status: OrderStatus,
    ) -> Result<Option<Order>, BackendError>;

    async fn set_paid(&self, id: OrderId, is_paid: bool) -> Result<Option<Order>, BackendError>;
}

/// Rows in the `users` table.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, id: UserId) -> Result<Option<UserProfile>, BackendError>;

    async fn insert_profile(&self, profile: &UserProfile) -> Result<(), BackendError>;
}

/// Managed authentication.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an identity. The display name is stored as user metadata.
    async fn sign_up(
        &self,
        email: &Email,
        password: &str,
        display_name: &str,
    ) -> Result<AuthUser, BackendError>;

    async fn sign_in(&self, email: &Email, password: &str) -> Result<AuthSession, BackendError>;

    /// Revoke a session token.
    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError>;

    /// Email a password reset link that lands on `redirect_to`.
    async fn send_password_reset(&self, email: &Email, redirect_to: &str)
    -> Result<(), BackendError>;
}

/// Product image objects.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store an image for a product and return its public URL.
    async fn upload_image(
        &self,
        product_id: ProductId,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BackendError>;

    /// Remove an image by its public URL. URLs outside the bucket are ignored.
    async fn remove_image(&self, public_url: &str) -> Result<(), BackendError>;
}

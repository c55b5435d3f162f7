//! Stand-in used when no backend URL or key is configured.
//!
//! Reads succeed with empty results so the storefront can still render;
//! every write fails with [`BackendError::NotConfigured`]. Signing out is a
//! no-op.

use async_trait::async_trait;
use neobazaar_core::{
    Cart, Email, NewOrder, NewProduct, Order, OrderId, OrderStatus, Product, ProductId,
    ProductPatch, UserId, UserProfile,
};
use tracing::warn;

use crate::auth::{AuthSession, AuthUser};
use crate::error::BackendError;
use crate::store::{CartStore, CatalogStore, IdentityProvider, ImageStore, OrderStore, ProfileStore};

/// Backend that has nothing behind it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconfigured;

fn rejected<T>(operation: &str) -> Result<T, BackendError> {
    warn!(operation, "Backend not configured; rejecting write");
    Err(BackendError::NotConfigured)
}

#[async_trait]
impl CatalogStore for Unconfigured {
    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        Ok(Vec::new())
    }

    async fn get_product(&self, _id: ProductId) -> Result<Option<Product>, BackendError> {
        Ok(None)
    }

    async fn products_by_category(&self, _category: &str) -> Result<Vec<Product>, BackendError> {
        Ok(Vec::new())
    }

    async fn search_products(&self, _term: &str) -> Result<Vec<Product>, BackendError> {
        Ok(Vec::new())
    }

    async fn create_product(&self, _product: NewProduct) -> Result<Product, BackendError> {
        rejected("create_product")
    }

    async fn update_product(
        &self,
        _id: ProductId,
        _patch: ProductPatch,
    ) -> Result<Product, BackendError> {
        rejected("update_product")
    }

    async fn clear_image(&self, _id: ProductId) -> Result<Product, BackendError> {
        rejected("clear_product_image")
    }

    async fn delete_product(&self, _id: ProductId) -> Result<(), BackendError> {
        rejected("delete_product")
    }
}

#[async_trait]
impl CartStore for Unconfigured {
    async fn load_cart(&self, _user_id: UserId) -> Result<Cart, BackendError> {
        Ok(Cart::new())
    }

    async fn save_line(
        &self,
        _user_id: UserId,
        _product_id: ProductId,
        _quantity: u32,
    ) -> Result<(), BackendError> {
        rejected("save_cart_line")
    }

    async fn remove_line(
        &self,
        _user_id: UserId,
        _product_id: ProductId,
    ) -> Result<(), BackendError> {
        rejected("remove_cart_line")
    }

    async fn clear_cart(&self, _user_id: UserId) -> Result<(), BackendError> {
        rejected("clear_cart")
    }
}

#[async_trait]
impl OrderStore for Unconfigured {
    async fn create_order(&self, _order: NewOrder) -> Result<Order, BackendError> {
        rejected("create_order")
    }

    async fn get_order(&self, _id: OrderId) -> Result<Option<Order>, BackendError> {
        Ok(None)
    }

    async fn orders_for_user(&self, _user_id: UserId) -> Result<Vec<Order>, BackendError> {
        Ok(Vec::new())
    }

    async fn all_orders(&self) -> Result<Vec<Order>, BackendError> {
        Ok(Vec::new())
    }

    async fn update_status(
        &self,
        _id: OrderId,
        _expected: OrderStatus,
        _status: OrderStatus,
    ) -> Result<Option<Order>, BackendError> {
        rejected("update_order_status")
    }

    async fn set_paid(&self, _id: OrderId, _is_paid: bool) -> Result<Option<Order>, BackendError> {
        rejected("update_payment_status")
    }
}

#[async_trait]
impl ProfileStore for Unconfigured {
    async fn get_profile(&self, _id: UserId) -> Result<Option<UserProfile>, BackendError> {
        Ok(None)
    }

    async fn insert_profile(&self, _profile: &UserProfile) -> Result<(), BackendError> {
        rejected("insert_profile")
    }
}

#[async_trait]
impl IdentityProvider for Unconfigured {
    async fn sign_up(
        &self,
        _email: &Email,
        _password: &str,
        _display_name: &str,
    ) -> Result<AuthUser, BackendError> {
        rejected("sign_up")
    }

    async fn sign_in(&self, _email: &Email, _password: &str) -> Result<AuthSession, BackendError> {
        rejected("sign_in")
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), BackendError> {
        Ok(())
    }

    async fn send_password_reset(
        &self,
        _email: &Email,
        _redirect_to: &str,
    ) -> Result<(), BackendError> {
        rejected("send_password_reset")
    }
}

#[async_trait]
impl ImageStore for Unconfigured {
    async fn upload_image(
        &self,
        _product_id: ProductId,
        _file_name: &str,
        _content_type: &str,
        _bytes: Vec<u8>,
    ) -> Result<String, BackendError> {
        rejected("upload_image")
    }

    async fn remove_image(&self, _url: &str) -> Result<(), BackendError> {
        rejected("remove_image")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_are_empty() {
        let backend = Unconfigured;
        assert!(backend.list_products().await.unwrap().is_empty());
        assert!(backend.load_cart(UserId::generate()).await.unwrap().is_empty());
        assert!(backend.all_orders().await.unwrap().is_empty());
        assert!(backend.get_profile(UserId::generate()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_writes_are_rejected() {
        let backend = Unconfigured;
        let err = backend.clear_cart(UserId::generate()).await.unwrap_err();
        assert!(matches!(err, BackendError::NotConfigured));
        let err = backend
            .set_paid(OrderId::generate(), true)
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::NotConfigured));
    }

    #[tokio::test]
    async fn test_sign_out_is_noop() {
        assert!(Unconfigured.sign_out("token").await.is_ok());
    }
}

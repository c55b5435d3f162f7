//! In-memory backend for tests and local development.
//!
//! Behaves like the hosted backend for every store trait, including
//! compare-and-set status updates. Writes to carts or profiles can be made to
//! fail on demand to exercise partial-failure paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use neobazaar_core::{
    Cart, CartItem, Email, NewOrder, NewProduct, Order, OrderId, OrderStatus, Product, ProductId,
    ProductPatch, UserId, UserProfile, catalog::matches_search,
};
use tokio::sync::RwLock;

use crate::auth::{AuthSession, AuthUser};
use crate::error::BackendError;
use crate::storage::{object_key, object_key_from_url, public_url};
use crate::store::{CartStore, CatalogStore, IdentityProvider, ImageStore, OrderStore, ProfileStore};

/// Base URL used for public image URLs.
pub const MEMORY_BASE_URL: &str = "https://backend.invalid";

#[derive(Debug)]
struct Identity {
    user: AuthUser,
    password: String,
}

#[derive(Debug, Default)]
struct State {
    products: Vec<Product>,
    /// Lines per user in insertion order.
    carts: HashMap<UserId, Vec<(ProductId, u32)>>,
    orders: Vec<Order>,
    profiles: HashMap<UserId, UserProfile>,
    identities: Vec<Identity>,
    sessions: HashMap<String, UserId>,
    images: HashMap<String, usize>,
    password_resets: Vec<(Email, String)>,
}

/// Backend that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    state: RwLock<State>,
    fail_cart_writes: AtomicBool,
    /// When set, cart writes succeed while `cart_writes_left` lasts.
    limit_cart_writes: AtomicBool,
    cart_writes_left: AtomicUsize,
    fail_profile_writes: AtomicBool,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a product as-is.
    pub async fn insert_product(&self, product: Product) {
        self.state.write().await.products.push(product);
    }

    /// Make every cart write fail with an API error.
    ///
    /// Also lifts any limit set by [`Self::fail_cart_writes_after`].
    pub fn set_fail_cart_writes(&self, fail: bool) {
        self.limit_cart_writes.store(false, Ordering::SeqCst);
        self.fail_cart_writes.store(fail, Ordering::SeqCst);
    }

    /// Let the next `writes` cart writes succeed and fail every one after.
    pub fn fail_cart_writes_after(&self, writes: usize) {
        self.cart_writes_left.store(writes, Ordering::SeqCst);
        self.limit_cart_writes.store(true, Ordering::SeqCst);
    }

    /// Make every profile insert fail with an API error.
    pub fn set_fail_profile_writes(&self, fail: bool) {
        self.fail_profile_writes.store(fail, Ordering::SeqCst);
    }

    /// Object keys currently stored in the image bucket.
    pub async fn image_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.state.read().await.images.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Password reset requests as (email, redirect) pairs.
    pub async fn password_resets(&self) -> Vec<(Email, String)> {
        self.state.read().await.password_resets.clone()
    }

    /// Number of live sign-in sessions.
    pub async fn active_sessions(&self) -> usize {
        self.state.read().await.sessions.len()
    }

    fn check_cart_writes(&self) -> Result<(), BackendError> {
        let exhausted = self.limit_cart_writes.load(Ordering::SeqCst)
            && self
                .cart_writes_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
                .is_err();
        if exhausted || self.fail_cart_writes.load(Ordering::SeqCst) {
            return Err(BackendError::Api {
                status: 503,
                message: "cart table unavailable".to_string(),
            });
        }
        Ok(())
    }
}

fn newest_first(products: &mut [Product]) {
    products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[async_trait]
impl CatalogStore for InMemoryBackend {
    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        let mut products = self.state.read().await.products.clone();
        newest_first(&mut products);
        Ok(products)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, BackendError> {
        Ok(self
            .state
            .read()
            .await
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn products_by_category(&self, category: &str) -> Result<Vec<Product>, BackendError> {
        let mut products: Vec<Product> = self
            .state
            .read()
            .await
            .products
            .iter()
            .filter(|p| p.category == category)
            .cloned()
            .collect();
        newest_first(&mut products);
        Ok(products)
    }

    async fn search_products(&self, term: &str) -> Result<Vec<Product>, BackendError> {
        let mut products: Vec<Product> = self
            .state
            .read()
            .await
            .products
            .iter()
            .filter(|p| matches_search(p, term))
            .cloned()
            .collect();
        newest_first(&mut products);
        Ok(products)
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product, BackendError> {
        let created = Product {
            id: ProductId::generate(),
            title: product.title,
            description: product.description,
            price: product.price,
            category: product.category,
            tags: product.tags,
            image_url: product.image_url,
            stock: product.stock,
            author: product.author,
            author_handle: product.author_handle,
            created_at: Some(Utc::now()),
        };
        self.state.write().await.products.push(created.clone());
        Ok(created)
    }

    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, BackendError> {
        let mut state = self.state.write().await;
        let product = state
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| BackendError::NotFound(format!("product {id}")))?;
        patch.apply_to(product);
        Ok(product.clone())
    }

    async fn clear_image(&self, id: ProductId) -> Result<Product, BackendError> {
        let mut state = self.state.write().await;
        let product = state
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| BackendError::NotFound(format!("product {id}")))?;
        product.image_url = None;
        Ok(product.clone())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), BackendError> {
        let mut state = self.state.write().await;
        state.products.retain(|p| p.id != id);
        for lines in state.carts.values_mut() {
            lines.retain(|(product_id, _)| *product_id != id);
        }
        Ok(())
    }
}

#[async_trait]
impl CartStore for InMemoryBackend {
    async fn load_cart(&self, user_id: UserId) -> Result<Cart, BackendError> {
        let state = self.state.read().await;
        let Some(lines) = state.carts.get(&user_id) else {
            return Ok(Cart::new());
        };
        Ok(Cart::from_items(lines.iter().filter_map(|(id, quantity)| {
            let product = state.products.iter().find(|p| p.id == *id)?.clone();
            Some(CartItem {
                product,
                quantity: *quantity,
            })
        })))
    }

    async fn save_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), BackendError> {
        self.check_cart_writes()?;
        let mut state = self.state.write().await;
        let lines = state.carts.entry(user_id).or_default();
        match lines.iter_mut().find(|(id, _)| *id == product_id) {
            Some(line) => line.1 = quantity,
            None => lines.push((product_id, quantity)),
        }
        Ok(())
    }

    async fn remove_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), BackendError> {
        self.check_cart_writes()?;
        if let Some(lines) = self.state.write().await.carts.get_mut(&user_id) {
            lines.retain(|(id, _)| *id != product_id);
        }
        Ok(())
    }

    async fn clear_cart(&self, user_id: UserId) -> Result<(), BackendError> {
        self.check_cart_writes()?;
        self.state.write().await.carts.remove(&user_id);
        Ok(())
    }
}

#[async_trait]
impl OrderStore for InMemoryBackend {
    async fn create_order(&self, order: NewOrder) -> Result<Order, BackendError> {
        let order = Order::from_new(OrderId::generate(), order, Utc::now());
        self.state.write().await.orders.push(order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, BackendError> {
        Ok(self
            .state
            .read()
            .await
            .orders
            .iter()
            .find(|o| o.id == id)
            .cloned())
    }

    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, BackendError> {
        let mut orders: Vec<Order> = self
            .state
            .read()
            .await
            .orders
            .iter()
            .filter(|o| o.is_owned_by(user_id))
            .cloned()
            .collect();
        orders.reverse();
        Ok(orders)
    }

    async fn all_orders(&self) -> Result<Vec<Order>, BackendError> {
        let mut orders = self.state.read().await.orders.clone();
        orders.reverse();
        Ok(orders)
    }

    async fn update_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        status: OrderStatus,
    ) -> Result<Option<Order>, BackendError> {
        let mut state = self.state.write().await;
        Ok(state
            .orders
            .iter_mut()
            .find(|o| o.id == id && o.status == expected)
            .map(|order| {
                order.status = status;
                order.clone()
            }))
    }

    async fn set_paid(&self, id: OrderId, is_paid: bool) -> Result<Option<Order>, BackendError> {
        let mut state = self.state.write().await;
        Ok(state.orders.iter_mut().find(|o| o.id == id).map(|order| {
            order.is_paid = is_paid;
            order.clone()
        }))
    }
}

#[async_trait]
impl ProfileStore for InMemoryBackend {
    async fn get_profile(&self, id: UserId) -> Result<Option<UserProfile>, BackendError> {
        Ok(self.state.read().await.profiles.get(&id).cloned())
    }

    async fn insert_profile(&self, profile: &UserProfile) -> Result<(), BackendError> {
        if self.fail_profile_writes.load(Ordering::SeqCst) {
            return Err(BackendError::Api {
                status: 503,
                message: "users table unavailable".to_string(),
            });
        }
        let mut state = self.state.write().await;
        if state.profiles.contains_key(&profile.id) {
            return Err(BackendError::Api {
                status: 409,
                message: "duplicate key value violates unique constraint".to_string(),
            });
        }
        state.profiles.insert(profile.id, profile.clone());
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for InMemoryBackend {
    async fn sign_up(
        &self,
        email: &Email,
        password: &str,
        display_name: &str,
    ) -> Result<AuthUser, BackendError> {
        let mut state = self.state.write().await;
        if state
            .identities
            .iter()
            .any(|identity| identity.user.email.matches(email.as_str()))
        {
            return Err(BackendError::Api {
                status: 422,
                message: "User already registered".to_string(),
            });
        }
        let user = AuthUser {
            id: UserId::generate(),
            email: email.clone(),
            display_name: Some(display_name.to_string()).filter(|name| !name.is_empty()),
        };
        state.identities.push(Identity {
            user: user.clone(),
            password: password.to_string(),
        });
        Ok(user)
    }

    async fn sign_in(&self, email: &Email, password: &str) -> Result<AuthSession, BackendError> {
        let mut state = self.state.write().await;
        let user = state
            .identities
            .iter()
            .find(|identity| {
                identity.user.email.matches(email.as_str()) && identity.password == password
            })
            .map(|identity| identity.user.clone())
            .ok_or_else(|| BackendError::Unauthorized("Invalid login credentials".to_string()))?;
        let access_token = uuid::Uuid::new_v4().to_string();
        state.sessions.insert(access_token.clone(), user.id);
        Ok(AuthSession { access_token, user })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        self.state.write().await.sessions.remove(access_token);
        Ok(())
    }

    async fn send_password_reset(
        &self,
        email: &Email,
        redirect_to: &str,
    ) -> Result<(), BackendError> {
        self.state
            .write()
            .await
            .password_resets
            .push((email.clone(), redirect_to.to_string()));
        Ok(())
    }
}

#[async_trait]
impl ImageStore for InMemoryBackend {
    async fn upload_image(
        &self,
        product_id: ProductId,
        file_name: &str,
        _content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BackendError> {
        let key = object_key(product_id, file_name, Utc::now().timestamp_millis());
        let mut state = self.state.write().await;
        if state.images.contains_key(&key) {
            return Err(BackendError::Api {
                status: 409,
                message: "The resource already exists".to_string(),
            });
        }
        state.images.insert(key.clone(), bytes.len());
        Ok(public_url(MEMORY_BASE_URL, &key))
    }

    async fn remove_image(&self, url: &str) -> Result<(), BackendError> {
        if let Some(key) = object_key_from_url(url) {
            self.state.write().await.images.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use neobazaar_core::{Money, PaymentMethod, ShippingAddress};

    use super::*;

    fn new_product(title: &str) -> NewProduct {
        NewProduct {
            title: title.to_string(),
            description: String::new(),
            price: Money::from_units(10),
            category: "art".to_string(),
            tags: vec![],
            image_url: None,
            stock: Some(3),
            author: None,
            author_handle: None,
        }
    }

    #[tokio::test]
    async fn test_cart_lines_upsert() {
        let backend = InMemoryBackend::new();
        let product = backend.create_product(new_product("A")).await.unwrap();
        let user = UserId::generate();

        backend.save_line(user, product.id, 2).await.unwrap();
        backend.save_line(user, product.id, 5).await.unwrap();

        let cart = backend.load_cart(user).await.unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(product.id).unwrap().quantity, 5);

        backend.clear_cart(user).await.unwrap();
        assert!(backend.load_cart(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failing_cart_writes() {
        let backend = InMemoryBackend::new();
        backend.set_fail_cart_writes(true);
        assert!(backend.clear_cart(UserId::generate()).await.is_err());
    }

    #[tokio::test]
    async fn test_cart_writes_fail_after_limit() {
        let backend = InMemoryBackend::new();
        let product = backend.create_product(new_product("A")).await.unwrap();
        let user = UserId::generate();

        backend.fail_cart_writes_after(1);
        backend.save_line(user, product.id, 1).await.unwrap();
        assert!(backend.save_line(user, product.id, 2).await.is_err());
        assert_eq!(backend.load_cart(user).await.unwrap().get(product.id).unwrap().quantity, 1);

        backend.set_fail_cart_writes(false);
        backend.save_line(user, product.id, 2).await.unwrap();
    }

    #[tokio::test]
    async fn test_status_update_is_compare_and_set() {
        let backend = InMemoryBackend::new();
        let order = backend
            .create_order(NewOrder::from_cart(
                None,
                &Cart::new(),
                ShippingAddress::default(),
                PaymentMethod::Cod,
            ))
            .await
            .unwrap();

        let stale = backend
            .update_status(order.id, OrderStatus::Processing, OrderStatus::Shipped)
            .await
            .unwrap();
        assert!(stale.is_none());

        let updated = backend
            .update_status(order.id, OrderStatus::Pending, OrderStatus::Processing)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Processing);
    }

    #[tokio::test]
    async fn test_sign_in_checks_password() {
        let backend = InMemoryBackend::new();
        let email = Email::parse("a@shop.in").unwrap();
        backend.sign_up(&email, "hunter22", "A").await.unwrap();

        assert!(matches!(
            backend.sign_in(&email, "wrong").await,
            Err(BackendError::Unauthorized(_))
        ));
        let session = backend.sign_in(&email, "hunter22").await.unwrap();
        assert_eq!(backend.active_sessions().await, 1);
        backend.sign_out(&session.access_token).await.unwrap();
        assert_eq!(backend.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn test_image_round_trip() {
        let backend = InMemoryBackend::new();
        let url = backend
            .upload_image(ProductId::generate(), "a.jpg", "image/jpeg", vec![1, 2, 3])
            .await
            .unwrap();
        assert_eq!(backend.image_keys().await.len(), 1);
        backend.remove_image(&url).await.unwrap();
        assert!(backend.image_keys().await.is_empty());
    }
}

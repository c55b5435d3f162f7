//! Cart persistence routing.
//!
//! A signed-in shopper's cart lives in the backend `carts` table, one row per
//! product, and the table is the source of truth on every load. A guest's cart
//! lives in the session under [`session_keys::GUEST_CART`] as bare
//! `(product, quantity)` lines. Both kinds are joined with the current catalog
//! on load, so prices are always today's and deleted products drop out.
//! Mutations follow the rules in [`neobazaar_core::cart`] and are then written
//! to whichever store owns the cart. A failed remote write is reported;
//! nothing is rolled back.

use neobazaar_backend::{Backend, BackendError};
use neobazaar_core::{Cart, CartItem, LineChange, ProductId, UserId};
use thiserror::Error;
use tower_sessions::Session;
use tracing::{debug, instrument, warn};

use crate::models::{CurrentUser, GuestCartLine, session_keys};

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Product does not exist in the catalog.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// Backend call failed.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// Session storage failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// Which store owns the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOwner {
    Account(UserId),
    Guest,
}

impl CartOwner {
    #[must_use]
    pub fn for_user(user: Option<&CurrentUser>) -> Self {
        user.map_or(Self::Guest, |user| Self::Account(user.id))
    }
}

/// Cart operations for one request.
pub struct CartService<'a> {
    backend: &'a Backend,
    session: &'a Session,
    owner: CartOwner,
}

impl<'a> CartService<'a> {
    /// Create a cart service for the shopper behind `session`.
    #[must_use]
    pub const fn new(backend: &'a Backend, session: &'a Session, owner: CartOwner) -> Self {
        Self {
            backend,
            session,
            owner,
        }
    }

    #[must_use]
    pub const fn owner(&self) -> CartOwner {
        self.owner
    }

    /// Load the cart from its owning store.
    ///
    /// For a signed-in shopper, guest lines left behind by a failed merge at
    /// login are folded in first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend or session read fails.
    pub async fn load(&self) -> Result<Cart, CartError> {
        match self.owner {
            CartOwner::Account(user_id) => {
                if has_guest_lines(self.session).await? {
                    let _ = merge_guest_cart(self.backend, self.session, user_id)
                        .await
                        .inspect_err(|e| warn!(error = %e, "Guest cart still not merged"));
                }
                Ok(self.backend.carts().load_cart(user_id).await?)
            }
            CartOwner::Guest => load_guest_cart(self.backend, self.session).await,
        }
    }

    /// Add `quantity` units of a product.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductNotFound` for unknown products, or a
    /// backend/session error if persisting fails.
    #[instrument(skip(self), fields(owner = ?self.owner))]
    pub async fn add(&self, product_id: ProductId, quantity: u32) -> Result<Cart, CartError> {
        let product = self
            .backend
            .catalog()
            .get_product(product_id)
            .await?
            .ok_or(CartError::ProductNotFound(product_id))?;

        let mut cart = self.load().await?;
        let change = cart.add_item(product, quantity);
        self.persist(&cart, change).await?;
        Ok(cart)
    }

    /// Set the quantity of a line; zero or less removes it.
    ///
    /// # Errors
    ///
    /// Returns a backend/session error if persisting fails.
    #[instrument(skip(self), fields(owner = ?self.owner))]
    pub async fn set_quantity(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Cart, CartError> {
        let mut cart = self.load().await?;
        let change = cart.set_quantity(product_id, quantity);
        self.persist(&cart, change).await?;
        Ok(cart)
    }

    /// Remove a product from the cart.
    ///
    /// # Errors
    ///
    /// Returns a backend/session error if persisting fails.
    #[instrument(skip(self), fields(owner = ?self.owner))]
    pub async fn remove(&self, product_id: ProductId) -> Result<Cart, CartError> {
        let mut cart = self.load().await?;
        let change = cart.remove_item(product_id);
        self.persist(&cart, change).await?;
        Ok(cart)
    }

    /// Empty the cart in its owning store.
    ///
    /// # Errors
    ///
    /// Returns a backend/session error if clearing fails.
    pub async fn clear(&self) -> Result<(), CartError> {
        match self.owner {
            CartOwner::Account(user_id) => self.backend.carts().clear_cart(user_id).await?,
            CartOwner::Guest => {
                self.session
                    .remove::<Vec<GuestCartLine>>(session_keys::GUEST_CART)
                    .await?;
            }
        }
        Ok(())
    }

    async fn persist(&self, cart: &Cart, change: LineChange) -> Result<(), CartError> {
        match (self.owner, change) {
            (_, LineChange::Unchanged) => {}
            (
                CartOwner::Account(user_id),
                LineChange::Set {
                    product_id,
                    quantity,
                },
            ) => {
                self.backend
                    .carts()
                    .save_line(user_id, product_id, quantity)
                    .await
                    .inspect_err(|e| warn!(error = %e, "Failed to save cart line"))?;
            }
            (CartOwner::Account(user_id), LineChange::Removed { product_id }) => {
                self.backend
                    .carts()
                    .remove_line(user_id, product_id)
                    .await
                    .inspect_err(|e| warn!(error = %e, "Failed to remove cart line"))?;
            }
            (CartOwner::Guest, _) => {
                self.session
                    .insert(session_keys::GUEST_CART, GuestCartLine::from_cart(cart))
                    .await?;
            }
        }
        Ok(())
    }
}

async fn guest_lines(session: &Session) -> Result<Vec<GuestCartLine>, CartError> {
    Ok(session
        .get::<Vec<GuestCartLine>>(session_keys::GUEST_CART)
        .await?
        .unwrap_or_default())
}

/// Whether the session still holds guest cart lines.
///
/// # Errors
///
/// Returns an error if the session read fails.
pub async fn has_guest_lines(session: &Session) -> Result<bool, CartError> {
    Ok(!guest_lines(session).await?.is_empty())
}

/// Join the session's guest lines with the current catalog.
///
/// Lines whose product no longer exists are dropped.
async fn load_guest_cart(backend: &Backend, session: &Session) -> Result<Cart, CartError> {
    let mut items = Vec::new();
    for line in guest_lines(session).await? {
        match backend.catalog().get_product(line.product_id).await? {
            Some(product) => items.push(CartItem {
                product,
                quantity: line.quantity,
            }),
            None => debug!(product_id = %line.product_id, "Dropping deleted product from guest cart"),
        }
    }
    Ok(Cart::from_items(items))
}

/// Fold the session's guest cart into an account cart.
///
/// Each guest line is added with the usual merge rule and written to the
/// account store. A line leaves the session as soon as its write succeeds,
/// so a retry after a partial failure only applies what is left. Returns the
/// number of account lines written.
///
/// # Errors
///
/// Returns an error if reading either cart or writing a line fails. Lines not
/// yet written stay in the session.
#[instrument(skip(backend, session), fields(user_id = %user_id))]
pub async fn merge_guest_cart(
    backend: &Backend,
    session: &Session,
    user_id: UserId,
) -> Result<usize, CartError> {
    let guest = load_guest_cart(backend, session).await?;
    if guest.is_empty() {
        session
            .remove::<Vec<GuestCartLine>>(session_keys::GUEST_CART)
            .await?;
        return Ok(0);
    }

    let mut account = backend.carts().load_cart(user_id).await?;
    let mut remaining = GuestCartLine::from_cart(&guest);
    let mut written = 0;

    for item in guest.into_items() {
        let product_id = item.product_id();
        if let LineChange::Set { quantity, .. } = account.add_item(item.product, item.quantity) {
            backend
                .carts()
                .save_line(user_id, product_id, quantity)
                .await?;
            written += 1;
        }
        remaining.retain(|line| line.product_id != product_id);
        session.insert(session_keys::GUEST_CART, &remaining).await?;
    }

    session
        .remove::<Vec<GuestCartLine>>(session_keys::GUEST_CART)
        .await?;
    tracing::info!(lines = written, "Merged guest cart into account");
    Ok(written)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use neobazaar_backend::InMemoryBackend;
    use neobazaar_core::{Money, NewProduct, Product, ProductPatch};
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    async fn seeded() -> (Arc<InMemoryBackend>, Backend, Product, Product) {
        let store = Arc::new(InMemoryBackend::new());
        let backend = Backend::in_memory(store.clone());
        let mut products = Vec::new();
        for (title, price) in [("Neon", 14999_u64), ("Retro", 8500)] {
            let product = backend
                .catalog()
                .create_product(NewProduct {
                    title: title.to_string(),
                    description: String::new(),
                    price: Money::from_minor(price),
                    category: "art".to_string(),
                    tags: vec![],
                    image_url: None,
                    stock: Some(5),
                    author: None,
                    author_handle: None,
                })
                .await
                .unwrap();
            products.push(product);
        }
        let b = products.pop().unwrap();
        let a = products.pop().unwrap();
        (store, backend, a, b)
    }

    #[tokio::test]
    async fn test_guest_cart_lives_in_session() {
        let (_, backend, a, _) = seeded().await;
        let session = session();
        let carts = CartService::new(&backend, &session, CartOwner::Guest);

        carts.add(a.id, 1).await.unwrap();
        carts.add(a.id, 2).await.unwrap();

        let stored: Vec<GuestCartLine> = session
            .get(session_keys::GUEST_CART)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            stored,
            vec![GuestCartLine {
                product_id: a.id,
                quantity: 3
            }]
        );
    }

    #[tokio::test]
    async fn test_account_cart_replicates_to_backend() {
        let (_, backend, a, b) = seeded().await;
        let session = session();
        let user = UserId::generate();
        let carts = CartService::new(&backend, &session, CartOwner::Account(user));

        carts.add(a.id, 1).await.unwrap();
        carts.add(b.id, 2).await.unwrap();
        carts.set_quantity(b.id, 0).await.unwrap();

        let remote = backend.carts().load_cart(user).await.unwrap();
        assert_eq!(remote.len(), 1);
        assert!(remote.get(b.id).is_none());
        // Nothing leaks into the guest slot.
        assert!(
            session
                .get::<Vec<GuestCartLine>>(session_keys::GUEST_CART)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_unknown_product_rejected() {
        let (_, backend, _, _) = seeded().await;
        let session = session();
        let carts = CartService::new(&backend, &session, CartOwner::Guest);
        let err = carts.add(ProductId::generate(), 1).await.unwrap_err();
        assert!(matches!(err, CartError::ProductNotFound(_)));
    }

    #[tokio::test]
    async fn test_remote_failure_is_reported() {
        let (store, backend, a, _) = seeded().await;
        let session = session();
        let carts = CartService::new(&backend, &session, CartOwner::Account(UserId::generate()));
        store.set_fail_cart_writes(true);
        assert!(matches!(
            carts.add(a.id, 1).await,
            Err(CartError::Backend(_))
        ));
    }

    #[tokio::test]
    async fn test_merge_guest_cart_on_login() {
        let (_, backend, a, b) = seeded().await;
        let session = session();
        let user = UserId::generate();

        backend.carts().save_line(user, a.id, 1).await.unwrap();
        let guest = CartService::new(&backend, &session, CartOwner::Guest);
        guest.add(a.id, 2).await.unwrap();
        guest.add(b.id, 1).await.unwrap();

        let written = merge_guest_cart(&backend, &session, user).await.unwrap();
        assert_eq!(written, 2);

        let account = backend.carts().load_cart(user).await.unwrap();
        assert_eq!(account.get(a.id).unwrap().quantity, 3);
        assert_eq!(account.get(b.id).unwrap().quantity, 1);
        assert!(guest.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_merge_keeps_guest_cart_on_failure() {
        let (store, backend, a, _) = seeded().await;
        let session = session();
        let guest = CartService::new(&backend, &session, CartOwner::Guest);
        guest.add(a.id, 1).await.unwrap();

        store.set_fail_cart_writes(true);
        assert!(
            merge_guest_cart(&backend, &session, UserId::generate())
                .await
                .is_err()
        );
        assert_eq!(guest.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_guest_cart_uses_current_catalog() {
        let (_, backend, a, b) = seeded().await;
        let session = session();
        let guest = CartService::new(&backend, &session, CartOwner::Guest);
        guest.add(a.id, 1).await.unwrap();
        guest.add(b.id, 2).await.unwrap();

        backend
            .catalog()
            .update_product(
                a.id,
                ProductPatch {
                    price: Some(Money::from_units(600)),
                    ..ProductPatch::default()
                },
            )
            .await
            .unwrap();
        backend.catalog().delete_product(b.id).await.unwrap();

        let cart = guest.load().await.unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(a.id).unwrap().product.price, Money::from_units(600));
        assert!(cart.get(b.id).is_none());
    }

    #[tokio::test]
    async fn test_merge_retry_applies_only_unwritten_lines() {
        let (store, backend, a, b) = seeded().await;
        let session = session();
        let user = UserId::generate();

        backend.carts().save_line(user, a.id, 1).await.unwrap();
        let guest = CartService::new(&backend, &session, CartOwner::Guest);
        guest.add(a.id, 2).await.unwrap();
        guest.add(b.id, 1).await.unwrap();

        store.fail_cart_writes_after(1);
        assert!(merge_guest_cart(&backend, &session, user).await.is_err());

        let left: Vec<GuestCartLine> = session
            .get(session_keys::GUEST_CART)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            left,
            vec![GuestCartLine {
                product_id: b.id,
                quantity: 1
            }]
        );

        store.set_fail_cart_writes(false);
        assert_eq!(merge_guest_cart(&backend, &session, user).await.unwrap(), 1);

        let account = backend.carts().load_cart(user).await.unwrap();
        assert_eq!(account.get(a.id).unwrap().quantity, 3);
        assert_eq!(account.get(b.id).unwrap().quantity, 1);
        assert!(!has_guest_lines(&session).await.unwrap());
    }

    #[tokio::test]
    async fn test_account_load_picks_up_unmerged_guest_lines() {
        let (store, backend, a, _) = seeded().await;
        let session = session();
        let user = UserId::generate();
        CartService::new(&backend, &session, CartOwner::Guest)
            .add(a.id, 2)
            .await
            .unwrap();

        store.set_fail_cart_writes(true);
        assert!(merge_guest_cart(&backend, &session, user).await.is_err());
        store.set_fail_cart_writes(false);

        let account = CartService::new(&backend, &session, CartOwner::Account(user));
        let cart = account.load().await.unwrap();
        assert_eq!(cart.get(a.id).unwrap().quantity, 2);
        assert!(!has_guest_lines(&session).await.unwrap());
    }
}

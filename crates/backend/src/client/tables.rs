//! Table access: products, carts, orders and user profiles.

use async_trait::async_trait;
use neobazaar_core::{
    Cart, NewOrder, NewProduct, Order, OrderId, OrderStatus, Product, ProductId, ProductPatch,
    UserId, UserProfile,
};
use reqwest::Method;
use serde_json::json;
use tracing::{debug, instrument};

use super::BackendClient;
use super::cache::{CacheKey, CacheValue};
use crate::error::BackendError;
use crate::rows::{CartLineInsert, CartLineRef, CartRow, ProductRow, ProfileRow, cart_from_rows};
use crate::store::{CartStore, CatalogStore, OrderStore, ProfileStore};

const RETURN_REPRESENTATION: (&str, &str) = ("Prefer", "return=representation");

/// Characters with meaning inside a `PostgREST` `or=(...)` filter.
const FILTER_RESERVED: &[char] = &[',', '(', ')', '*', '"', '\\', ':'];

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{value}")
}

fn first<T>(rows: Vec<T>, what: impl Into<String>) -> Result<T, BackendError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| BackendError::NotFound(what.into()))
}

/// Render a row id for an `eq.` filter regardless of its JSON type.
fn row_id(value: &serde_json::Value) -> String {
    value
        .as_str()
        .map_or_else(|| value.to_string(), str::to_string)
}

impl BackendClient {
    async fn product_rows(&self, query: &[(&str, &str)]) -> Result<Vec<Product>, BackendError> {
        let rows: Vec<ProductRow> = self
            .send_json(self.rest(Method::GET, "products", query)?)
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn order_rows(&self, query: &[(&str, &str)]) -> Result<Vec<Order>, BackendError> {
        self.send_json(self.rest(Method::GET, "orders", query)?)
            .await
    }

    async fn patch_order(
        &self,
        query: &[(&str, &str)],
        body: serde_json::Value,
    ) -> Result<Option<Order>, BackendError> {
        let rows: Vec<Order> = self
            .send_json(
                self.rest(Method::PATCH, "orders", query)?
                    .header(RETURN_REPRESENTATION.0, RETURN_REPRESENTATION.1)
                    .json(&body),
            )
            .await?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl CatalogStore for BackendClient {
    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::AllProducts).await
        {
            debug!("Cache hit for product list");
            return Ok(products);
        }

        let products = self
            .product_rows(&[("select", "*"), ("order", "created_at.desc")])
            .await?;

        self.inner
            .cache
            .insert(CacheKey::AllProducts, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, BackendError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(Some(*product));
        }

        let filter = eq(id);
        let product = self
            .product_rows(&[("select", "*"), ("id", filter.as_str())])
            .await?
            .into_iter()
            .next();

        if let Some(product) = &product {
            self.inner
                .cache
                .insert(key, CacheValue::Product(Box::new(product.clone())))
                .await;
        }

        Ok(product)
    }

    #[instrument(skip(self))]
    async fn products_by_category(&self, category: &str) -> Result<Vec<Product>, BackendError> {
        let filter = eq(category);
        self.product_rows(&[
            ("select", "*"),
            ("category", filter.as_str()),
            ("order", "created_at.desc"),
        ])
        .await
    }

    #[instrument(skip(self))]
    async fn search_products(&self, term: &str) -> Result<Vec<Product>, BackendError> {
        let term: String = term
            .trim()
            .chars()
            .filter(|c| !FILTER_RESERVED.contains(c))
            .collect();
        if term.is_empty() {
            return self.list_products().await;
        }

        let or = format!(
            "(title.ilike.*{term}*,description.ilike.*{term}*,category.ilike.*{term}*)"
        );
        self.product_rows(&[("select", "*"), ("or", or.as_str()), ("order", "created_at.desc")])
            .await
    }

    #[instrument(skip(self, product), fields(title = %product.title))]
    async fn create_product(&self, product: NewProduct) -> Result<Product, BackendError> {
        let rows: Vec<ProductRow> = self
            .send_json(
                self.rest(Method::POST, "products", &[])?
                    .header(RETURN_REPRESENTATION.0, RETURN_REPRESENTATION.1)
                    .json(&product),
            )
            .await?;
        self.invalidate_products().await;
        first(rows, "created product").map(Product::from)
    }

    #[instrument(skip(self, patch), fields(product_id = %id))]
    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, BackendError> {
        let filter = eq(id);
        let rows: Vec<ProductRow> = self
            .send_json(
                self.rest(Method::PATCH, "products", &[("id", filter.as_str())])?
                    .header(RETURN_REPRESENTATION.0, RETURN_REPRESENTATION.1)
                    .json(&patch),
            )
            .await?;
        self.invalidate_products().await;
        first(rows, format!("product {id}")).map(Product::from)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn clear_image(&self, id: ProductId) -> Result<Product, BackendError> {
        let filter = eq(id);
        let rows: Vec<ProductRow> = self
            .send_json(
                self.rest(Method::PATCH, "products", &[("id", filter.as_str())])?
                    .header(RETURN_REPRESENTATION.0, RETURN_REPRESENTATION.1)
                    .json(&json!({ "image_url": null })),
            )
            .await?;
        self.invalidate_products().await;
        first(rows, format!("product {id}")).map(Product::from)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn delete_product(&self, id: ProductId) -> Result<(), BackendError> {
        let filter = eq(id);
        self.send(self.rest(Method::DELETE, "products", &[("id", filter.as_str())])?)
            .await?;
        self.invalidate_products().await;
        Ok(())
    }
}

#[async_trait]
impl CartStore for BackendClient {
    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn load_cart(&self, user_id: UserId) -> Result<Cart, BackendError> {
        let filter = eq(user_id);
        let rows: Vec<CartRow> = self
            .send_json(self.rest(
                Method::GET,
                "carts",
                &[("select", "quantity,products(*)"), ("user_id", filter.as_str())],
            )?)
            .await?;
        Ok(cart_from_rows(rows))
    }

    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    async fn save_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), BackendError> {
        let user_filter = eq(user_id);
        let product_filter = eq(product_id);
        let existing: Vec<CartLineRef> = self
            .send_json(self.rest(
                Method::GET,
                "carts",
                &[
                    ("select", "id"),
                    ("user_id", user_filter.as_str()),
                    ("product_id", product_filter.as_str()),
                ],
            )?)
            .await?;

        let request = match existing.first() {
            Some(line) => {
                let id_filter = eq(row_id(&line.id));
                self.rest(Method::PATCH, "carts", &[("id", id_filter.as_str())])?
                    .json(&json!({ "quantity": quantity }))
            }
            None => self.rest(Method::POST, "carts", &[])?.json(&CartLineInsert {
                user_id,
                product_id,
                quantity,
            }),
        };
        self.send(request).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    async fn remove_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), BackendError> {
        let user_filter = eq(user_id);
        let product_filter = eq(product_id);
        self.send(self.rest(
            Method::DELETE,
            "carts",
            &[("user_id", user_filter.as_str()), ("product_id", product_filter.as_str())],
        )?)
        .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn clear_cart(&self, user_id: UserId) -> Result<(), BackendError> {
        let filter = eq(user_id);
        self.send(self.rest(Method::DELETE, "carts", &[("user_id", filter.as_str())])?)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for BackendClient {
    #[instrument(skip(self, order), fields(items = order.items.len()))]
    async fn create_order(&self, order: NewOrder) -> Result<Order, BackendError> {
        let rows: Vec<Order> = self
            .send_json(
                self.rest(Method::POST, "orders", &[])?
                    .header(RETURN_REPRESENTATION.0, RETURN_REPRESENTATION.1)
                    .json(&order),
            )
            .await?;
        first(rows, "created order")
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, BackendError> {
        let filter = eq(id);
        Ok(self
            .order_rows(&[("select", "*"), ("id", filter.as_str())])
            .await?
            .into_iter()
            .next())
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, BackendError> {
        let filter = eq(user_id);
        self.order_rows(&[
            ("select", "*"),
            ("user_id", filter.as_str()),
            ("order", "created_at.desc"),
        ])
        .await
    }

    #[instrument(skip(self))]
    async fn all_orders(&self) -> Result<Vec<Order>, BackendError> {
        self.order_rows(&[("select", "*"), ("order", "created_at.desc")])
            .await
    }

    #[instrument(skip(self), fields(order_id = %id, from = %expected, to = %status))]
    async fn update_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        status: OrderStatus,
    ) -> Result<Option<Order>, BackendError> {
        let id_filter = eq(id);
        let status_filter = eq(expected);
        self.patch_order(
            &[("id", id_filter.as_str()), ("status", status_filter.as_str())],
            json!({ "status": status }),
        )
        .await
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn set_paid(&self, id: OrderId, is_paid: bool) -> Result<Option<Order>, BackendError> {
        let filter = eq(id);
        self.patch_order(&[("id", filter.as_str())], json!({ "is_paid": is_paid }))
            .await
    }
}

#[async_trait]
impl ProfileStore for BackendClient {
    #[instrument(skip(self), fields(user_id = %id))]
    async fn get_profile(&self, id: UserId) -> Result<Option<UserProfile>, BackendError> {
        let filter = eq(id);
        let rows: Vec<ProfileRow> = self
            .send_json(self.rest(Method::GET, "users", &[("select", "*"), ("id", filter.as_str())])?)
            .await?;
        Ok(rows.into_iter().next().and_then(ProfileRow::into_profile))
    }

    #[instrument(skip(self, profile), fields(user_id = %profile.id))]
    async fn insert_profile(&self, profile: &UserProfile) -> Result<(), BackendError> {
        self.send(self.rest(Method::POST, "users", &[])?.json(profile))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_row_id_formats_strings_and_numbers() {
        assert_eq!(row_id(&json!("abc")), "abc");
        assert_eq!(row_id(&json!(42)), "42");
    }

    #[test]
    fn test_first_reports_missing_row() {
        let err = first(Vec::<u8>::new(), "thing").unwrap_err();
        assert!(err.is_not_found());
    }
}

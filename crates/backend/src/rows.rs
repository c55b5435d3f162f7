//! Table row shapes and their conversions into domain types.

use chrono::{DateTime, Utc};
use neobazaar_core::{
    Cart, CartItem, Email, Money, Product, ProductId, UserId, UserProfile, UserRole,
};
use serde::{Deserialize, Serialize};

/// Row in `products`. Nullable columns are tolerated.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ProductRow {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Money,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub author_handle: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description.unwrap_or_default(),
            price: row.price,
            category: row.category.unwrap_or_default(),
            tags: row.tags.unwrap_or_default(),
            image_url: row.image_url.filter(|url| !url.is_empty()),
            stock: row.stock.and_then(|s| u32::try_from(s).ok()),
            author: row.author,
            author_handle: row.author_handle,
            created_at: row.created_at,
        }
    }
}

/// Row in `carts` joined with its product.
#[derive(Debug, Deserialize)]
pub(crate) struct CartRow {
    pub quantity: i64,
    /// `None` when the product was deleted after being added.
    pub products: Option<ProductRow>,
}

/// Build a cart from joined rows, skipping dangling and non-positive lines.
pub(crate) fn cart_from_rows(rows: Vec<CartRow>) -> Cart {
    Cart::from_items(rows.into_iter().filter_map(|row| {
        let quantity = u32::try_from(row.quantity).ok().filter(|q| *q > 0)?;
        let product = Product::from(row.products?);
        Some(CartItem { product, quantity })
    }))
}

/// Row id and quantity of an existing cart line.
#[derive(Debug, Deserialize)]
pub(crate) struct CartLineRef {
    pub id: serde_json::Value,
}

/// New cart line.
#[derive(Debug, Serialize)]
pub(crate) struct CartLineInsert {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Row in `users`.
#[derive(Debug, Deserialize)]
pub(crate) struct ProfileRow {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
}

impl ProfileRow {
    /// Convert, returning `None` if the stored email is unusable.
    pub(crate) fn into_profile(self) -> Option<UserProfile> {
        let email = Email::parse(&self.email).ok()?;
        let display_name = self
            .display_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| email.local_part().to_string());
        Some(UserProfile {
            id: self.id,
            email,
            display_name,
            role: self.role.unwrap_or_default(),
        })
    }
}

//! Catalog products.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{Money, ProductId};

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub price: Money,
    /// Free-text category.
    pub category: String,
    /// Display order is preserved.
    pub tags: Vec<String>,
    /// Public URL of the product image, if one was uploaded.
    pub image_url: Option<String>,
    /// Units in stock; `None` when stock is not tracked.
    pub stock: Option<u32>,
    pub author: Option<String>,
    pub author_handle: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Input for creating a product from the admin surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    #[serde(default)]
    pub category: String,
    /// A list or a comma-separated string.
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Defaults to zero when omitted.
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub author_handle: Option<String>,
}

impl NewProduct {
    /// Trim the title and normalize tags.
    ///
    /// # Errors
    ///
    /// Returns an error message when the title is blank.
    pub fn normalized(mut self) -> Result<Self, String> {
        self.title = self.title.trim().to_string();
        if self.title.is_empty() {
            return Err("product title is required".to_string());
        }
        self.tags = normalize_tags(self.tags);
        self.stock = Some(self.stock.unwrap_or(0));
        Ok(self)
    }
}

/// Partial product update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_tags",
        skip_serializing_if = "Option::is_none"
    )]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

impl ProductPatch {
    /// Trim a replacement title and normalize replacement tags.
    ///
    /// # Errors
    ///
    /// Returns an error message when the patch would blank the title.
    pub fn normalized(mut self) -> Result<Self, String> {
        if let Some(title) = self.title.take() {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err("product title is required".to_string());
            }
            self.title = Some(title);
        }
        self.tags = self.tags.map(normalize_tags);
        Ok(self)
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.tags.is_none()
            && self.image_url.is_none()
            && self.stock.is_none()
    }

    /// Apply the patch to a product in place.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(title) = &self.title {
            product.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            product.description.clone_from(description);
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(category) = &self.category {
            product.category.clone_from(category);
        }
        if let Some(tags) = &self.tags {
            product.tags = normalize_tags(tags.clone());
        }
        if let Some(image_url) = &self.image_url {
            product.image_url = Some(image_url.clone());
        }
        if let Some(stock) = self.stock {
            product.stock = Some(stock);
        }
    }
}

/// Catalog listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Newest,
    Oldest,
    PriceHigh,
    PriceLow,
}

impl ProductSort {
    /// Sort a slice of products in memory.
    pub fn sort(self, products: &mut [Product]) {
        match self {
            Self::Newest => products.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            Self::Oldest => products.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            Self::PriceHigh => products.sort_by(|a, b| b.price.cmp(&a.price)),
            Self::PriceLow => products.sort_by(|a, b| a.price.cmp(&b.price)),
        }
    }
}

/// Split a comma-separated tag list the way the admin form submits it.
///
/// ```
/// use neobazaar_core::catalog::parse_tag_list;
///
/// assert_eq!(parse_tag_list(" cyberpunk, neon ,,art"), vec!["CYBERPUNK", "NEON", "ART"]);
/// ```
#[must_use]
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    normalize_tags(raw.split(',').map(str::to_string).collect())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TagInput {
    List(Vec<String>),
    Csv(String),
}

impl From<TagInput> for Vec<String> {
    fn from(input: TagInput) -> Self {
        match input {
            TagInput::List(tags) => tags,
            TagInput::Csv(raw) => parse_tag_list(&raw),
        }
    }
}

fn deserialize_tags<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    TagInput::deserialize(deserializer).map(Into::into)
}

fn deserialize_optional_tags<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error> {
    Option::<TagInput>::deserialize(deserializer).map(|tags| tags.map(Into::into))
}

/// Trim and uppercase tags, dropping blanks and later duplicates.
#[must_use]
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_uppercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// Case-insensitive substring match over title, description and category.
#[must_use]
pub fn matches_search(product: &Product, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    [&product.title, &product.description, &product.category]
        .iter()
        .any(|field| field.to_lowercase().contains(&term))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Build a product with the given price in minor units.
    pub fn product(title: &str, price_minor: u64) -> Product {
        Product {
            id: ProductId::generate(),
            title: title.to_string(),
            description: format!("{title} description"),
            price: Money::from_minor(price_minor),
            category: "prompts".to_string(),
            tags: vec![],
            image_url: None,
            stock: Some(10),
            author: None,
            author_handle: None,
            created_at: None,
        }
    }
}

//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use neobazaar_core::{Product, ProductId, ProductSort};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Query parameters for the product listing.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    #[serde(default)]
    pub sort: Option<ProductSort>,
    pub category: Option<String>,
    /// Free-text search over title, description and category.
    pub q: Option<String>,
}

/// List products.
///
/// A search term wins over a category filter. Results default to newest first.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>> {
    let catalog = state.backend().catalog();

    let term = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let mut products = match (term, category) {
        (Some(term), _) => catalog.search_products(term).await?,
        (None, Some(category)) => catalog.products_by_category(category).await?,
        (None, None) => catalog.list_products().await?,
    };

    query.sort.unwrap_or_default().sort(&mut products);
    Ok(Json(products))
}

/// Product detail.
#[instrument(skip(state), fields(product_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    state
        .backend()
        .catalog()
        .get_product(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

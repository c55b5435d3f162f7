//! Product management route handlers.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use neobazaar_core::{NewProduct, Product, ProductId, ProductPatch};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::services::{ImageUpload, ProductService};
use crate::state::AppState;

/// Multipart field carrying the image file.
const IMAGE_FIELD: &str = "image";

/// List products, newest first.
pub async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(ProductService::new(state.backend()).list().await?))
}

/// Product detail.
pub async fn show(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    Ok(Json(ProductService::new(state.backend()).get(id).await?))
}

/// Create a product.
#[instrument(skip(state, admin, input), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Json(input): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = ProductService::new(state.backend()).create(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Partially update a product.
#[instrument(skip(state, admin, patch), fields(admin_id = %admin.id, product_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<ProductId>,
    Json(patch): Json<ProductPatch>,
) -> Result<Json<Product>> {
    Ok(Json(ProductService::new(state.backend()).update(id, patch).await?))
}

/// Delete a product.
#[instrument(skip(state, admin), fields(admin_id = %admin.id, product_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    ProductService::new(state.backend()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Upload a product image from the `image` multipart field.
#[instrument(skip(state, admin, multipart), fields(admin_id = %admin.id, product_id = %id))]
pub async fn upload_image(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<ProductId>,
    mut multipart: Multipart,
) -> Result<Json<Product>> {
    let upload = read_image_field(&mut multipart).await?;
    Ok(Json(
        ProductService::new(state.backend())
            .upload_image(id, upload)
            .await?,
    ))
}

/// Remove a product image.
#[instrument(skip(state, admin), fields(admin_id = %admin.id, product_id = %id))]
pub async fn remove_image(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    Ok(Json(
        ProductService::new(state.backend()).remove_image(id).await?,
    ))
}

async fn read_image_field(multipart: &mut Multipart) -> Result<ImageUpload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        return Ok(ImageUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    Err(AppError::BadRequest(format!(
        "missing multipart field '{IMAGE_FIELD}'"
    )))
}

//! Product administration and image management.

use neobazaar_backend::{Backend, BackendError};
use neobazaar_core::{NewProduct, Product, ProductId, ProductPatch};
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Largest accepted image upload.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Errors from product administration.
#[derive(Debug, Error)]
pub enum ProductError {
    #[error("product not found: {0}")]
    NotFound(ProductId),

    /// Rejected input, with a message safe to show the admin.
    #[error("{0}")]
    Invalid(String),

    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// An image received from the admin form.
#[derive(Debug)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    fn validate(&self) -> Result<(), ProductError> {
        if self.bytes.is_empty() {
            return Err(ProductError::Invalid("image file is empty".to_string()));
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(ProductError::Invalid(format!(
                "image must be at most {} MB",
                MAX_IMAGE_BYTES / (1024 * 1024)
            )));
        }
        if !self.content_type.starts_with("image/") {
            return Err(ProductError::Invalid(format!(
                "unsupported content type: {}",
                self.content_type
            )));
        }
        Ok(())
    }
}

/// Product administration service.
pub struct ProductService<'a> {
    backend: &'a Backend,
}

impl<'a> ProductService<'a> {
    #[must_use]
    pub const fn new(backend: &'a Backend) -> Self {
        Self { backend }
    }

    /// All products, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails.
    pub async fn list(&self) -> Result<Vec<Product>, ProductError> {
        Ok(self.backend.catalog().list_products().await?)
    }

    /// One product.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::NotFound` if no such product exists.
    pub async fn get(&self, id: ProductId) -> Result<Product, ProductError> {
        self.backend
            .catalog()
            .get_product(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// Create a product. Tags are upper-cased and de-duplicated; missing
    /// stock becomes zero.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::Invalid` for a blank title.
    #[instrument(skip(self, product), fields(title = %product.title))]
    pub async fn create(&self, product: NewProduct) -> Result<Product, ProductError> {
        let product = product.normalized().map_err(ProductError::Invalid)?;
        let created = self.backend.catalog().create_product(product).await?;
        info!(product_id = %created.id, "Product created");
        Ok(created)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::Invalid` for an empty patch or blank title, and
    /// `ProductError::NotFound` if no such product exists.
    #[instrument(skip(self, patch), fields(product_id = %id))]
    pub async fn update(&self, id: ProductId, patch: ProductPatch) -> Result<Product, ProductError> {
        if patch.is_empty() {
            return Err(ProductError::Invalid("nothing to update".to_string()));
        }
        let patch = patch.normalized().map_err(ProductError::Invalid)?;
        self.backend
            .catalog()
            .update_product(id, patch)
            .await
            .map_err(|e| match e {
                BackendError::NotFound(_) => ProductError::NotFound(id),
                other => ProductError::Backend(other),
            })
    }

    /// Delete a product, then its stored image.
    ///
    /// Image removal is best-effort: a failure is logged and the delete
    /// still succeeds.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::NotFound` if no such product exists.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&self, id: ProductId) -> Result<(), ProductError> {
        let product = self.get(id).await?;
        self.backend.catalog().delete_product(id).await?;

        if let Some(url) = product.image_url.as_deref() {
            if let Err(e) = self.backend.images().remove_image(url).await {
                warn!(error = %e, url, "Product deleted but image removal failed");
            }
        }

        info!("Product deleted");
        Ok(())
    }

    /// Upload an image and point the product at it.
    ///
    /// Any previous image is removed best-effort after the product is updated.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::Invalid` for an empty, oversized or non-image
    /// upload and `ProductError::NotFound` if no such product exists.
    #[instrument(skip(self, upload), fields(product_id = %id, file_name = %upload.file_name))]
    pub async fn upload_image(&self, id: ProductId, upload: ImageUpload) -> Result<Product, ProductError> {
        upload.validate()?;
        let existing = self.get(id).await?;

        let url = self
            .backend
            .images()
            .upload_image(id, &upload.file_name, &upload.content_type, upload.bytes)
            .await?;

        let patch = ProductPatch {
            image_url: Some(url),
            ..ProductPatch::default()
        };
        let updated = self.backend.catalog().update_product(id, patch).await?;

        if let Some(old) = existing.image_url.as_deref() {
            if let Err(e) = self.backend.images().remove_image(old).await {
                warn!(error = %e, url = old, "Failed to remove replaced image");
            }
        }

        Ok(updated)
    }

    /// Remove the product's image and clear its URL.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::NotFound` if no such product exists.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn remove_image(&self, id: ProductId) -> Result<Product, ProductError> {
        let product = self.get(id).await?;
        let Some(url) = product.image_url.as_deref() else {
            return Ok(product);
        };

        self.backend.images().remove_image(url).await?;
        Ok(self.backend.catalog().clear_image(id).await?)
    }
}

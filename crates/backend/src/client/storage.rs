//! Product image uploads.

use async_trait::async_trait;
use chrono::Utc;
use neobazaar_core::ProductId;
use reqwest::Method;
use serde_json::json;
use tracing::{debug, instrument};

use super::BackendClient;
use crate::error::BackendError;
use crate::storage::{
    IMAGE_CACHE_SECONDS, PRODUCT_BUCKET, object_key, object_key_from_url, public_url,
};
use crate::store::ImageStore;

#[async_trait]
impl ImageStore for BackendClient {
    #[instrument(skip(self, bytes), fields(product_id = %product_id, size = bytes.len()))]
    async fn upload_image(
        &self,
        product_id: ProductId,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BackendError> {
        let key = object_key(product_id, file_name, Utc::now().timestamp_millis());
        self.send(
            self.storage_request(Method::POST, &format!("object/{PRODUCT_BUCKET}/{key}"))?
                .header("Content-Type", content_type)
                .header("Cache-Control", format!("max-age={IMAGE_CACHE_SECONDS}"))
                .header("x-upsert", "false")
                .body(bytes),
        )
        .await?;
        Ok(public_url(self.base_url(), &key))
    }

    #[instrument(skip(self))]
    async fn remove_image(&self, url: &str) -> Result<(), BackendError> {
        let Some(key) = object_key_from_url(url) else {
            debug!("Image URL is outside the product bucket; nothing to remove");
            return Ok(());
        };
        self.send(
            self.storage_request(Method::DELETE, &format!("object/{PRODUCT_BUCKET}"))?
                .json(&json!({ "prefixes": [key] })),
        )
        .await?;
        Ok(())
    }
}

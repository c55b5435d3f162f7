//! Object naming for the product image bucket.

use neobazaar_core::ProductId;

/// Bucket holding product images.
pub const PRODUCT_BUCKET: &str = "products";

/// Cache lifetime applied to uploaded images, in seconds.
pub const IMAGE_CACHE_SECONDS: u32 = 3600;

/// Object key for a product image: `{product_id}-{unix_millis}.{ext}`.
///
/// The extension comes from the uploaded file name; names without one get
/// `bin`.
#[must_use]
pub fn object_key(product_id: ProductId, file_name: &str, unix_millis: i64) -> String {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.trim().to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "bin".to_string());
    format!("{product_id}-{unix_millis}.{ext}")
}

/// Public URL of an object in the product bucket.
#[must_use]
pub fn public_url(base_url: &str, key: &str) -> String {
    format!(
        "{}/storage/v1/object/public/{PRODUCT_BUCKET}/{key}",
        base_url.trim_end_matches('/')
    )
}

/// Object key referenced by a public URL, if it points into the bucket.
#[must_use]
pub fn object_key_from_url(url: &str) -> Option<&str> {
    url.split_once("/products/")
        .map(|(_, key)| key)
        .filter(|key| !key.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_uses_extension() {
        let id: ProductId = "9f1c0f2e-7f43-4b7e-9c1a-3f1f3f1f3f1f".parse().unwrap();
        assert_eq!(
            object_key(id, "cover.PNG", 1_700_000_000_000),
            "9f1c0f2e-7f43-4b7e-9c1a-3f1f3f1f3f1f-1700000000000.png"
        );
        assert!(object_key(id, "noext", 1).ends_with(".bin"));
    }

    #[test]
    fn test_public_url_round_trip() {
        let url = public_url("https://proj.example.co/", "abc-1.jpg");
        assert_eq!(
            url,
            "https://proj.example.co/storage/v1/object/public/products/abc-1.jpg"
        );
        assert_eq!(object_key_from_url(&url), Some("abc-1.jpg"));
    }

    #[test]
    fn test_foreign_url_has_no_key() {
        assert_eq!(object_key_from_url("https://cdn.other.com/img.jpg"), None);
        assert_eq!(object_key_from_url("https://x/products/"), None);
    }
}

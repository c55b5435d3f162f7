//! Product management from the admin, including image uploads.

use neobazaar_backend::MEMORY_BASE_URL;
use neobazaar_core::Money;
use neobazaar_integration_tests::{TestContext, body, money};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};

fn image_form(file_name: &str, content_type: &str, bytes: &[u8]) -> Form {
    let part = Part::bytes(bytes.to_vec())
        .file_name(file_name.to_string())
        .mime_str(content_type)
        .unwrap();
    Form::new().part("image", part)
}

#[tokio::test]
async fn test_product_lifecycle() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin_browser().await;

    let resp = admin
        .post(ctx.admin("/api/products"))
        .json(&json!({
            "title": "  Glitch Hoodie ",
            "price": "1200.00",
            "category": "apparel",
            "tags": ["street", "Street", " neon "]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let product = body(resp).await;
    assert_eq!(product["title"], "Glitch Hoodie");
    assert_eq!(product["tags"], json!(["STREET", "NEON"]));
    let id = product["id"].as_str().unwrap().to_string();

    // Shoppers see it straight away
    let listed = body(
        TestContext::browser()
            .get(ctx.storefront("/api/products?category=apparel"))
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert!(listed.as_array().unwrap().iter().any(|p| p["id"] == id.as_str()));

    let resp = admin
        .patch(ctx.admin(&format!("/api/products/{id}")))
        .json(&json!({ "price": "999" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = body(resp).await;
    assert_eq!(money(&updated["price"]), Money::from_units(999));
    assert_eq!(updated["title"], "Glitch Hoodie");

    let resp = admin.delete(ctx.admin(&format!("/api/products/{id}"))).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = admin.get(ctx.admin(&format!("/api/products/{id}"))).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_product_input_rejected() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin_browser().await;

    let resp = admin
        .post(ctx.admin("/api/products"))
        .json(&json!({ "title": "   ", "price": "10" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let product = ctx.add_product("Pixel Mug", 250, "home").await;
    let resp = admin
        .patch(ctx.admin(&format!("/api/products/{}", product.id)))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_image_upload_replace_and_remove() {
    let ctx = TestContext::new().await;
    let product = ctx.add_product("Pixel Mug", 250, "home").await;
    let admin = ctx.admin_browser().await;
    let image_url = ctx.admin(&format!("/api/products/{}/image", product.id));

    let resp = admin
        .post(&image_url)
        .multipart(image_form("mug.png", "image/png", b"\x89PNG fake"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let first = body(resp).await;
    let first_url = first["image_url"].as_str().unwrap().to_string();
    assert!(first_url.starts_with(MEMORY_BASE_URL));
    assert_eq!(ctx.store.image_keys().await.len(), 1);

    // A new upload replaces the old object
    let resp = admin
        .post(&image_url)
        .multipart(image_form("mug-v2.jpg", "image/jpeg", b"jpeg bytes"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let second = body(resp).await;
    assert_ne!(second["image_url"], Value::String(first_url));
    assert_eq!(ctx.store.image_keys().await.len(), 1);

    let resp = admin.delete(&image_url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body(resp).await["image_url"], Value::Null);
    assert!(ctx.store.image_keys().await.is_empty());
}

#[tokio::test]
async fn test_non_image_upload_rejected() {
    let ctx = TestContext::new().await;
    let product = ctx.add_product("Pixel Mug", 250, "home").await;
    let admin = ctx.admin_browser().await;

    let resp = admin
        .post(ctx.admin(&format!("/api/products/{}/image", product.id)))
        .multipart(image_form("notes.txt", "text/plain", b"hello"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(ctx.store.image_keys().await.is_empty());

    let resp = admin
        .post(ctx.admin(&format!("/api/products/{}/image", product.id)))
        .multipart(Form::new().text("caption", "no file"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

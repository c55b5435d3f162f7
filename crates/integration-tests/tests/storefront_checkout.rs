//! Checkout validation, order placement and order history.

use neobazaar_core::{Money, ProductId};
use neobazaar_integration_tests::{TestContext, body, money, valid_address};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

async fn add_to_cart(ctx: &TestContext, browser: &Client, product_id: ProductId, quantity: u32) {
    let resp = browser
        .post(ctx.storefront("/api/cart/items"))
        .json(&json!({ "product_id": product_id, "quantity": quantity }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

async fn checkout(ctx: &TestContext, browser: &Client, address: Value) -> reqwest::Response {
    browser
        .post(ctx.storefront("/api/checkout"))
        .json(&json!({ "shipping_address": address, "payment_method": "cod" }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_address_rules_reported_in_order() {
    let ctx = TestContext::new().await;
    let poster = ctx.add_product("Neon Skyline Print", 200, "posters").await;
    let browser = TestContext::browser();
    add_to_cart(&ctx, &browser, poster.id, 1).await;

    let cases = [
        ("city", json!("   "), "Please fill all required fields"),
        ("phone", json!("98765-4321"), "Please enter a valid 10-digit phone number"),
        ("phone", json!("98765432101"), "Please enter a valid 10-digit phone number"),
        ("pincode", json!("4110"), "Please enter a valid 6-digit pincode"),
    ];
    for (field, value, message) in cases {
        let mut address = valid_address();
        address[field] = value;
        let resp = checkout(&ctx, &browser, address).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY, "{field}");
        assert_eq!(body(resp).await["error"], message, "{field}");
    }

    // Nothing was ordered and the cart is intact
    assert!(ctx.backend.orders().all_orders().await.unwrap().is_empty());
    let cart = body(browser.get(ctx.storefront("/api/cart")).send().await.unwrap()).await;
    assert_eq!(cart["item_count"], 1);
}

#[tokio::test]
async fn test_empty_cart_cannot_check_out() {
    let ctx = TestContext::new().await;
    let browser = TestContext::browser();

    let resp = checkout(&ctx, &browser, valid_address()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(resp).await["error"], "Your cart is empty");
}

#[tokio::test]
async fn test_guest_order_placed_and_cart_cleared() {
    let ctx = TestContext::new().await;
    let visor = ctx.add_product("Holo Visor", 150, "accessories").await;
    let browser = TestContext::browser();
    add_to_cart(&ctx, &browser, visor.id, 2).await;

    let summary = body(browser.get(ctx.storefront("/api/checkout/summary")).send().await.unwrap()).await;
    assert_eq!(money(&summary["total"]), Money::from_units(350));
    assert_eq!(summary["payment_methods"], json!(["cod", "razorpay", "stripe"]));

    let resp = checkout(&ctx, &browser, valid_address()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let placed = body(resp).await;
    assert_eq!(placed["cart_cleared"], true);
    assert_eq!(placed["order"]["status"], "pending");
    assert_eq!(placed["order"]["is_paid"], false);
    assert_eq!(placed["order"]["user_id"], Value::Null);
    assert_eq!(money(&placed["order"]["total_amount"]), Money::from_units(350));
    assert_eq!(money(&placed["shipping_fee"]), Money::from_units(50));

    let cart = body(browser.get(ctx.storefront("/api/cart")).send().await.unwrap()).await;
    assert_eq!(cart["item_count"], 0);
}

#[tokio::test]
async fn test_account_orders_are_private() {
    let ctx = TestContext::new().await;
    let jacket = ctx.add_product("Chrome Jacket", 900, "apparel").await;

    let buyer = TestContext::browser();
    ctx.register(&buyer, "dev@neobazaar.test").await;
    ctx.login(&buyer, "dev@neobazaar.test").await;
    add_to_cart(&ctx, &buyer, jacket.id, 1).await;
    let placed = body(checkout(&ctx, &buyer, valid_address()).await).await;
    let order_id = placed["order"]["id"].as_str().unwrap().to_string();
    assert_eq!(money(&placed["shipping_fee"]), Money::ZERO);

    let orders = body(buyer.get(ctx.storefront("/api/account/orders")).send().await.unwrap()).await;
    assert_eq!(orders.as_array().map(Vec::len), Some(1));

    let resp = buyer
        .get(ctx.storefront(&format!("/api/account/orders/{order_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Another shopper cannot see it
    let other = TestContext::browser();
    ctx.register(&other, "ivy@neobazaar.test").await;
    ctx.login(&other, "ivy@neobazaar.test").await;
    let resp = other
        .get(ctx.storefront(&format!("/api/account/orders/{order_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Nor can a guest
    let resp = TestContext::browser()
        .get(ctx.storefront("/api/account/orders"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

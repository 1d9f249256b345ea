//! Session-fragment checkout and order placement over HTTP.

use reqwest::StatusCode;
use serde_json::{Value, json};

use sneaker_store_core::{OrderStatus, PaymentMethod, Price};
use sneaker_store_integration_tests::{TestContext, location, test_config};

fn cart() -> Value {
    json!({
        "cart": [
            {"name": "Air Max 90", "brand": "Nike", "price": 8999},
            {"name": "Ultraboost", "price": "12999.50"}
        ],
        "total": 22_998.5
    })
}

fn address() -> Value {
    json!({
        "firstName": "Asha",
        "lastName": "Rao",
        "phone": "9876543210",
        "address": "12 MG Road",
        "city": "Bengaluru",
        "state": "Karnataka",
        "pincode": 560_001,
        "landmark": null
    })
}

fn success() -> Value {
    json!({"status": "success"})
}

#[tokio::test]
async fn test_fragments_then_success_places_one_order() {
    let ctx = TestContext::new().await;
    ctx.login("runner@example.com").await;

    assert_eq!(ctx.post_json("/save-cart", &cart()).await, success());
    assert_eq!(ctx.post_json("/save-address", &address()).await, success());
    assert_eq!(
        ctx.post_json("/save-payment", &json!({"payment_method": "card"})).await,
        success()
    );

    let resp = ctx.get("/success").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");

    let orders = ctx.app.orders.all();
    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert!(body.contains(order.number.as_str()));
    assert_eq!(order.email.as_str(), "runner@example.com");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_method, PaymentMethod::Card);
    assert!(order.payment_status);
    let expected: Price = serde_json::from_value(json!("22998.5")).expect("price");
    assert_eq!(order.total_amount, expected);
    assert_eq!(order.address.pincode, "560001");
    assert_eq!(order.address.landmark, "");

    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[0].product_name, "Air Max 90");
    assert_eq!(order.items[1].brand, "Unknown");
    assert!(order.items.iter().all(|item| item.quantity == 1));

    // Fragments were consumed: a reload places nothing.
    let body = ctx.get("/success").await.text().await.expect("body");
    assert!(body.contains("No order placed"));
    assert_eq!(ctx.app.orders.all().len(), 1);
}

#[tokio::test]
async fn test_payment_method_defaults_to_upi() {
    let ctx = TestContext::new().await;
    ctx.login("runner@example.com").await;
    ctx.post_json("/save-cart", &cart()).await;
    ctx.post_json("/save-address", &address()).await;

    ctx.get("/success").await;

    let orders = ctx.app.orders.all();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].payment_method, PaymentMethod::Upi);
}

#[tokio::test]
async fn test_missing_address_places_nothing() {
    let ctx = TestContext::new().await;
    ctx.login("runner@example.com").await;
    ctx.post_json("/save-cart", &cart()).await;
    ctx.post_json("/save-address", &json!({})).await;

    let body = ctx.get("/success").await.text().await.expect("body");

    assert!(body.contains("No order placed"));
    assert!(ctx.app.orders.all().is_empty());
}

#[tokio::test]
async fn test_empty_cart_places_nothing() {
    let ctx = TestContext::new().await;
    ctx.login("runner@example.com").await;
    ctx.post_json("/save-cart", &json!({"cart": [], "total": 0})).await;
    ctx.post_json("/save-address", &address()).await;

    ctx.get("/success").await;

    assert!(ctx.app.orders.all().is_empty());
}

#[tokio::test]
async fn test_malformed_cart_entry_places_nothing() {
    let ctx = TestContext::new().await;
    ctx.login("runner@example.com").await;
    let bad = json!({"cart": [{"brand": "Nike", "price": 100}], "total": 100});
    assert_eq!(ctx.post_json("/save-cart", &bad).await, success());
    ctx.post_json("/save-address", &address()).await;

    let body = ctx.get("/success").await.text().await.expect("body");

    assert!(body.contains("No order placed"));
    assert!(ctx.app.orders.all().is_empty());
}

#[tokio::test]
async fn test_store_failure_keeps_fragments_for_retry() {
    let ctx = TestContext::new().await;
    ctx.login("runner@example.com").await;
    ctx.post_json("/save-cart", &cart()).await;
    ctx.post_json("/save-address", &address()).await;
    ctx.app.orders.fail_next_create();

    let body = ctx.get("/success").await.text().await.expect("body");
    assert!(body.contains("Error creating order. Please contact support."));
    assert!(ctx.app.orders.all().is_empty());

    ctx.get("/success").await;
    assert_eq!(ctx.app.orders.all().len(), 1);
}

#[tokio::test]
async fn test_overflowing_cart_total_shows_order_error() {
    let ctx = TestContext::new().await;
    ctx.login("runner@example.com").await;
    let huge = json!({"cart": [{"name": "A", "price": 7e28}, {"name": "B", "price": 7e28}], "total": 0});
    assert_eq!(ctx.post_json("/save-cart", &huge).await, success());
    ctx.post_json("/save-address", &address()).await;

    let resp = ctx.get("/success").await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");
    assert!(body.contains("Error creating order. Please contact support."));
    assert!(ctx.app.orders.all().is_empty());
}

#[tokio::test]
async fn test_later_fragment_write_replaces_earlier() {
    let ctx = TestContext::new().await;
    ctx.login("runner@example.com").await;
    ctx.post_json("/save-cart", &cart()).await;
    ctx.post_json(
        "/save-cart",
        &json!({"cart": [{"name": "Chuck 70", "brand": "Converse", "price": 5999}], "total": 5999}),
    )
    .await;
    ctx.post_json("/save-address", &address()).await;

    ctx.get("/success").await;

    let orders = ctx.app.orders.all();
    assert_eq!(orders[0].items.len(), 1);
    assert_eq!(orders[0].items[0].product_name, "Chuck 70");
    assert_eq!(orders[0].total_amount, Price::from_rupees(5999));
}

#[tokio::test]
async fn test_fragment_endpoints_report_errors_as_json() {
    let ctx = TestContext::new().await;

    let resp = ctx.post_raw("/save-cart", "{not json").await;
    assert_eq!(resp["status"], "error");
    assert!(resp["message"].is_string());

    let resp = ctx.post_json("/save-cart", &json!({"total": 10})).await;
    assert_eq!(resp["status"], "error");

    let resp = ctx
        .post_json("/save-payment", &json!({"payment_method": "cash"}))
        .await;
    assert_eq!(resp["status"], "error");

    for path in ["/save-cart", "/save-address", "/save-payment"] {
        let resp = ctx.get(path).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = resp.json().await.expect("json");
        assert_eq!(body, json!({"status": "error"}));
    }
}

#[tokio::test]
async fn test_html_forms_drive_checkout() {
    let ctx = TestContext::new().await;
    ctx.login("runner@example.com").await;
    ctx.post_json("/save-cart", &cart()).await;

    let resp = ctx
        .post_form(
            "/address",
            &[
                ("firstName", "Asha"),
                ("lastName", "Rao"),
                ("phone", "9876543210"),
                ("address", "12 MG Road"),
                ("city", "Bengaluru"),
                ("state", "Karnataka"),
                ("pincode", "560001"),
            ],
        )
        .await;
    assert_eq!(location(&resp), "/payment");

    let resp = ctx.post_form("/payment", &[("payment_method", "bitcoin")]).await;
    assert_eq!(location(&resp), "/payment?error=payment_method");

    let resp = ctx.post_form("/payment", &[("payment_method", "wallet")]).await;
    assert_eq!(location(&resp), "/success");

    ctx.get("/success").await;
    let orders = ctx.app.orders.all();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].payment_method, PaymentMethod::Wallet);
    assert_eq!(orders[0].address.city, "Bengaluru");
}

#[tokio::test]
async fn test_payment_page_lists_methods() {
    let ctx = TestContext::new().await;
    ctx.login("runner@example.com").await;

    let body = ctx.get("/payment").await.text().await.expect("body");

    for method in PaymentMethod::ALL {
        assert!(body.contains(method.label()));
    }
}

#[tokio::test]
async fn test_debug_session_hidden_by_default() {
    let ctx = TestContext::new().await;
    ctx.login("runner@example.com").await;

    let resp = ctx.get("/debug-session").await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_debug_session_dumps_fragments_when_enabled() {
    let mut config = test_config();
    config.debug_session = true;
    let ctx = TestContext::with_config(config).await;

    let resp = ctx.get("/debug-session").await;
    assert_eq!(location(&resp), "/");

    ctx.login("runner@example.com").await;
    ctx.post_json("/save-address", &address()).await;

    let body: Value = ctx.get("/debug-session").await.json().await.expect("json");
    assert_eq!(body["cart"], "Not found");
    assert_eq!(body["delivery_address"]["city"], "Bengaluru");
    assert_eq!(body["user_email"], "runner@example.com");
}

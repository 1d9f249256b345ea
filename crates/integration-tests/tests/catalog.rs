//! Home page catalog listings.

use reqwest::StatusCode;

use sneaker_store_integration_tests::TestContext;
use sneaker_store_storefront::services::catalog::{sample_products, seed_if_empty};

#[tokio::test]
async fn test_home_lists_seeded_sneakers() {
    let ctx = TestContext::new().await;
    let inserted = seed_if_empty(ctx.app.products.as_ref())
        .await
        .expect("seed");
    assert_eq!(inserted, sample_products().len());
    ctx.login("runner@example.com").await;

    let resp = ctx.get("/home").await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");
    for product in sample_products() {
        assert!(body.contains(&product.name), "missing {}", product.name);
    }
    assert!(body.contains("/save-cart"));
}

#[tokio::test]
async fn test_home_with_empty_catalog_still_renders() {
    let ctx = TestContext::new().await;
    ctx.login("runner@example.com").await;

    let resp = ctx.get("/home").await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");
    assert!(body.contains("All sneakers"));
}

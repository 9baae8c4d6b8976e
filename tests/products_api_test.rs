mod common;

use axum::http::{Method, StatusCode};
use common::{decimal_field, response_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn create_product_starts_at_version_zero() {
    let app = TestApp::new().await;
    let store = app.seed_store("Downtown").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({
                "name": "Solder Iron",
                "sku": "SOL-100",
                "category": "Tools",
                "price": 49.50,
                "quantity": 7,
                "store_id": store.id
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["version"], 0);
    assert_eq!(body["quantity"], 7);
    assert_eq!(body["min_stock"], 10);
    assert_eq!(body["is_active"], true);
    assert_eq!(decimal_field(&body, "price"), dec!(49.50));
    assert_eq!(body["store"]["name"], "Downtown");
}

#[tokio::test]
async fn create_product_requires_existing_store() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({
                "name": "Orphan",
                "sku": "ORP-1",
                "category": "Misc",
                "price": 1.00,
                "store_id": Uuid::new_v4()
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sku_is_unique_across_stores() {
    let app = TestApp::new().await;
    let store_a = app.seed_store("A").await;
    let store_b = app.seed_store("B").await;
    app.seed_product(store_a.id, "First", "DUP-1", "Misc", dec!(5), 1, 1)
        .await;

    // Same SKU in a different store still conflicts.
    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({
                "name": "Second",
                "sku": "DUP-1",
                "category": "Misc",
                "price": 5.00,
                "store_id": store_b.id
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_product_rejects_negative_price() {
    let app = TestApp::new().await;
    let store = app.seed_store("Downtown").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({
                "name": "Freebie",
                "sku": "NEG-1",
                "category": "Misc",
                "price": -0.01,
                "store_id": store.id
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn versioned_update_bumps_version() {
    let app = TestApp::new().await;
    let store = app.seed_store("Downtown").await;
    let product = app
        .seed_product(store.id, "Widget", "WID-1", "Hardware", dec!(10), 3, 2)
        .await;
    let id = product.product.id;

    let response = app
        .request(
            Method::PATCH,
            &format!("/api/v1/products/{}", id),
            Some(json!({ "version": 0, "name": "Widget Mk2", "price": 12.50 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["version"], 1);
    assert_eq!(body["name"], "Widget Mk2");
    assert_eq!(decimal_field(&body, "price"), dec!(12.50));
    // Quantity is not touched by the versioned path.
    assert_eq!(body["quantity"], 3);
}

#[tokio::test]
async fn stale_version_conflicts_and_missing_product_is_not_found() {
    let app = TestApp::new().await;
    let store = app.seed_store("Downtown").await;
    let product = app
        .seed_product(store.id, "Widget", "WID-1", "Hardware", dec!(10), 3, 2)
        .await;
    let id = product.product.id;

    // First writer wins, moving the row to version 1.
    let response = app
        .request(
            Method::PATCH,
            &format!("/api/v1/products/{}", id),
            Some(json!({ "version": 0, "name": "First" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Second writer still carries version 0 and must conflict.
    let response = app
        .request(
            Method::PATCH,
            &format!("/api/v1/products/{}", id),
            Some(json!({ "version": 0, "name": "Second" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // A retry with the fresh version succeeds.
    let response = app
        .request(
            Method::PATCH,
            &format!("/api/v1/products/{}", id),
            Some(json!({ "version": 1, "name": "Second" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["version"], 2);

    let response = app
        .request(
            Method::PATCH,
            &format!("/api/v1/products/{}", Uuid::new_v4()),
            Some(json!({ "version": 0, "name": "Ghost" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn updating_sku_to_own_value_succeeds() {
    let app = TestApp::new().await;
    let store = app.seed_store("Downtown").await;
    let product = app
        .seed_product(store.id, "Widget", "WID-1", "Hardware", dec!(10), 3, 2)
        .await;
    let other = app
        .seed_product(store.id, "Gadget", "GAD-1", "Hardware", dec!(10), 3, 2)
        .await;

    // Re-asserting its own SKU is not a conflict.
    let response = app
        .request(
            Method::PATCH,
            &format!("/api/v1/products/{}", product.product.id),
            Some(json!({ "version": 0, "sku": "WID-1" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Taking another product's SKU is.
    let response = app
        .request(
            Method::PATCH,
            &format!("/api/v1/products/{}", other.product.id),
            Some(json!({ "version": 0, "sku": "WID-1" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn adjust_quantity_to_zero_and_not_below() {
    let app = TestApp::new().await;
    let store = app.seed_store("Downtown").await;
    let product = app
        .seed_product(store.id, "Widget", "WID-1", "Hardware", dec!(10), 5, 2)
        .await;
    let id = product.product.id;

    // Draining the full quantity is allowed.
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/products/{}/adjust-quantity", id),
            Some(json!({ "adjustment": -5, "reason": "sale" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["quantity"], 0);
    assert_eq!(body["version"], 0);

    // One more unit than is on hand is rejected and nothing changes.
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/products/{}/adjust-quantity", id),
            Some(json!({ "adjustment": -1, "reason": "sale" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Validation error: Cannot reduce quantity by 1. Current stock is 0.");

    let response = app
        .request(Method::GET, &format!("/api/v1/products/{}", id), None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["quantity"], 0);
    assert_eq!(body["version"], 0);
}

#[tokio::test]
async fn adjust_quantity_restock_accepts_note() {
    let app = TestApp::new().await;
    let store = app.seed_store("Downtown").await;
    let product = app
        .seed_product(store.id, "Widget", "WID-1", "Hardware", dec!(10), 1, 2)
        .await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/products/{}/adjust-quantity", product.product.id),
            Some(json!({
                "adjustment": 24,
                "reason": "restock",
                "note": "Quarterly replenishment"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["quantity"], 25);
}

#[tokio::test]
async fn adjust_quantity_rejects_unknown_reason() {
    let app = TestApp::new().await;
    let store = app.seed_store("Downtown").await;
    let product = app
        .seed_product(store.id, "Widget", "WID-1", "Hardware", dec!(10), 1, 2)
        .await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/products/{}/adjust-quantity", product.product.id),
            Some(json!({ "adjustment": 1, "reason": "shrinkage" })),
        )
        .await;
    // Unknown enum variants are rejected at deserialization time.
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn delete_product_returns_last_state() {
    let app = TestApp::new().await;
    let store = app.seed_store("Downtown").await;
    let product = app
        .seed_product(store.id, "Widget", "WID-1", "Hardware", dec!(10), 5, 2)
        .await;
    let id = product.product.id;

    let response = app
        .request(Method::DELETE, &format!("/api/v1/products/{}", id), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["sku"], "WID-1");

    let response = app
        .request(Method::GET, &format!("/api/v1/products/{}", id), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .request(Method::DELETE, &format!("/api/v1/products/{}", id), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn categories_are_distinct_and_sorted() {
    let app = TestApp::new().await;
    let store = app.seed_store("Downtown").await;
    app.seed_product(store.id, "A", "SKU-1", "Tools", dec!(1), 1, 1)
        .await;
    app.seed_product(store.id, "B", "SKU-2", "Apparel", dec!(1), 1, 1)
        .await;
    app.seed_product(store.id, "C", "SKU-3", "Tools", dec!(1), 1, 1)
        .await;

    let response = app
        .request(Method::GET, "/api/v1/products/categories", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body, json!(["Apparel", "Tools"]));
}

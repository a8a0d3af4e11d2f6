//! Integration tests for the toggle services: cart upsert semantics and the
//! favorite/wishlist round trips.
//!
//! Run with: `cargo test -p wardrobe-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use reqwest::{Client, StatusCode};
use serde_json::Value;

use wardrobe_integration_tests::{any_product_id, base_url, client, customer_token};

async fn cart_quantity(client: &Client, token: &str, product_id: i64) -> Option<i64> {
    let items: Value = client
        .get(format!("{}/api/cart-items", base_url()))
        .bearer_auth(token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    items
        .as_array()
        .unwrap()
        .iter()
        .find(|item| item["product_id"].as_i64() == Some(product_id))
        .and_then(|item| item["quantity"].as_i64())
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_cart_add_increments_then_explicit_quantity_overwrites() {
    let client = client();
    let token = customer_token(&client).await;
    let product_id = any_product_id(&client).await;

    // Start from a clean slate
    client
        .delete(format!("{}/api/cart-items", base_url()))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "product_id": product_id }))
        .send()
        .await
        .unwrap();

    // Add with no quantity -> 1
    let item: Value = client
        .post(format!("{}/api/cart-items", base_url()))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "product_id": product_id }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(item["quantity"].as_i64(), Some(1));

    // Add again with no quantity -> 2
    let item: Value = client
        .post(format!("{}/api/cart-items", base_url()))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "product_id": product_id }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(item["quantity"].as_i64(), Some(2));

    // Explicit quantity overwrites (not +5)
    let item: Value = client
        .post(format!("{}/api/cart-items", base_url()))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "product_id": product_id, "quantity": 5 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(item["quantity"].as_i64(), Some(5));
    assert_eq!(cart_quantity(&client, &token, product_id).await, Some(5));

    // Cleanup
    let response = client
        .delete(format!("{}/api/cart-items", base_url()))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "product_id": product_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(cart_quantity(&client, &token, product_id).await, None);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_cart_upsert_unknown_product_404() {
    let client = client();
    let token = customer_token(&client).await;

    let response = client
        .post(format!("{}/api/cart-items", base_url()))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "product_id": 999999 }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("999999"));
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_favorites_toggle_round_trip() {
    let client = client();
    let token = customer_token(&client).await;
    let product_id = any_product_id(&client).await;

    let toggle = |fav: bool| {
        let client = &client;
        let token = token.clone();
        async move {
            let response = client
                .post(format!("{}/api/favorites", base_url()))
                .bearer_auth(token)
                .json(&serde_json::json!({ "product_id": product_id, "fav": fav }))
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let body: Value = response.json().await.unwrap();
            assert_eq!(body["fav"], Value::Bool(fav));
        }
    };

    let row_count = || {
        let client = &client;
        let token = token.clone();
        async move {
            let favorites: Value = client
                .get(format!("{}/api/favorites", base_url()))
                .bearer_auth(token)
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            favorites
                .as_array()
                .unwrap()
                .iter()
                .filter(|f| f["product_id"].as_i64() == Some(product_id))
                .count()
        }
    };

    // Asserting twice leaves exactly one row; removal is idempotent too
    toggle(true).await;
    toggle(true).await;
    assert_eq!(row_count().await, 1);

    toggle(false).await;
    assert_eq!(row_count().await, 0);

    // Removing an absent favorite does not error
    toggle(false).await;
    assert_eq!(row_count().await, 0);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_wishlist_toggle_carries_visibility_flag() {
    let client = client();
    let token = customer_token(&client).await;
    let product_id = any_product_id(&client).await;

    let response = client
        .post(format!("{}/api/wishlist", base_url()))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "product_id": product_id,
            "wished": true,
            "is_public": true
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let entries: Value = client
        .get(format!("{}/api/wishlist", base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let entry = entries
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["product_id"].as_i64() == Some(product_id))
        .expect("wishlist entry missing");
    assert_eq!(entry["is_public"], Value::Bool(true));

    // Cleanup
    client
        .post(format!("{}/api/wishlist", base_url()))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "product_id": product_id, "wished": false }))
        .send()
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_interactions_require_authentication() {
    let client = client();

    for path in ["/api/favorites", "/api/wishlist", "/api/cart-items"] {
        let response = client
            .get(format!("{}{path}", base_url()))
            .send()
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "expected 401 for {path}"
        );
    }
}

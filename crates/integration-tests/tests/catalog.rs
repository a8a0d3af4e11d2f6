//! Integration tests for the catalog listing: filters, visibility windowing,
//! pagination envelope, and favorite annotations.
//!
//! Run with: `cargo test -p wardrobe-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::Value;
use uuid::Uuid;

use wardrobe_integration_tests::{admin_token, any_product_id, base_url, client, customer_token};

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_default_listing_envelope_shape() {
    let client = client();

    let body: Value = client
        .get(format!("{}/api/products", base_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(body["count"].is_i64());
    assert!(body["results"].is_array());
    assert!(body.get("next").is_some());
    assert!(body.get("previous").is_some());
    // Fixed page size
    assert!(body["results"].as_array().unwrap().len() <= 10);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_anonymous_listing_has_fav_false() {
    let client = client();

    let body: Value = client
        .get(format!("{}/api/products", base_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    for product in body["results"].as_array().unwrap() {
        assert_eq!(product["fav"], Value::Bool(false));
    }
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_favorited_product_is_annotated_in_listing() {
    let client = client();
    let token = customer_token(&client).await;
    let product_id = any_product_id(&client).await;

    // Favorite one product, then list as the same user
    let response = client
        .post(format!("{}/api/favorites", base_url()))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "product_id": product_id, "fav": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = client
        .get(format!("{}/api/products", base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let annotated = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"].as_i64() == Some(product_id))
        .expect("favorited product missing from first page");
    assert_eq!(annotated["fav"], Value::Bool(true));

    // Cleanup
    client
        .post(format!("{}/api/favorites", base_url()))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "product_id": product_id, "fav": false }))
        .send()
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_malformed_release_date_is_rejected() {
    let client = client();

    let response = client
        .get(format!("{}/api/products?release_date=not-a-date", base_url()))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("ISO"));
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_future_release_date_hidden_by_default() {
    let client = client();
    let token = admin_token(&client).await;

    // Create a product released far in the future
    let name = format!("Unreleased Jacket {}", Uuid::new_v4());
    let categories: Value = client
        .get(format!("{}/api/categories", base_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let created: Value = client
        .post(format!("{}/api/products", base_url()))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "size_id": categories["sizes"][0]["id"],
            "target_id": categories["targets"][0]["id"],
            "clothes_type_id": categories["clothes_types"][0]["id"],
            "brand_id": categories["brands"][0]["id"],
            "name": name,
            "description": "not out yet",
            "category": "clothing",
            "price": 5000,
            "release_date": "2099-01-01T00:00:00Z",
            "stock_quantity": 3
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let product_id = created["id"].as_i64().unwrap();

    // Absent from the default listing
    let default_listing: Value = client
        .get(format!("{}/api/products?keyword=Unreleased Jacket", base_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(
        !default_listing["results"]
            .as_array()
            .unwrap()
            .iter()
            .any(|p| p["id"].as_i64() == Some(product_id))
    );

    // Present when the window is pushed past the release date
    let windowed: Value = client
        .get(format!(
            "{}/api/products?keyword=Unreleased Jacket&release_date=2100-01-01T00:00:00",
            base_url()
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(
        windowed["results"]
            .as_array()
            .unwrap()
            .iter()
            .any(|p| p["id"].as_i64() == Some(product_id))
    );

    // Cleanup: soft-delete
    client
        .delete(format!("{}/api/products/{product_id}", base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_product_detail_404_for_unknown_id() {
    let client = client();

    let response = client
        .get(format!("{}/api/products/999999", base_url()))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("999999"));
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_product_mutations_require_admin() {
    let client = client();
    let token = customer_token(&client).await;

    let response = client
        .post(format!("{}/api/products", base_url()))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "size_id": 1, "target_id": 1, "clothes_type_id": 1, "brand_id": 1,
            "name": "forbidden", "description": "", "category": "clothing",
            "price": 1, "release_date": "2020-01-01T00:00:00Z", "stock_quantity": 1
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

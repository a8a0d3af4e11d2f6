//! Integration tests for reviews: rating bounds, one-per-user upsert, and
//! the average-rating aggregate.
//!
//! Run with: `cargo test -p wardrobe-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use reqwest::{Client, StatusCode};
use serde_json::Value;

use wardrobe_integration_tests::{any_product_id, base_url, client, customer_token};

async fn review_rows_for(client: &Client, product_id: i64) -> Value {
    client
        .get(format!(
            "{}/api/reviews?product_id={product_id}",
            base_url()
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_rating_bounds_are_enforced() {
    let client = client();
    let token = customer_token(&client).await;
    let product_id = any_product_id(&client).await;

    for bad_rating in [0, 6, -1] {
        let response = client
            .post(format!("{}/api/products/{product_id}/review", base_url()))
            .bearer_auth(&token)
            .json(&serde_json::json!({ "rating": bad_rating, "comment": "x" }))
            .send()
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "rating {bad_rating} must be rejected"
        );
    }

    for good_rating in [1, 5] {
        let response = client
            .post(format!("{}/api/products/{product_id}/review", base_url()))
            .bearer_auth(&token)
            .json(&serde_json::json!({ "rating": good_rating, "comment": "x" }))
            .send()
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::OK,
            "rating {good_rating} must be accepted"
        );
    }

    // Cleanup
    client
        .delete(format!("{}/api/products/{product_id}/review", base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_second_submission_updates_in_place() {
    let client = client();
    let token = customer_token(&client).await;
    let product_id = any_product_id(&client).await;

    let first: Value = client
        .post(format!("{}/api/products/{product_id}/review", base_url()))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "rating": 2, "comment": "meh" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let second: Value = client
        .post(format!("{}/api/products/{product_id}/review", base_url()))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "rating": 4, "comment": "grew on me" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Same identity, new content
    assert_eq!(first["id"], second["id"]);
    assert_eq!(second["rating"].as_i64(), Some(4));
    assert_eq!(second["comment"].as_str(), Some("grew on me"));

    // The caller's own review reflects the latest submission
    let own: Value = client
        .get(format!("{}/api/products/{product_id}/review", base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(own["rating"].as_i64(), Some(4));

    // Cleanup; a second delete is a 404 (strict variant)
    let response = client
        .delete(format!("{}/api/products/{product_id}/review", base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .delete(format!("{}/api/products/{product_id}/review", base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_average_rating_is_the_arithmetic_mean() {
    let client = client();
    let token = customer_token(&client).await;
    let product_id = any_product_id(&client).await;

    client
        .post(format!("{}/api/products/{product_id}/review", base_url()))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "rating": 3, "comment": "solid" }))
        .send()
        .await
        .unwrap();

    let listing = review_rows_for(&client, product_id).await;
    let count = listing["count"].as_i64().unwrap();
    let average = listing["average_rating"].as_f64().unwrap();

    // The average over the listed ratings matches the reported aggregate
    // (single-page case)
    if count <= 10 {
        let ratings: Vec<i64> = listing["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["rating"].as_i64().unwrap())
            .collect();
        #[allow(clippy::cast_precision_loss)]
        let expected = ratings.iter().sum::<i64>() as f64 / ratings.len() as f64;
        assert!((average - expected).abs() < 1e-9);
    }

    // Cleanup
    client
        .delete(format!("{}/api/products/{product_id}/review", base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_listing_requires_product_id() {
    let client = client();

    let response = client
        .get(format!("{}/api/reviews", base_url()))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_no_reviews_means_null_average() {
    let client = client();
    let listing = review_rows_for(&client, any_product_id(&client).await).await;

    if listing["count"].as_i64() == Some(0) {
        assert!(listing["average_rating"].is_null());
        assert_eq!(listing["is_ordered"], Value::Bool(false));
    }
}

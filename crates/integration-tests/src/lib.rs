//! Shared helpers for Wardrobe integration tests.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p wardrobe-api)
//! - Seeded demo data (cargo run -p wardrobe-cli -- seed)
//!
//! All tests are `#[ignore]`d by default; run them with:
//! `cargo test -p wardrobe-integration-tests -- --ignored`

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use reqwest::Client;
use serde_json::Value;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// Build an HTTP client.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .build()
        .expect("Failed to create HTTP client")
}

/// Credentials for the seeded admin account (demo-user-0).
#[must_use]
pub fn admin_credentials() -> (String, String) {
    (
        std::env::var("TEST_ADMIN_EMAIL").unwrap_or_else(|_| "demo0@wardrobe.example".to_string()),
        std::env::var("TEST_ADMIN_PASSWORD").unwrap_or_else(|_| "wardrobe-demo-pass".to_string()),
    )
}

/// Credentials for a seeded non-staff account (demo-user-2).
#[must_use]
pub fn customer_credentials() -> (String, String) {
    (
        std::env::var("TEST_USER_EMAIL").unwrap_or_else(|_| "demo2@wardrobe.example".to_string()),
        std::env::var("TEST_USER_PASSWORD").unwrap_or_else(|_| "wardrobe-demo-pass".to_string()),
    )
}

/// Log in and return the access token.
///
/// # Panics
///
/// Panics when the token endpoint rejects the credentials.
pub async fn login(client: &Client, email: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/api/token", base_url()))
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("token request failed");

    assert!(
        response.status().is_success(),
        "login failed for {email}: {}",
        response.status()
    );

    let body: Value = response.json().await.expect("token response not json");
    body["access"]
        .as_str()
        .expect("token response missing access")
        .to_string()
}

/// Log in as the seeded admin.
pub async fn admin_token(client: &Client) -> String {
    let (email, password) = admin_credentials();
    login(client, &email, &password).await
}

/// Log in as the seeded non-staff customer.
pub async fn customer_token(client: &Client) -> String {
    let (email, password) = customer_credentials();
    login(client, &email, &password).await
}

/// First product id from the default catalog listing.
///
/// # Panics
///
/// Panics when the catalog is empty (seed the database first).
pub async fn any_product_id(client: &Client) -> i64 {
    let body: Value = client
        .get(format!("{}/api/products", base_url()))
        .send()
        .await
        .expect("product listing failed")
        .json()
        .await
        .expect("product listing not json");

    body["results"][0]["id"]
        .as_i64()
        .expect("catalog is empty; run the seeder first")
}

//! Checkout route handler.
//!
//! Resolves each requested product to its Stripe mirror and creates a
//! Checkout Session, returning the redirect URL for the frontend.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use wardrobe_core::ProductId;

use crate::db::RepositoryError;
use crate::db::products::ProductRepository;
use crate::error::{ApiError, Result};
use crate::services::stripe::CheckoutLine;
use crate::state::AppState;

/// One requested checkout line.
#[derive(Debug, Deserialize)]
pub struct CheckoutItem {
    pub product_id: ProductId,
    pub amount: i64,
}

/// Checkout response: where to send the customer.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
}

/// Create a Stripe Checkout Session for the requested items.
#[instrument(skip(state, body))]
pub async fn create_session(
    State(state): State<AppState>,
    Json(body): Json<Vec<CheckoutItem>>,
) -> Result<Json<CheckoutResponse>> {
    if body.is_empty() {
        return Err(ApiError::Validation("checkout items must not be empty".into()));
    }
    if body.iter().any(|item| item.amount < 1) {
        return Err(ApiError::Validation(
            "every amount must be at least 1".into(),
        ));
    }

    let repo = ProductRepository::new(state.pool());
    let mut lines = Vec::with_capacity(body.len());
    for item in &body {
        let product = repo.get(item.product_id).await.map_err(|e| match e {
            RepositoryError::NotFound => ApiError::product_not_found(item.product_id),
            other => ApiError::Database(other),
        })?;
        lines.push(CheckoutLine {
            stripe_product_id: product.stripe_product_id,
            quantity: item.amount,
        });
    }

    let config = &state.config().stripe;
    let url = state
        .stripe()
        .checkout(
            &lines,
            &config.checkout_success_url,
            &config.checkout_cancel_url,
        )
        .await?;

    Ok(Json(CheckoutResponse { url }))
}

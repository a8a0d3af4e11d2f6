//! Cart route handlers.
//!
//! Adding without a quantity bumps the line by one (creating it at one);
//! an explicit quantity overwrites. Removal is idempotent.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;

use wardrobe_core::ProductId;

use crate::db::cart::CartRepository;
use crate::db::products::ProductRepository;
use crate::error::{ApiError, Result};
use crate::middleware::RequireAuth;
use crate::models::CartItem;
use crate::state::AppState;

/// Request body for adding or setting a cart line.
#[derive(Debug, Deserialize)]
pub struct UpsertCartRequest {
    pub product_id: ProductId,
    /// Absent: add one unit. Present: set the quantity outright.
    pub quantity: Option<i32>,
}

/// Request body for removing a cart line.
#[derive(Debug, Deserialize)]
pub struct RemoveCartRequest {
    pub product_id: ProductId,
}

/// List the caller's cart.
#[instrument(skip(state, user))]
pub async fn list(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<CartItem>>> {
    let repo = CartRepository::new(state.pool());
    let items = repo.list_for_user(user.id).await?;
    Ok(Json(items))
}

/// Add one unit of a product, or set its quantity outright.
#[instrument(skip(state, user, body))]
pub async fn upsert(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<UpsertCartRequest>,
) -> Result<Json<CartItem>> {
    let products = ProductRepository::new(state.pool());
    if !products.exists(body.product_id).await? {
        return Err(ApiError::product_not_found(body.product_id));
    }

    let repo = CartRepository::new(state.pool());
    let item = match body.quantity {
        None => repo.increment(user.id, body.product_id).await?,
        Some(quantity) => {
            if quantity < 1 {
                return Err(ApiError::Validation("quantity must be at least 1".into()));
            }
            repo.set_quantity(user.id, body.product_id, quantity).await?
        }
    };

    Ok(Json(item))
}

/// Remove a product from the caller's cart.
#[instrument(skip(state, user, body))]
pub async fn remove(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<RemoveCartRequest>,
) -> Result<StatusCode> {
    let products = ProductRepository::new(state.pool());
    if !products.exists(body.product_id).await? {
        return Err(ApiError::product_not_found(body.product_id));
    }

    let repo = CartRepository::new(state.pool());
    repo.remove(user.id, body.product_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

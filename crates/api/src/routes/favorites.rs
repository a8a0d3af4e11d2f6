//! Favorite route handlers.
//!
//! A favorite is toggled by asserting the desired state; both directions are
//! idempotent, so repeating a request never errors and never duplicates.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use wardrobe_core::ProductId;

use crate::db::favorites::FavoriteRepository;
use crate::db::products::ProductRepository;
use crate::error::{ApiError, Result};
use crate::middleware::RequireAuth;
use crate::models::Favorite;
use crate::state::AppState;

/// Request body asserting a favorite state.
#[derive(Debug, Deserialize)]
pub struct ToggleFavoriteRequest {
    pub product_id: ProductId,
    pub fav: bool,
}

/// Response for a favorite toggle.
#[derive(Debug, Serialize)]
pub struct ToggleFavoriteResponse {
    pub product_id: ProductId,
    pub fav: bool,
    pub message: String,
}

/// List the caller's favorites.
#[instrument(skip(state, user))]
pub async fn list(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Favorite>>> {
    let repo = FavoriteRepository::new(state.pool());
    let favorites = repo.list_for_user(user.id).await?;
    Ok(Json(favorites))
}

/// Assert the caller's favorite state for a product.
#[instrument(skip(state, user, body))]
pub async fn toggle(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<ToggleFavoriteRequest>,
) -> Result<Json<ToggleFavoriteResponse>> {
    let products = ProductRepository::new(state.pool());
    if !products.exists(body.product_id).await? {
        return Err(ApiError::product_not_found(body.product_id));
    }

    let repo = FavoriteRepository::new(state.pool());
    let message = if body.fav {
        repo.add(user.id, body.product_id).await?;
        format!("product {} added to favorites", body.product_id)
    } else {
        repo.remove(user.id, body.product_id).await?;
        format!("product {} removed from favorites", body.product_id)
    };

    Ok(Json(ToggleFavoriteResponse {
        product_id: body.product_id,
        fav: body.fav,
        message,
    }))
}

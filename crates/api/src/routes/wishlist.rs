//! Wishlist route handlers.
//!
//! Same toggle semantics as favorites, plus a public/private flag passed
//! through to the entry.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use wardrobe_core::ProductId;

use crate::db::products::ProductRepository;
use crate::db::wishlist::WishlistRepository;
use crate::error::{ApiError, Result};
use crate::middleware::RequireAuth;
use crate::models::WishlistEntry;
use crate::state::AppState;

/// Request body asserting a wishlist state.
#[derive(Debug, Deserialize)]
pub struct ToggleWishlistRequest {
    pub product_id: ProductId,
    pub wished: bool,
    /// Visibility of the entry; absent keeps (or defaults) the current flag.
    pub is_public: Option<bool>,
}

/// Response for a wishlist toggle.
#[derive(Debug, Serialize)]
pub struct ToggleWishlistResponse {
    pub product_id: ProductId,
    pub wished: bool,
    pub message: String,
}

/// List the caller's wishlist.
#[instrument(skip(state, user))]
pub async fn list(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<WishlistEntry>>> {
    let repo = WishlistRepository::new(state.pool());
    let entries = repo.list_for_user(user.id).await?;
    Ok(Json(entries))
}

/// Assert the caller's wishlist state for a product.
#[instrument(skip(state, user, body))]
pub async fn toggle(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<ToggleWishlistRequest>,
) -> Result<Json<ToggleWishlistResponse>> {
    let products = ProductRepository::new(state.pool());
    if !products.exists(body.product_id).await? {
        return Err(ApiError::product_not_found(body.product_id));
    }

    let repo = WishlistRepository::new(state.pool());
    let message = if body.wished {
        repo.add(user.id, body.product_id, body.is_public).await?;
        format!("product {} added to wishlist", body.product_id)
    } else {
        repo.remove(user.id, body.product_id).await?;
        format!("product {} removed from wishlist", body.product_id)
    };

    Ok(Json(ToggleWishlistResponse {
        product_id: body.product_id,
        wished: body.wished,
        message,
    }))
}

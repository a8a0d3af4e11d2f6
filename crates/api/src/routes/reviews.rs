//! Review route handlers.
//!
//! A product's review listing carries its average rating and, for
//! authenticated callers, whether they have ever ordered the product.
//! Each user holds at most one review per product; posting again updates
//! it in place.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use wardrobe_core::ProductId;

use crate::db::products::ProductRepository;
use crate::db::reviews::ReviewRepository;
use crate::error::{ApiError, Result};
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::Review;
use crate::pagination::{Page, PageQuery};
use crate::state::AppState;

/// Review listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ReviewListQuery {
    pub product_id: Option<ProductId>,
    pub page: Option<u32>,
}

/// Review listing response: a page plus the product aggregates.
#[derive(Debug, Serialize)]
pub struct ReviewListResponse {
    #[serde(flatten)]
    pub page: Page<Review>,
    /// Mean of all ratings; null when the product has no reviews.
    pub average_rating: Option<f64>,
    /// Whether the caller has ever ordered this product (false anonymously).
    pub is_ordered: bool,
}

/// Request body for upserting the caller's review.
#[derive(Debug, Deserialize)]
pub struct UpsertReviewRequest {
    pub rating: i32,
    pub comment: Option<String>,
}

/// List a product's reviews with the average rating and purchase flag.
#[instrument(skip(state, viewer))]
pub async fn list_for_product(
    OptionalAuth(viewer): OptionalAuth,
    State(state): State<AppState>,
    Query(query): Query<ReviewListQuery>,
) -> Result<Json<ReviewListResponse>> {
    let product_id = query
        .product_id
        .ok_or_else(|| ApiError::Validation("product_id is required".into()))?;

    let products = ProductRepository::new(state.pool());
    if !products.exists(product_id).await? {
        return Err(ApiError::product_not_found(product_id));
    }

    let repo = ReviewRepository::new(state.pool());
    let page = repo
        .list_for_product(product_id, PageQuery { page: query.page })
        .await?;
    let average_rating = repo.average_rating(product_id).await?;

    let is_ordered = match viewer {
        Some(user) => repo.has_purchased(user.id, product_id).await?,
        None => false,
    };

    Ok(Json(ReviewListResponse {
        page,
        average_rating,
        is_ordered,
    }))
}

/// The caller's own review of a product.
#[instrument(skip(state, user))]
pub async fn show_own(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Review>> {
    ensure_product_exists(&state, product_id).await?;

    let repo = ReviewRepository::new(state.pool());
    let review = repo.get_for_user(user.id, product_id).await.map_err(|e| {
        match e {
            crate::db::RepositoryError::NotFound => {
                ApiError::NotFound("you have not reviewed this product".into())
            }
            other => ApiError::Database(other),
        }
    })?;

    Ok(Json(review))
}

/// Create or update the caller's review of a product.
#[instrument(skip(state, user, body))]
pub async fn upsert_own(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    Json(body): Json<UpsertReviewRequest>,
) -> Result<Json<Review>> {
    if !(1..=5).contains(&body.rating) {
        return Err(ApiError::Validation(
            "rating must be an integer between 1 and 5".into(),
        ));
    }

    ensure_product_exists(&state, product_id).await?;

    let repo = ReviewRepository::new(state.pool());
    let review = repo
        .upsert(user.id, product_id, body.rating, body.comment.as_deref())
        .await?;

    Ok(Json(review))
}

/// Delete the caller's review of a product.
#[instrument(skip(state, user))]
pub async fn delete_own(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<StatusCode> {
    ensure_product_exists(&state, product_id).await?;

    let repo = ReviewRepository::new(state.pool());
    repo.delete_for_user(user.id, product_id)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                ApiError::NotFound("you have not reviewed this product".into())
            }
            other => ApiError::Database(other),
        })?;

    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_product_exists(state: &AppState, product_id: ProductId) -> Result<()> {
    let products = ProductRepository::new(state.pool());
    if products.exists(product_id).await? {
        Ok(())
    } else {
        Err(ApiError::product_not_found(product_id))
    }
}

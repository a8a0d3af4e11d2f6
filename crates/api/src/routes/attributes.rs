//! Catalog facet route handlers.
//!
//! Sizes, targets, clothes types, and brands share one handler set, made
//! generic over a zero-sized facet marker that picks the table. Mutations
//! are admin-gated; reads are public.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::instrument;

use crate::db::attributes::AttributeRepository;
use crate::error::{ApiError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Attribute;
use crate::state::AppState;

/// A facet marker binding handlers to one attribute table.
pub trait Facet: Send + Sync + 'static {
    /// Singular display name used in error messages.
    const NAME: &'static str;

    /// Repository over this facet's table.
    fn repository(pool: &PgPool) -> AttributeRepository<'_>;
}

/// `sizes` facet marker.
pub struct Sizes;
/// `targets` facet marker.
pub struct Targets;
/// `clothes_types` facet marker.
pub struct ClothesTypes;
/// `brands` facet marker.
pub struct Brands;

impl Facet for Sizes {
    const NAME: &'static str = "size";

    fn repository(pool: &PgPool) -> AttributeRepository<'_> {
        AttributeRepository::sizes(pool)
    }
}

impl Facet for Targets {
    const NAME: &'static str = "target";

    fn repository(pool: &PgPool) -> AttributeRepository<'_> {
        AttributeRepository::targets(pool)
    }
}

impl Facet for ClothesTypes {
    const NAME: &'static str = "clothes type";

    fn repository(pool: &PgPool) -> AttributeRepository<'_> {
        AttributeRepository::clothes_types(pool)
    }
}

impl Facet for Brands {
    const NAME: &'static str = "brand";

    fn repository(pool: &PgPool) -> AttributeRepository<'_> {
        AttributeRepository::brands(pool)
    }
}

/// Request body naming a facet value.
#[derive(Debug, Deserialize)]
pub struct AttributeRequest {
    pub name: String,
}

/// All four facet lists in one response.
#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub sizes: Vec<Attribute>,
    pub targets: Vec<Attribute>,
    pub clothes_types: Vec<Attribute>,
    pub brands: Vec<Attribute>,
}

/// List a facet's values.
pub async fn list<F: Facet>(State(state): State<AppState>) -> Result<Json<Vec<Attribute>>> {
    let rows = F::repository(state.pool()).list().await?;
    Ok(Json(rows))
}

/// Facet value detail.
pub async fn show<F: Facet>(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Attribute>> {
    F::repository(state.pool())
        .get(id)
        .await
        .map(Json)
        .map_err(|e| not_found::<F>(e, id))
}

/// Create a facet value (admin).
pub async fn create<F: Facet>(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<AttributeRequest>,
) -> Result<(StatusCode, Json<Attribute>)> {
    validate_name(&body.name)?;
    let row = F::repository(state.pool()).create(body.name.trim()).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// Rename a facet value (admin).
pub async fn update<F: Facet>(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<AttributeRequest>,
) -> Result<Json<Attribute>> {
    validate_name(&body.name)?;
    F::repository(state.pool())
        .update(id, body.name.trim())
        .await
        .map(Json)
        .map_err(|e| not_found::<F>(e, id))
}

/// Delete a facet value (admin).
pub async fn delete<F: Facet>(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    F::repository(state.pool())
        .delete(id)
        .await
        .map_err(|e| not_found::<F>(e, id))?;
    Ok(StatusCode::NO_CONTENT)
}

/// All facet lists at once, for filter UIs.
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<CategoriesResponse>> {
    let pool = state.pool();
    Ok(Json(CategoriesResponse {
        sizes: AttributeRepository::sizes(pool).list().await?,
        targets: AttributeRepository::targets(pool).list().await?,
        clothes_types: AttributeRepository::clothes_types(pool).list().await?,
        brands: AttributeRepository::brands(pool).list().await?,
    }))
}

/// Routes for all four facets plus the combined categories listing.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sizes", get(list::<Sizes>).post(create::<Sizes>))
        .route(
            "/sizes/{id}",
            get(show::<Sizes>)
                .put(update::<Sizes>)
                .delete(delete::<Sizes>),
        )
        .route("/targets", get(list::<Targets>).post(create::<Targets>))
        .route(
            "/targets/{id}",
            get(show::<Targets>)
                .put(update::<Targets>)
                .delete(delete::<Targets>),
        )
        .route(
            "/clothes-types",
            get(list::<ClothesTypes>).post(create::<ClothesTypes>),
        )
        .route(
            "/clothes-types/{id}",
            get(show::<ClothesTypes>)
                .put(update::<ClothesTypes>)
                .delete(delete::<ClothesTypes>),
        )
        .route("/brands", get(list::<Brands>).post(create::<Brands>))
        .route(
            "/brands/{id}",
            get(show::<Brands>)
                .put(update::<Brands>)
                .delete(delete::<Brands>),
        )
        .route("/categories", get(categories))
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ApiError::Validation("name must not be empty".into()));
    }
    Ok(())
}

fn not_found<F: Facet>(e: crate::db::RepositoryError, id: i32) -> ApiError {
    match e {
        crate::db::RepositoryError::NotFound => {
            ApiError::NotFound(format!("no {} exists with id {id}", F::NAME))
        }
        other => ApiError::Database(other),
    }
}

//! Product route handlers: the catalog listing plus admin mutations.
//!
//! Mutations keep the Stripe mirror consistent by convention: the external
//! resource is created first and torn down again if the local write fails,
//! so a validation or constraint error never leaves an orphaned Stripe
//! product behind.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::instrument;

use wardrobe_core::{BrandId, ClothesTypeId, ProductId, SizeId, TargetId};

use crate::db::products::{NewProduct, ProductFilter, ProductRepository, ProductUpdate};
use crate::error::{ApiError, Result};
use crate::middleware::{OptionalAuth, RequireAdmin};
use crate::models::{Product, ProductView};
use crate::pagination::{Page, PageQuery};
use crate::state::AppState;

/// Catalog listing query parameters.
///
/// Facet params are comma-separated id lists (`?size=1,2&brand=9`).
#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub size: Option<String>,
    pub target: Option<String>,
    pub clothes_type: Option<String>,
    pub brand: Option<String>,
    pub keyword: Option<String>,
    pub is_deleted: Option<bool>,
    pub release_date: Option<String>,
    pub page: Option<u32>,
}

/// Request body for creating a product.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub size_id: SizeId,
    pub target_id: TargetId,
    pub clothes_type_id: ClothesTypeId,
    pub brand_id: BrandId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: i64,
    pub release_date: DateTime<Utc>,
    pub stock_quantity: i32,
}

/// Request body for updating a product. Absent fields keep their value.
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub size_id: Option<SizeId>,
    pub target_id: Option<TargetId>,
    pub clothes_type_id: Option<ClothesTypeId>,
    pub brand_id: Option<BrandId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<i64>,
    pub release_date: Option<DateTime<Utc>>,
    pub stock_quantity: Option<i32>,
}

/// Request body for bulk soft-deletion.
#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub product_ids: Vec<ProductId>,
}

/// List products with facet filters, keyword search, visibility windowing,
/// and the caller's favorite annotations.
#[instrument(skip(state, viewer))]
pub async fn list(
    State(state): State<AppState>,
    OptionalAuth(viewer): OptionalAuth,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<Page<ProductView>>> {
    let filter = build_filter(&query)?;
    let page = PageQuery { page: query.page };

    let repo = ProductRepository::new(state.pool());
    let results = repo.list(&filter, page, viewer.map(|v| v.id)).await?;

    Ok(Json(results))
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let repo = ProductRepository::new(state.pool());
    let product = repo.get(id).await.map_err(|e| match e {
        crate::db::RepositoryError::NotFound => ApiError::product_not_found(id),
        other => ApiError::Database(other),
    })?;
    Ok(Json(product))
}

/// Create a product (admin).
///
/// The Stripe product is created first; if the local insert then fails, the
/// Stripe resource is archived again so no orphan remains.
#[instrument(skip(state, body))]
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    validate_product_fields(&body.name, body.price, body.stock_quantity)?;

    let stripe_product_id = state
        .stripe()
        .create_product(&body.name, body.price)
        .await?;

    let new = NewProduct {
        size_id: body.size_id,
        target_id: body.target_id,
        clothes_type_id: body.clothes_type_id,
        brand_id: body.brand_id,
        stripe_product_id: stripe_product_id.clone(),
        name: body.name,
        description: body.description,
        category: body.category,
        price: body.price,
        release_date: body.release_date,
        stock_quantity: body.stock_quantity,
    };

    let repo = ProductRepository::new(state.pool());
    match repo.create(&new).await {
        Ok(product) => Ok((StatusCode::CREATED, Json(product))),
        Err(e) => {
            // Compensating archive of the just-created Stripe product
            if let Err(stripe_err) = state.stripe().delete_product(&stripe_product_id).await {
                tracing::error!(
                    stripe_product_id = %stripe_product_id,
                    error = %stripe_err,
                    "Failed to archive stripe product after local insert failure"
                );
            }
            Err(ApiError::Database(e))
        }
    }
}

/// Update a product (admin).
///
/// Name/price changes are pushed to Stripe before the local row is written.
#[instrument(skip(state, body))]
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<Json<Product>> {
    if let Some(price) = body.price
        && price < 0
    {
        return Err(ApiError::Validation("price must not be negative".into()));
    }

    let repo = ProductRepository::new(state.pool());
    let existing = repo.get(id).await.map_err(|e| match e {
        crate::db::RepositoryError::NotFound => ApiError::product_not_found(id),
        other => ApiError::Database(other),
    })?;

    if body.name.is_some() || body.price.is_some() {
        state
            .stripe()
            .update_product(
                &existing.stripe_product_id,
                body.name.as_deref(),
                body.price,
            )
            .await?;
    }

    let update = ProductUpdate {
        size_id: body.size_id,
        target_id: body.target_id,
        clothes_type_id: body.clothes_type_id,
        brand_id: body.brand_id,
        name: body.name,
        description: body.description,
        category: body.category,
        price: body.price,
        release_date: body.release_date,
        stock_quantity: body.stock_quantity,
    };

    let product = repo.update(id, &update).await?;
    Ok(Json(product))
}

/// Soft-delete one product and archive its Stripe mirror (admin).
#[instrument(skip(state))]
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    archive_products(&state, &[id]).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Soft-delete a batch of products and archive their Stripe mirrors (admin).
#[instrument(skip(state, body))]
pub async fn bulk_delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<BulkDeleteRequest>,
) -> Result<StatusCode> {
    if body.product_ids.is_empty() {
        return Err(ApiError::Validation("product_ids must not be empty".into()));
    }
    archive_products(&state, &body.product_ids).await?;
    Ok(StatusCode::OK)
}

/// Upload a product image (admin, multipart field `file`).
#[instrument(skip(state, multipart))]
pub async fn upload_image(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    mut multipart: Multipart,
) -> Result<Json<Product>> {
    let repo = ProductRepository::new(state.pool());
    if !repo.exists(id).await? {
        return Err(ApiError::product_not_found(id));
    }

    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("invalid multipart body: {e}")))?
    {
        if let Some(filename) = field.file_name().map(ToOwned::to_owned) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(format!("invalid multipart body: {e}")))?;
            upload = Some((filename, bytes.to_vec()));
            break;
        }
    }

    let (filename, bytes) =
        upload.ok_or_else(|| ApiError::Validation("no image file in request".into()))?;

    let img_url = state.storage().upload(bytes, &filename).await?;
    let product = repo.set_image_url(id, &img_url).await?;

    Ok(Json(product))
}

/// Soft-delete locally, then archive each Stripe mirror.
async fn archive_products(state: &AppState, ids: &[ProductId]) -> Result<()> {
    let repo = ProductRepository::new(state.pool());
    let deleted = repo.mark_deleted(ids).await?;

    if deleted.is_empty() {
        return Err(ApiError::NotFound("no products matched the given ids".into()));
    }

    for product in &deleted {
        state
            .stripe()
            .delete_product(&product.stripe_product_id)
            .await?;
    }

    Ok(())
}

/// Resolve the raw query into a `ProductFilter`, applying the default
/// visibility window (non-deleted, already released).
fn build_filter(query: &ProductListQuery) -> Result<ProductFilter> {
    let released_before = match &query.release_date {
        Some(raw) => parse_release_date(raw)?,
        None => Utc::now(),
    };

    Ok(ProductFilter {
        size_ids: parse_id_list(query.size.as_deref(), "size")?
            .into_iter()
            .map(SizeId::new)
            .collect(),
        target_ids: parse_id_list(query.target.as_deref(), "target")?
            .into_iter()
            .map(TargetId::new)
            .collect(),
        clothes_type_ids: parse_id_list(query.clothes_type.as_deref(), "clothes_type")?
            .into_iter()
            .map(ClothesTypeId::new)
            .collect(),
        brand_ids: parse_id_list(query.brand.as_deref(), "brand")?
            .into_iter()
            .map(BrandId::new)
            .collect(),
        keyword: query
            .keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(ToOwned::to_owned),
        is_deleted: query.is_deleted.unwrap_or(false),
        released_before,
    })
}

/// Parse a comma-separated id list (`"1,2,3"`).
fn parse_id_list(raw: Option<&str>, param: &str) -> Result<Vec<i32>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i32>().map_err(|_| {
                ApiError::Validation(format!("{param} must be a comma-separated list of ids"))
            })
        })
        .collect()
}

/// Parse the `release_date` parameter.
///
/// Accepts RFC 3339 with an offset, or a bare ISO-8601 local datetime which
/// is taken as UTC.
fn parse_release_date(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Ok(with_offset.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc());
    }

    Err(ApiError::Validation(
        "release_date must be ISO format (e.g., 2023-09-30T10:00:00)".into(),
    ))
}

/// Shared field validation for new products.
fn validate_product_fields(name: &str, price: i64, stock_quantity: i32) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ApiError::Validation("name must not be empty".into()));
    }
    if price < 0 {
        return Err(ApiError::Validation("price must not be negative".into()));
    }
    if stock_quantity < 0 {
        return Err(ApiError::Validation(
            "stock_quantity must not be negative".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list(Some("1,2,3"), "size").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_id_list(Some(" 4 , 5 "), "size").unwrap(), vec![4, 5]);
        assert_eq!(parse_id_list(Some(""), "size").unwrap(), Vec::<i32>::new());
        assert_eq!(parse_id_list(None, "size").unwrap(), Vec::<i32>::new());
        assert!(parse_id_list(Some("1,two"), "size").is_err());
    }

    #[test]
    fn test_parse_release_date_accepts_iso_without_offset() {
        let parsed = parse_release_date("2023-09-30T10:00:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2023-09-30T10:00:00+00:00");
    }

    #[test]
    fn test_parse_release_date_accepts_rfc3339() {
        let parsed = parse_release_date("2023-09-30T10:00:00+09:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2023-09-30T01:00:00+00:00");
    }

    #[test]
    fn test_parse_release_date_rejects_garbage() {
        for raw in ["2023/09/30", "not-a-date", "2023-09-30"] {
            assert!(
                matches!(parse_release_date(raw), Err(ApiError::Validation(_))),
                "expected rejection for {raw:?}"
            );
        }
    }

    #[test]
    fn test_build_filter_defaults() {
        let filter = build_filter(&ProductListQuery::default()).unwrap();
        assert!(!filter.is_deleted);
        assert!(filter.size_ids.is_empty());
        assert!(filter.keyword.is_none());
        // The default window is "released by now"
        assert!(filter.released_before <= Utc::now());
    }

    #[test]
    fn test_build_filter_blank_keyword_dropped() {
        let query = ProductListQuery {
            keyword: Some("   ".to_string()),
            ..Default::default()
        };
        let filter = build_filter(&query).unwrap();
        assert!(filter.keyword.is_none());
    }

    #[test]
    fn test_validate_product_fields() {
        assert!(validate_product_fields("Shirt", 100, 5).is_ok());
        assert!(validate_product_fields("", 100, 5).is_err());
        assert!(validate_product_fields("Shirt", -1, 5).is_err());
        assert!(validate_product_fields("Shirt", 100, -5).is_err());
    }
}

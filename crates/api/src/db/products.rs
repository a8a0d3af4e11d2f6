//! Product repository: the catalog query engine and product mutations.
//!
//! Listing builds a dynamic query from multi-valued facet filters, keyword
//! search, visibility (soft-delete) and release-date windowing, and
//! annotates each row with the requesting user's favorite state via a
//! filtered `LEFT JOIN`.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use wardrobe_core::{BrandId, ClothesTypeId, ProductId, SizeId, TargetId, UserId};

use super::RepositoryError;
use crate::models::{Product, ProductView};
use crate::pagination::{PAGE_SIZE, Page, PageQuery};

/// Resolved catalog listing filter.
///
/// Defaults (`is_deleted = false`, `released_before = now`) are applied by
/// the route layer before the filter reaches the repository.
#[derive(Debug, Clone)]
pub struct ProductFilter {
    /// Facet filters: OR within a facet, AND across facets. Empty = no filter.
    pub size_ids: Vec<SizeId>,
    pub target_ids: Vec<TargetId>,
    pub clothes_type_ids: Vec<ClothesTypeId>,
    pub brand_ids: Vec<BrandId>,
    /// Case-insensitive substring matched against name OR description.
    pub keyword: Option<String>,
    /// Visibility window: which side of the soft-delete flag to list.
    pub is_deleted: bool,
    /// Only products released strictly before this instant are listed.
    pub released_before: DateTime<Utc>,
}

/// Fields for a new product row.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub size_id: SizeId,
    pub target_id: TargetId,
    pub clothes_type_id: ClothesTypeId,
    pub brand_id: BrandId,
    pub stripe_product_id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: i64,
    pub release_date: DateTime<Utc>,
    pub stock_quantity: i32,
}

/// Partial update for a product row. `None` fields keep their value.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
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

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products matching `filter`, newest release first, annotated with
    /// `viewer`'s favorite state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        page: PageQuery,
        viewer: Option<UserId>,
    ) -> Result<Page<ProductView>, RepositoryError> {
        let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM products p");
        push_filters(&mut count_query, filter);
        let count: i64 = count_query
            .build_query_scalar()
            .fetch_one(self.pool)
            .await?;

        let mut list_query = build_list_query(filter, viewer, page);
        let results: Vec<ProductView> = list_query
            .build_query_as()
            .fetch_all(self.pool)
            .await?;

        Ok(Page::new(count, page.number(), results))
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product with that id exists.
    pub async fn get(&self, id: ProductId) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// True when a product with this id exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(id)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// Insert a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name or Stripe product id
    /// collides, `RepositoryError::Database` otherwise.
    pub async fn create(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(
            r"
            INSERT INTO products
                (size_id, target_id, clothes_type_id, brand_id, stripe_product_id,
                 name, description, category, price, release_date, stock_quantity)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            ",
        )
        .bind(new.size_id)
        .bind(new.target_id)
        .bind(new.clothes_type_id)
        .bind(new.brand_id)
        .bind(&new.stripe_product_id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.category)
        .bind(new.price)
        .bind(new.release_date)
        .bind(new.stock_quantity)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "a product with this name already exists"))
    }

    /// Apply a partial update to a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist and
    /// `RepositoryError::Conflict` on a name collision.
    pub async fn update(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(
            r"
            UPDATE products SET
                size_id = COALESCE($2, size_id),
                target_id = COALESCE($3, target_id),
                clothes_type_id = COALESCE($4, clothes_type_id),
                brand_id = COALESCE($5, brand_id),
                name = COALESCE($6, name),
                description = COALESCE($7, description),
                category = COALESCE($8, category),
                price = COALESCE($9, price),
                release_date = COALESCE($10, release_date),
                stock_quantity = COALESCE($11, stock_quantity),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(update.size_id)
        .bind(update.target_id)
        .bind(update.clothes_type_id)
        .bind(update.brand_id)
        .bind(update.name.as_deref())
        .bind(update.description.as_deref())
        .bind(update.category.as_deref())
        .bind(update.price)
        .bind(update.release_date)
        .bind(update.stock_quantity)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "a product with this name already exists"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Soft-delete products, returning the affected rows (the caller archives
    /// their Stripe mirrors afterwards).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn mark_deleted(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<Product>, RepositoryError> {
        let raw_ids: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();
        let rows = sqlx::query_as::<_, Product>(
            r"
            UPDATE products
            SET is_deleted = TRUE, updated_at = NOW()
            WHERE id = ANY($1)
            RETURNING *
            ",
        )
        .bind(raw_ids)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Store the uploaded image URL for a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn set_image_url(
        &self,
        id: ProductId,
        img_url: &str,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(
            r"
            UPDATE products
            SET img_url = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(img_url)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}

/// Build the paginated listing query for `filter` as seen by `viewer`.
///
/// The filtered `LEFT JOIN` against `favorites` makes `fav` true exactly
/// when the viewer has a favorite row; a `NULL` viewer id never matches, so
/// anonymous listings are all `fav = false`.
fn build_list_query(
    filter: &ProductFilter,
    viewer: Option<UserId>,
    page: PageQuery,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(
        "SELECT p.*, (f.user_id IS NOT NULL) AS fav \
         FROM products p \
         LEFT JOIN favorites f ON f.product_id = p.id AND f.user_id = ",
    );
    qb.push_bind(viewer.map(|id| id.as_i32()));
    push_filters(&mut qb, filter);
    qb.push(" ORDER BY p.release_date DESC");
    qb.push(" LIMIT ");
    qb.push_bind(PAGE_SIZE);
    qb.push(" OFFSET ");
    qb.push_bind(page.offset());
    qb
}

/// Append the shared WHERE clause: soft-delete flag, release window, facet
/// membership (OR within a facet, AND across facets), keyword substring.
fn push_filters(qb: &mut QueryBuilder<'static, Postgres>, filter: &ProductFilter) {
    qb.push(" WHERE p.is_deleted = ");
    qb.push_bind(filter.is_deleted);
    qb.push(" AND p.release_date < ");
    qb.push_bind(filter.released_before);

    push_facet(qb, "p.size_id", filter.size_ids.iter().map(|id| id.as_i32()));
    push_facet(
        qb,
        "p.target_id",
        filter.target_ids.iter().map(|id| id.as_i32()),
    );
    push_facet(
        qb,
        "p.clothes_type_id",
        filter.clothes_type_ids.iter().map(|id| id.as_i32()),
    );
    push_facet(
        qb,
        "p.brand_id",
        filter.brand_ids.iter().map(|id| id.as_i32()),
    );

    if let Some(keyword) = &filter.keyword {
        let pattern = format!("%{}%", escape_like(keyword));
        qb.push(" AND (p.name ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR p.description ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
}

/// Append a set-membership clause for one facet column, if any ids were given.
fn push_facet(
    qb: &mut QueryBuilder<'static, Postgres>,
    column: &str,
    ids: impl Iterator<Item = i32>,
) {
    let ids: Vec<i32> = ids.collect();
    if ids.is_empty() {
        return;
    }
    qb.push(" AND ");
    qb.push(column);
    qb.push(" = ANY(");
    qb.push_bind(ids);
    qb.push(")");
}

/// Escape LIKE metacharacters so user keywords match literally.
fn escape_like(keyword: &str) -> String {
    keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_filter() -> ProductFilter {
        ProductFilter {
            size_ids: Vec::new(),
            target_ids: Vec::new(),
            clothes_type_ids: Vec::new(),
            brand_ids: Vec::new(),
            keyword: None,
            is_deleted: false,
            released_before: Utc::now(),
        }
    }

    #[test]
    fn test_default_filter_sql_has_visibility_window_only() {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM products p");
        push_filters(&mut qb, &base_filter());
        let sql = qb.sql();
        assert!(sql.contains("p.is_deleted = $1"));
        assert!(sql.contains("p.release_date < $2"));
        assert!(!sql.contains("ANY"));
        assert!(!sql.contains("ILIKE"));
    }

    #[test]
    fn test_facets_are_anded_across_and_ored_within() {
        let filter = ProductFilter {
            size_ids: vec![SizeId::new(1), SizeId::new(2)],
            brand_ids: vec![BrandId::new(9)],
            ..base_filter()
        };
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM products p");
        push_filters(&mut qb, &filter);
        let sql = qb.sql();
        // One ANY clause per populated facet, joined by AND
        assert!(sql.contains("p.size_id = ANY($3)"));
        assert!(sql.contains("p.brand_id = ANY($4)"));
        assert!(!sql.contains("p.target_id"));
        assert!(!sql.contains("p.clothes_type_id"));
    }

    #[test]
    fn test_keyword_matches_name_or_description() {
        let filter = ProductFilter {
            keyword: Some("shirt".to_string()),
            ..base_filter()
        };
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM products p");
        push_filters(&mut qb, &filter);
        let sql = qb.sql();
        assert!(sql.contains("p.name ILIKE $3 OR p.description ILIKE $4"));
    }

    #[test]
    fn test_list_query_orders_by_release_date_desc() {
        let qb = build_list_query(&base_filter(), None, PageQuery { page: Some(2) });
        let sql = qb.sql();
        assert!(sql.contains("ORDER BY p.release_date DESC"));
        assert!(sql.contains("LIMIT"));
        assert!(sql.contains("OFFSET"));
    }

    #[test]
    fn test_list_query_joins_favorites_for_viewer() {
        let qb = build_list_query(&base_filter(), Some(UserId::new(7)), PageQuery { page: None });
        let sql = qb.sql();
        assert!(sql.contains("LEFT JOIN favorites f"));
        assert!(sql.contains("(f.user_id IS NOT NULL) AS fav"));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }
}

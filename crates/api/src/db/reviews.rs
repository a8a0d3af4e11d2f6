//! Review repository: per-product aggregation and one-review-per-user upsert.

use sqlx::PgPool;

use wardrobe_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::Review;
use crate::pagination::{PAGE_SIZE, Page, PageQuery};

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a product's reviews, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
        page: PageQuery,
    ) -> Result<Page<Review>, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE product_id = $1")
            .bind(product_id)
            .fetch_one(self.pool)
            .await?;

        let reviews = sqlx::query_as::<_, Review>(
            r"
            SELECT * FROM reviews
            WHERE product_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(product_id)
        .bind(PAGE_SIZE)
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(Page::new(count, page.number(), reviews))
    }

    /// Arithmetic mean of a product's ratings, `None` when it has no reviews.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn average_rating(
        &self,
        product_id: ProductId,
    ) -> Result<Option<f64>, RepositoryError> {
        let average: Option<f64> = sqlx::query_scalar(
            "SELECT AVG(rating)::float8 FROM reviews WHERE product_id = $1",
        )
        .bind(product_id)
        .fetch_one(self.pool)
        .await?;
        Ok(average)
    }

    /// True iff any line item joins one of the user's orders to this product,
    /// regardless of order status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn has_purchased(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let purchased: bool = sqlx::query_scalar(
            r"
            SELECT EXISTS(
                SELECT 1
                FROM order_items oi
                JOIN orders o ON o.id = oi.order_id
                WHERE o.user_id = $1 AND oi.product_id = $2
            )
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await?;
        Ok(purchased)
    }

    /// Get the user's review of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has not reviewed it.
    pub async fn get_for_user(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Review, RepositoryError> {
        sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Create or update the user's review of a product in place.
    ///
    /// The unique (user, product) constraint guarantees at most one row per
    /// pair; a second submission overwrites rating and comment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(
        &self,
        user_id: UserId,
        product_id: ProductId,
        rating: i32,
        comment: Option<&str>,
    ) -> Result<Review, RepositoryError> {
        let review = sqlx::query_as::<_, Review>(
            r"
            INSERT INTO reviews (user_id, product_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET
                rating = EXCLUDED.rating,
                comment = EXCLUDED.comment,
                updated_at = NOW()
            RETURNING *
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(self.pool)
        .await?;
        Ok(review)
    }

    /// Delete the user's review of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no review exists for the pair.
    pub async fn delete_for_user(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM reviews WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

//! Wishlist repository.
//!
//! Same toggle semantics as favorites, with a public/private flag carried on
//! the row. Asserting an existing entry with a new flag updates the flag;
//! asserting without one leaves it unchanged.

use sqlx::PgPool;

use wardrobe_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::WishlistEntry;

/// Repository for wishlist database operations.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the user's wishlist, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<WishlistEntry>, RepositoryError> {
        let entries = sqlx::query_as::<_, WishlistEntry>(
            "SELECT * FROM wishlist_entries WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(entries)
    }

    /// Assert the entry exists, optionally (re)setting its visibility.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        is_public: Option<bool>,
    ) -> Result<WishlistEntry, RepositoryError> {
        let entry = sqlx::query_as::<_, WishlistEntry>(
            r"
            INSERT INTO wishlist_entries (user_id, product_id, is_public)
            VALUES ($1, $2, COALESCE($3, FALSE))
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET
                is_public = COALESCE($3, wishlist_entries.is_public),
                updated_at = NOW()
            RETURNING *
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(is_public)
        .fetch_one(self.pool)
        .await?;
        Ok(entry)
    }

    /// Assert the entry does not exist. Removing an absent row is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM wishlist_entries WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}

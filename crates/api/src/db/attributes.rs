//! Catalog attribute facet repository.
//!
//! Sizes, targets, clothes types, and brands share one table shape
//! (`id, name, created_at, updated_at`); the repository is instantiated per
//! table via the constructors below, so queries interpolate only these
//! compile-time table names.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::Attribute;

/// Repository for one catalog facet table.
pub struct AttributeRepository<'a> {
    pool: &'a PgPool,
    table: &'static str,
}

impl<'a> AttributeRepository<'a> {
    /// Repository over the `sizes` table.
    #[must_use]
    pub const fn sizes(pool: &'a PgPool) -> Self {
        Self {
            pool,
            table: "sizes",
        }
    }

    /// Repository over the `targets` table.
    #[must_use]
    pub const fn targets(pool: &'a PgPool) -> Self {
        Self {
            pool,
            table: "targets",
        }
    }

    /// Repository over the `clothes_types` table.
    #[must_use]
    pub const fn clothes_types(pool: &'a PgPool) -> Self {
        Self {
            pool,
            table: "clothes_types",
        }
    }

    /// Repository over the `brands` table.
    #[must_use]
    pub const fn brands(pool: &'a PgPool) -> Self {
        Self {
            pool,
            table: "brands",
        }
    }

    /// List all values, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Attribute>, RepositoryError> {
        let rows = sqlx::query_as::<_, Attribute>(&format!(
            "SELECT * FROM {} ORDER BY name",
            self.table
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Get a value by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row with that id exists.
    pub async fn get(&self, id: i32) -> Result<Attribute, RepositoryError> {
        sqlx::query_as::<_, Attribute>(&format!("SELECT * FROM {} WHERE id = $1", self.table))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Insert a new value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name already exists.
    pub async fn create(&self, name: &str) -> Result<Attribute, RepositoryError> {
        sqlx::query_as::<_, Attribute>(&format!(
            "INSERT INTO {} (name) VALUES ($1) RETURNING *",
            self.table
        ))
        .bind(name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "this name already exists"))
    }

    /// Rename a value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the row doesn't exist and
    /// `RepositoryError::Conflict` on a name collision.
    pub async fn update(&self, id: i32, name: &str) -> Result<Attribute, RepositoryError> {
        sqlx::query_as::<_, Attribute>(&format!(
            "UPDATE {} SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
            self.table
        ))
        .bind(id)
        .bind(name)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "this name already exists"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the row doesn't exist.
    pub async fn delete(&self, id: i32) -> Result<(), RepositoryError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", self.table))
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

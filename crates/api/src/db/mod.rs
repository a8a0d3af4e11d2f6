//! Database operations for the Wardrobe `PostgreSQL` store.
//!
//! # Tables
//!
//! - `sizes`, `targets`, `clothes_types`, `brands` - Catalog attribute facets
//! - `products` - Catalog products (soft-deleted via `is_deleted`)
//! - `users` - Accounts (inactive until email confirmation)
//! - `cart_items`, `favorites`, `wishlist_entries` - Per-user product associations
//! - `orders`, `order_items` - Orders with snapshot pricing
//! - `reviews` - One review per (user, product)
//! - `payments`, `shipments` - Order fulfillment records
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p wardrobe-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub mod attributes;
pub mod cart;
pub mod favorites;
pub mod orders;
pub mod payments;
pub mod products;
pub mod reviews;
pub mod shipments;
pub mod users;
pub mod wishlist;

/// Error type shared by all repositories.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Unique constraint collision.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The targeted row does not exist.
    #[error("row not found")]
    NotFound,

    /// Stored data failed to parse into a domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

impl RepositoryError {
    /// Map a sqlx error, turning unique violations into `Conflict`.
    pub(crate) fn from_sqlx(e: sqlx::Error, conflict_message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict_message.to_owned());
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

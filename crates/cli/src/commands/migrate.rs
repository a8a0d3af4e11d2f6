//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! wardrobe-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `WARDROBE_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection
//!   string

use super::CommandError;

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    tracing::info!("Connecting to database...");
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}

//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use wardrobe_api::config::StripeConfig;
use wardrobe_api::services::StripeClient;

/// Errors shared by the commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Connect to the database named by `WARDROBE_DATABASE_URL` (falling back to
/// `DATABASE_URL`).
pub(crate) async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let url = std::env::var("WARDROBE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CommandError::MissingEnvVar("WARDROBE_DATABASE_URL"))?;

    let pool = PgPool::connect(&url).await?;
    Ok(pool)
}

/// Build a Stripe client from `STRIPE_SECRET_KEY` (the checkout URLs are not
/// used by CLI commands).
pub(crate) fn stripe_client() -> Result<StripeClient, CommandError> {
    dotenvy::dotenv().ok();

    let secret_key = std::env::var("STRIPE_SECRET_KEY")
        .map_err(|_| CommandError::MissingEnvVar("STRIPE_SECRET_KEY"))?;
    let api_base = std::env::var("STRIPE_API_BASE")
        .unwrap_or_else(|_| "https://api.stripe.com".to_string());

    Ok(StripeClient::new(&StripeConfig {
        api_base,
        secret_key: SecretString::from(secret_key),
        checkout_success_url: String::new(),
        checkout_cancel_url: String::new(),
    }))
}

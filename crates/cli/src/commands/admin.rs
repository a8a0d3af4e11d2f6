//! Admin user creation command.

use wardrobe_core::{Email, Role};

use wardrobe_api::db::users::{NewUser, UserRepository};
use wardrobe_api::services::passwords::{hash_password, validate_password};

/// Create an admin user with a Stripe customer mirror.
///
/// # Errors
///
/// Returns an error if the email or password is invalid, the Stripe call
/// fails, or the insert collides with an existing account.
pub async fn create_user(
    email: &str,
    name: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let email = Email::parse(email)?;
    validate_password(password)?;
    let password_hash = hash_password(password)?;

    let stripe = super::stripe_client()?;
    let pool = super::connect().await?;

    // Same ordering as the signup flow: external resource first, compensated
    // if the local insert fails.
    let stripe_customer_id = stripe.create_customer(name, email.as_str(), "").await?;

    let repo = UserRepository::new(&pool);
    let new = NewUser {
        stripe_customer_id: stripe_customer_id.clone(),
        name: name.to_owned(),
        email,
        password_hash: Some(password_hash),
        role: Role::Admin,
        address: String::new(),
        is_active: true,
        is_staff: true,
    };

    match repo.create(&new).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "Admin user created");
            Ok(())
        }
        Err(e) => {
            if let Err(stripe_err) = stripe.delete_customer(&stripe_customer_id).await {
                tracing::error!(
                    stripe_customer_id = %stripe_customer_id,
                    error = %stripe_err,
                    "Failed to delete stripe customer after local insert failure"
                );
            }
            Err(Box::new(e))
        }
    }
}

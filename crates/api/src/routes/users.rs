//! User management route handlers.
//!
//! Admin CRUD over accounts plus the caller's own profile. Creation mirrors
//! the signup ordering (Stripe customer first, compensating delete on local
//! failure); profile updates can never touch role or staff flags.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use wardrobe_core::{Email, Role, UserId};

use crate::db::RepositoryError;
use crate::db::users::{NewUser, UserRepository, UserUpdate};
use crate::error::{ApiError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::User;
use crate::pagination::{Page, PageQuery};
use crate::services::passwords::{hash_password, validate_password};
use crate::state::AppState;

/// Request body for creating a user (admin).
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub address: String,
    /// Admin-created accounts default to active.
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
}

/// Request body for updating a user (admin).
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
}

/// Request body for updating the caller's own profile.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub address: Option<String>,
}

/// List users (admin), newest first.
#[instrument(skip(state))]
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<User>>> {
    let repo = UserRepository::new(state.pool());
    let users = repo.list(page).await?;
    Ok(Json(users))
}

/// User detail (admin).
#[instrument(skip(state))]
pub async fn show(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<User>> {
    let repo = UserRepository::new(state.pool());
    let user = repo.get(id).await.map_err(|e| user_not_found(e, id))?;
    Ok(Json(user))
}

/// Create a user (admin): Stripe customer first, compensating delete on
/// local failure.
#[instrument(skip(state, body))]
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let email = Email::parse(&body.email).map_err(|e| ApiError::Validation(e.to_string()))?;
    if body.name.trim().is_empty() {
        return Err(ApiError::Validation("name must not be empty".into()));
    }
    validate_password(&body.password)?;
    let password_hash = hash_password(&body.password)?;

    let stripe_customer_id = state
        .stripe()
        .create_customer(&body.name, email.as_str(), &body.address)
        .await?;

    let repo = UserRepository::new(state.pool());
    let new = NewUser {
        stripe_customer_id: stripe_customer_id.clone(),
        name: body.name,
        email,
        password_hash: Some(password_hash),
        role: body.role,
        address: body.address,
        is_active: body.is_active.unwrap_or(true),
        is_staff: body.is_staff.unwrap_or(false),
    };

    match repo.create(&new).await {
        Ok(user) => Ok((StatusCode::CREATED, Json(user))),
        Err(e) => {
            // Compensating delete of the just-created Stripe customer
            if let Err(stripe_err) = state.stripe().delete_customer(&stripe_customer_id).await {
                tracing::error!(
                    stripe_customer_id = %stripe_customer_id,
                    error = %stripe_err,
                    "Failed to delete stripe customer after local insert failure"
                );
            }
            Err(ApiError::Database(e))
        }
    }
}

/// Update a user (admin), pushing profile changes to Stripe afterwards.
#[instrument(skip(state, body))]
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<User>> {
    let update = build_update(
        body.name,
        body.email,
        body.password,
        body.address,
        body.role,
        body.is_active,
        body.is_staff,
    )?;

    apply_update(&state, id, update).await.map(Json)
}

/// Delete a user (admin) and tear down the Stripe customer mirror.
#[instrument(skip(state))]
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<StatusCode> {
    let repo = UserRepository::new(state.pool());
    let removed = repo.delete(id).await.map_err(|e| user_not_found(e, id))?;

    state
        .stripe()
        .delete_customer(&removed.stripe_customer_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// The caller's own record.
#[instrument(skip(state, user))]
pub async fn profile(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<User>> {
    let repo = UserRepository::new(state.pool());
    let record = repo.get(user.id).await?;
    Ok(Json(record))
}

/// Update the caller's own record; role and staff flags are not writable.
#[instrument(skip(state, user, body))]
pub async fn update_profile(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<User>> {
    let update = build_update(
        body.name,
        body.email,
        body.password,
        body.address,
        None,
        None,
        None,
    )?;

    apply_update(&state, user.id, update).await.map(Json)
}

/// Validate raw fields into a repository update.
#[allow(clippy::too_many_arguments)]
fn build_update(
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    address: Option<String>,
    role: Option<Role>,
    is_active: Option<bool>,
    is_staff: Option<bool>,
) -> Result<UserUpdate> {
    let email = email
        .map(|raw| Email::parse(&raw).map_err(|e| ApiError::Validation(e.to_string())))
        .transpose()?;

    let password_hash = password
        .map(|raw| {
            validate_password(&raw)?;
            hash_password(&raw)
        })
        .transpose()?;

    Ok(UserUpdate {
        name,
        email,
        password_hash,
        role,
        address,
        is_active,
        is_staff,
    })
}

/// Apply a local update, then push the profile to Stripe.
async fn apply_update(state: &AppState, id: UserId, update: UserUpdate) -> Result<User> {
    let push_name = update.name.clone();
    let push_email = update.email.clone();

    let repo = UserRepository::new(state.pool());
    let user = repo
        .update(id, &update)
        .await
        .map_err(|e| user_not_found(e, id))?;

    if push_name.is_some() || push_email.is_some() {
        state
            .stripe()
            .update_customer(
                &user.stripe_customer_id,
                push_name.as_deref(),
                push_email.as_ref().map(Email::as_str),
            )
            .await?;
    }

    Ok(user)
}

fn user_not_found(e: RepositoryError, id: UserId) -> ApiError {
    match e {
        RepositoryError::NotFound => ApiError::NotFound(format!("no user exists with id {id}")),
        other => ApiError::Database(other),
    }
}

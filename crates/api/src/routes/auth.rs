//! Signup, email confirmation, and token route handlers.
//!
//! Signup orders its side effects so a failure never strands state: the
//! Stripe customer is created first, and deleted again if the local insert
//! fails. The confirmation email is a non-critical follow-up - a delivery
//! failure is logged and reported in the response, but the account stands.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse, response::Response};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use wardrobe_core::{Email, Role, UserId};

use crate::db::RepositoryError;
use crate::db::users::{NewUser, UserRepository};
use crate::error::{ApiError, Result};
use crate::middleware::RequireAuth;
use crate::models::User;
use crate::services::email::{confirmation_url, decode_uid};
use crate::services::passwords::{hash_password, validate_password, verify_password};
use crate::services::tokens::TokenPurpose;
use crate::state::AppState;

/// Request body for self-signup.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub address: String,
}

/// Response for self-signup.
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub user: User,
    /// False when the confirmation email could not be delivered; the account
    /// still exists and the email can be re-requested.
    pub confirmation_email_sent: bool,
}

/// Request body for email confirmation.
#[derive(Debug, Deserialize)]
pub struct ConfirmEmailRequest {
    /// Base64 user id from the mailed link.
    pub uid: String,
    /// Signed confirmation token from the mailed link.
    pub token: String,
}

/// Request body for re-sending the confirmation email.
#[derive(Debug, Deserialize)]
pub struct ResendConfirmationRequest {
    pub email: String,
}

/// Request body for issuing tokens.
#[derive(Debug, Deserialize)]
pub struct IssueTokenRequest {
    pub email: String,
    pub password: String,
}

/// Issued token pair plus a summary of the authenticated user.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access: String,
    pub refresh: String,
    pub user: TokenUser,
}

/// User summary embedded in the token response.
#[derive(Debug, Serialize)]
pub struct TokenUser {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
}

/// Request body for refreshing an access token.
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh: String,
}

/// Request body for the access probe.
#[derive(Debug, Deserialize)]
pub struct CheckAccessRequest {
    #[serde(default)]
    pub check_admin: bool,
}

/// Self-signup: Stripe customer first, then the local row, then the
/// confirmation email.
#[instrument(skip(state, body))]
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>)> {
    let email = Email::parse(&body.email).map_err(|e| ApiError::Validation(e.to_string()))?;
    if body.name.trim().is_empty() {
        return Err(ApiError::Validation("name must not be empty".into()));
    }
    validate_password(&body.password)?;
    let password_hash = hash_password(&body.password)?;

    // External resource first; a signup-time provider failure is surfaced as
    // a user-facing 400, not a bare gateway error.
    let stripe_customer_id = state
        .stripe()
        .create_customer(&body.name, email.as_str(), &body.address)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Stripe customer creation failed during signup");
            ApiError::Validation(
                "could not register a payment profile; please try again later".into(),
            )
        })?;

    let repo = UserRepository::new(state.pool());
    let new = NewUser {
        stripe_customer_id: stripe_customer_id.clone(),
        name: body.name,
        email: email.clone(),
        password_hash: Some(password_hash),
        role: Role::Registered,
        address: body.address,
        is_active: false,
        is_staff: false,
    };

    let user = match repo.create(&new).await {
        Ok(user) => user,
        Err(e) => {
            // Compensating delete of the just-created Stripe customer
            if let Err(stripe_err) = state.stripe().delete_customer(&stripe_customer_id).await {
                tracing::error!(
                    stripe_customer_id = %stripe_customer_id,
                    error = %stripe_err,
                    "Failed to delete stripe customer after local insert failure"
                );
            }
            return Err(ApiError::Database(e));
        }
    };

    let confirmation_email_sent = send_confirmation(&state, &user).await;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            user,
            confirmation_email_sent,
        }),
    ))
}

/// Confirm an email address from the mailed link.
#[instrument(skip(state, body))]
pub async fn confirm_email(
    State(state): State<AppState>,
    Json(body): Json<ConfirmEmailRequest>,
) -> Result<Json<serde_json::Value>> {
    let user_id =
        decode_uid(&body.uid).map_err(|e| ApiError::Validation(e.to_string()))?;

    let claims = state
        .tokens()
        .verify(&body.token, TokenPurpose::EmailConfirmation, Utc::now())?;

    if claims.user_id != user_id {
        return Err(ApiError::Validation("invalid confirmation link".into()));
    }

    let repo = UserRepository::new(state.pool());
    repo.confirm_email(user_id).await.map_err(|e| match e {
        RepositoryError::NotFound => ApiError::NotFound(format!("no user exists with id {user_id}")),
        other => ApiError::Database(other),
    })?;

    Ok(Json(json!({ "message": "email confirmed" })))
}

/// Re-send the confirmation email.
#[instrument(skip(state, body))]
pub async fn resend_confirmation(
    State(state): State<AppState>,
    Json(body): Json<ResendConfirmationRequest>,
) -> Result<Json<serde_json::Value>> {
    let email = Email::parse(&body.email).map_err(|e| ApiError::Validation(e.to_string()))?;

    let repo = UserRepository::new(state.pool());
    let user = repo
        .get_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::NotFound("no account with this email".into()))?;

    if user.email_validated_at.is_some() {
        return Err(ApiError::Validation("email is already confirmed".into()));
    }

    let sent = send_confirmation(&state, &user).await;
    Ok(Json(json!({ "confirmation_email_sent": sent })))
}

/// Issue an access/refresh token pair for valid credentials.
#[instrument(skip(state, body))]
pub async fn issue_token(
    State(state): State<AppState>,
    Json(body): Json<IssueTokenRequest>,
) -> Result<Json<TokenResponse>> {
    let email = Email::parse(&body.email)
        .map_err(|_| ApiError::Unauthorized("invalid credentials".into()))?;

    let repo = UserRepository::new(state.pool());
    let user = repo
        .get_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("invalid credentials".into()))?;

    let stored_hash = user
        .password_hash
        .as_deref()
        .ok_or_else(|| ApiError::Unauthorized("invalid credentials".into()))?;
    verify_password(&body.password, stored_hash)?;

    if !user.is_active {
        return Err(ApiError::Forbidden(
            "account is not active; confirm your email first".into(),
        ));
    }

    let role = user.effective_role();
    let now = Utc::now();
    let access = state
        .tokens()
        .issue(user.id, role, TokenPurpose::Access, now)?;
    let refresh = state
        .tokens()
        .issue(user.id, role, TokenPurpose::Refresh, now)?;

    repo.touch_last_login(user.id).await?;

    Ok(Json(TokenResponse {
        access,
        refresh,
        user: TokenUser {
            id: user.id,
            name: user.name,
            email: user.email,
            role,
        },
    }))
}

/// Exchange a refresh token for a fresh access token.
#[instrument(skip(state, body))]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<Json<serde_json::Value>> {
    let claims = state
        .tokens()
        .verify(&body.refresh, TokenPurpose::Refresh, Utc::now())?;

    let access = state.tokens().issue(
        claims.user_id,
        claims.role,
        TokenPurpose::Access,
        Utc::now(),
    )?;

    Ok(Json(json!({ "access": access })))
}

/// Probe whether the caller's token grants access (optionally admin access).
#[instrument(skip(user))]
pub async fn check_access(
    RequireAuth(user): RequireAuth,
    Json(body): Json<CheckAccessRequest>,
) -> Response {
    if body.check_admin && !user.is_admin() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "message": "administrator access required",
                "result": false,
            })),
        )
            .into_response();
    }

    Json(json!({ "result": true })).into_response()
}

/// Issue the confirmation token and send the email; a delivery failure is
/// logged and reported, not fatal.
async fn send_confirmation(state: &AppState, user: &User) -> bool {
    let token = match state.tokens().issue(
        user.id,
        user.role,
        TokenPurpose::EmailConfirmation,
        Utc::now(),
    ) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "Failed to issue confirmation token");
            return false;
        }
    };

    let url = confirmation_url(&state.config().confirmation_base_url, user.id, &token);
    match state.email().send_confirmation_email(&user.email, &url).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(user_id = %user.id, error = %e, "Failed to send confirmation email");
            false
        }
    }
}

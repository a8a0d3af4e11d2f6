//! Authentication extractors.
//!
//! Handlers take `RequireAuth`, `RequireAdmin`, or `OptionalAuth` to declare
//! the access they need; the extractors verify the bearer token against the
//! state's token service, so there is no session store to consult.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::Utc;

use wardrobe_core::{Role, UserId};

use crate::error::ApiError;
use crate::services::tokens::TokenPurpose;
use crate::state::AppState;

/// The authenticated caller, as carried by a verified access token.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: UserId,
    pub role: Role,
}

impl CurrentUser {
    /// True when the caller holds the admin tier.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.at_least(Role::Admin)
    }
}

/// Extractor that requires a valid access token.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("hello, user {}", user.id)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Extractor that requires a valid access token with the admin tier.
pub struct RequireAdmin(pub CurrentUser);

/// Extractor that accepts anonymous callers.
///
/// Unlike `RequireAuth`, a missing or invalid token yields `None` instead of
/// rejecting the request.
pub struct OptionalAuth(pub Option<CurrentUser>);

/// Pull the bearer token out of the Authorization header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Verify the access token on the request, if any.
fn authenticate(parts: &Parts, state: &AppState) -> Result<CurrentUser, ApiError> {
    let token = bearer_token(parts)
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;

    let claims = state
        .tokens()
        .verify(token, TokenPurpose::Access, Utc::now())?;

    Ok(CurrentUser {
        id: claims.user_id,
        role: claims.role,
    })
}

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        authenticate(parts, &state).map(Self)
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let user = authenticate(parts, &state)?;

        if !user.is_admin() {
            return Err(ApiError::Forbidden(
                "administrator access required".to_string(),
            ));
        }

        Ok(Self(user))
    }
}

impl<S> FromRequestParts<S> for OptionalAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        Ok(Self(authenticate(parts, &state).ok()))
    }
}

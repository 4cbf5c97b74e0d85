//! Bearer-token authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use seclock_core::claims::ClaimSet;
use seclock_core::error::CoreError;
use seclock_core::types::DbId;

use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from the `Authorization: Bearer` header.
///
/// Extraction runs the full token check: signature, embedded expiry, and a
/// match against the token stored for the user. A superseded, revoked or
/// expired token is rejected with 401.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    /// Privilege snapshot taken when the token was issued.
    pub claims: ClaimSet,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate_bearer(state, &parts.headers).await
    }
}

/// Authenticate the bearer token in `headers`.
///
/// Shared by [`AuthUser`] and handlers that authenticate conditionally.
pub async fn authenticate_bearer(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, AppError> {
    let token = bearer_token(headers)?;
    let claims = state.tokens().authenticate(token).await?;
    Ok(AuthUser {
        user_id: claims.sub,
        claims,
    })
}

/// Extract the raw token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, CoreError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| CoreError::Unauthorized("Missing Authorization header".into()))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            CoreError::Unauthorized("Invalid Authorization format. Expected: Bearer <token>".into())
        })
}

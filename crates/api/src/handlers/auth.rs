//! Handlers for the `/auth` resource (register, login, refresh, verify,
//! validate, logout).

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use seclock_core::audit::{login_failed_detail, ActionKind};
use seclock_core::error::CoreError;
use seclock_core::privileges::Capability;
use seclock_core::types::{DbId, Timestamp};
use seclock_core::users::Registration;
use seclock_db::models::user::UserProfile;
use serde::{Deserialize, Serialize};

use crate::auth::credentials::{create_user, verify_credentials};
use crate::auth::tokens::IssuedToken;
use crate::config::RegistrationMode;
use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::middleware::auth::{authenticate_bearer, AuthUser};
use crate::middleware::rbac::authorize;
use crate::middleware::request_log::RequestMeta;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
///
/// Both fields are optional so that an incomplete body is still recorded as
/// a failed login rather than rejected by the extractor.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login: Option<String>,
    pub password: Option<String>,
}

/// Request body for `POST /auth/refresh` and `POST /auth/validate`.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub token: String,
}

/// Successful authentication response returned by register, login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: Timestamp,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserProfile,
}

impl AuthResponse {
    fn new(issued: IssuedToken, user: UserProfile) -> Self {
        Self {
            expires_in: issued.claims.exp - issued.claims.iat,
            token: issued.token,
            token_type: "Bearer",
            expires_at: issued.expires_at,
            user,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/register
///
/// Create an account and issue its first token. In `privileged` registration
/// mode the caller must hold `edit_users`.
pub async fn register(
    State(state): State<AppState>,
    meta: RequestMeta,
    headers: HeaderMap,
    ApiJson(input): ApiJson<Registration>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let creator = match state.config.registration_mode {
        RegistrationMode::Open => None,
        RegistrationMode::Privileged => {
            let caller = authenticate_bearer(&state, &headers).await?;
            authorize(&state, &meta, &caller, Capability::EditUsers).await?;
            Some(caller.user_id)
        }
    };

    let user = create_user(state.store.as_ref(), input, state.config.password_min_length).await?;
    let profile = load_profile(&state, user.id).await?;
    let issued = state.tokens().issue(&profile).await?;

    state
        .audit
        .system_event(
            meta.event(ActionKind::UserCreation)
                .with_actor(Some(creator.unwrap_or(user.id)))
                .with_detail(format!("User {} created", profile.login)),
        )
        .await;

    Ok((StatusCode::CREATED, Json(AuthResponse::new(issued, profile))))
}

/// POST /api/auth/login
///
/// Authenticate with login + password. Unknown logins and wrong passwords
/// are indistinguishable to the caller and in the audit trail.
pub async fn login(
    State(state): State<AppState>,
    meta: RequestMeta,
    ApiJson(input): ApiJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let login = input.login.as_deref().map(str::trim).unwrap_or_default();
    let password = input.password.as_deref().unwrap_or_default();

    if login.is_empty() || password.is_empty() {
        record_login_failure(&state, &meta, login).await;
        return Err(AppError::Core(CoreError::Validation(
            "login and password are required".into(),
        )));
    }

    let Some(user) = verify_credentials(state.store.as_ref(), login, password).await? else {
        record_login_failure(&state, &meta, login).await;
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid login or password".into(),
        )));
    };

    let profile = load_profile(&state, user.id).await?;
    let issued = state.tokens().issue(&profile).await?;

    tracing::info!(user_id = user.id, "User logged in");
    state
        .audit
        .system_event(meta.event(ActionKind::Login).with_actor(Some(user.id)))
        .await;

    Ok(Json(AuthResponse::new(issued, profile)))
}

/// POST /api/auth/refresh
///
/// Exchange the current token, expired or not, for a fresh one carrying the
/// user's current privilege.
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<TokenRequest>,
) -> AppResult<Json<AuthResponse>> {
    let (profile, issued) = state.tokens().refresh(&input.token).await?;
    tracing::debug!(user_id = profile.id, "Token refreshed");
    Ok(Json(AuthResponse::new(issued, profile)))
}

/// GET /api/auth/verify
///
/// Succeeds only for the caller's current, unexpired token.
pub async fn verify(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<Json<VerifyResponse>> {
    let user = load_profile(&state, auth_user.user_id).await?;
    Ok(Json(VerifyResponse { valid: true, user }))
}

/// POST /api/auth/validate
///
/// Report whether a token would be accepted, without failing on bad tokens.
pub async fn validate(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<TokenRequest>,
) -> AppResult<Json<ValidateResponse>> {
    let valid = match state.tokens().authenticate(&input.token).await {
        Ok(_) => true,
        Err(CoreError::Unauthorized(_) | CoreError::TokenExpired) => false,
        Err(e) => return Err(e.into()),
    };
    Ok(Json(ValidateResponse { valid }))
}

/// POST /api/auth/logout
///
/// Revoke the caller's stored token. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    state.tokens().revoke(auth_user.user_id).await?;
    tracing::info!(user_id = auth_user.user_id, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_profile(state: &AppState, user_id: DbId) -> AppResult<UserProfile> {
    state
        .store
        .user_profile(user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("User", user_id)))
}

async fn record_login_failure(state: &AppState, meta: &RequestMeta, login: &str) {
    tracing::info!(login, "Failed login attempt");
    state
        .audit
        .system_event(meta.event(ActionKind::LoginFailed).with_detail(login_failed_detail(login)))
        .await;
}

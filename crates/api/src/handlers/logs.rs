//! Handlers for the audit streams (`/logs`, `/system-logs`).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use seclock_core::audit::{ActionKind, LogStream};
use seclock_core::error::CoreError;
use seclock_core::pagination::Page;
use seclock_db::models::log::{SystemEventEntry, UserActionEntry};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireViewLogs;
use crate::middleware::request_log::RequestMeta;
use crate::query::LogQueryParams;
use crate::state::AppState;

/// Request body for `POST /system-logs`.
#[derive(Debug, Deserialize)]
pub struct RecordEventRequest {
    /// `12` (`Page View`) or `4` (`System Event`).
    pub action: i16,
    /// Overrides the recorded endpoint (e.g. the client-side page path).
    pub endpoint: Option<String>,
    pub detail: Option<String>,
}

/// GET /api/logs
pub async fn user_actions(
    State(state): State<AppState>,
    RequireViewLogs(_): RequireViewLogs,
    ApiQuery(params): ApiQuery<LogQueryParams>,
) -> AppResult<Json<Page<UserActionEntry>>> {
    let page = state
        .store
        .query_user_actions(&params.kinds(LogStream::UserAction), params.page_request())
        .await?;
    Ok(Json(page))
}

/// GET /api/system-logs
pub async fn system_events(
    State(state): State<AppState>,
    RequireViewLogs(_): RequireViewLogs,
    ApiQuery(params): ApiQuery<LogQueryParams>,
) -> AppResult<Json<Page<SystemEventEntry>>> {
    let page = state
        .store
        .query_system_events(&params.kinds(LogStream::System), params.page_request())
        .await?;
    Ok(Json(page))
}

/// POST /api/system-logs
///
/// Append a client-reported system event. Recording is best-effort, so a
/// 202 does not guarantee the entry was stored.
pub async fn record_event(
    State(state): State<AppState>,
    meta: RequestMeta,
    auth_user: AuthUser,
    ApiJson(input): ApiJson<RecordEventRequest>,
) -> AppResult<StatusCode> {
    let kind = ActionKind::from_id(input.action)
        .filter(|kind| kind.client_reportable())
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Event kind {} cannot be reported by clients",
                input.action
            )))
        })?;

    let mut event = meta.event(kind).with_actor(Some(auth_user.user_id));
    if let Some(endpoint) = input.endpoint {
        event.endpoint = Some(endpoint);
    }
    if let Some(detail) = input.detail {
        event = event.with_detail(detail);
    }
    state.audit.system_event(event).await;

    Ok(StatusCode::ACCEPTED)
}

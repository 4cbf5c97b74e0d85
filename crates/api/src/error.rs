use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use seclock_core::error::CoreError;
use seclock_db::DbError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses of
/// the form `{ "error": message, "code": KIND, "field"?: name }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `seclock_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        AppError::Core(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut field = None;
        let (status, code, message) = match &self {
            AppError::Core(core) => {
                let status = match core {
                    CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                    CoreError::Validation(_) => StatusCode::BAD_REQUEST,
                    CoreError::Conflict { .. } => StatusCode::CONFLICT,
                    CoreError::Unauthorized(_) | CoreError::TokenExpired => StatusCode::UNAUTHORIZED,
                    CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
                    CoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let message = match core {
                    CoreError::Validation(msg)
                    | CoreError::Unauthorized(msg)
                    | CoreError::Forbidden(msg) => msg.clone(),
                    CoreError::Conflict {
                        message,
                        field: conflicting,
                    } => {
                        field = *conflicting;
                        message.clone()
                    }
                    CoreError::Internal(msg) => {
                        tracing::error!(error = %msg, "Internal core error");
                        "An internal error occurred".to_string()
                    }
                    CoreError::NotFound { .. } | CoreError::TokenExpired => core.to_string(),
                };
                (status, core.code(), message)
            }

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(field) = field {
            body["field"] = json!(field);
        }

        (status, axum::Json(body)).into_response()
    }
}

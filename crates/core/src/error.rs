use std::fmt::Display;

/// Domain error taxonomy shared by every layer.
///
/// Storage errors are converted into this type at the store boundary and the
/// HTTP layer maps each variant onto a status code and a stable `code` string.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} {key} not found")]
    NotFound { entity: &'static str, key: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        /// The unique field that collided (`login`, `email`, `name`, `id`), when known.
        field: Option<&'static str>,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience alias used throughout the domain and service layers.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn not_found(entity: &'static str, key: impl Display) -> Self {
        CoreError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// A conflict on a known unique field.
    pub fn conflict_on(field: &'static str, message: impl Into<String>) -> Self {
        CoreError::Conflict {
            message: message.into(),
            field: Some(field),
        }
    }

    /// Stable machine-readable kind, used as the `code` of error responses.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::NotFound { .. } => "NOT_FOUND",
            CoreError::Validation(_) => "VALIDATION_ERROR",
            CoreError::Conflict { .. } => "CONFLICT",
            CoreError::Unauthorized(_) => "UNAUTHORIZED",
            CoreError::TokenExpired => "TOKEN_EXPIRED",
            CoreError::Forbidden(_) => "FORBIDDEN",
            CoreError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

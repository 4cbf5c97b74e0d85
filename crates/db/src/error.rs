use seclock_core::error::CoreError;

/// Postgres error code for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres error code for foreign key violations.
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("unique constraint {constraint} violated")]
    UniqueViolation { constraint: String },

    #[error("foreign key constraint {constraint} violated")]
    ForeignKeyViolation { constraint: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

pub type DbResult<T> = Result<T, DbError>;

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or_default().to_string();
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => return DbError::UniqueViolation { constraint },
                Some(FOREIGN_KEY_VIOLATION) => return DbError::ForeignKeyViolation { constraint },
                _ => {}
            }
        }
        if matches!(err, sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed) {
            return DbError::Unavailable(err.to_string());
        }
        DbError::Sqlx(err)
    }
}

/// Map a unique constraint name onto the user-facing field it protects.
///
/// Constraint names follow `uq_<table>_<field>`; primary keys map to `id`.
fn constraint_field(constraint: &str) -> Option<&'static str> {
    if constraint.ends_with("_pkey") {
        return Some("id");
    }
    ["login", "email", "name"]
        .into_iter()
        .find(|field| constraint.starts_with("uq_") && constraint.ends_with(&format!("_{field}")))
}

impl From<DbError> for CoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation { constraint } => {
                let field = constraint_field(&constraint);
                let message = match field {
                    Some(field) => format!("{field} already exists"),
                    None => "Resource already exists".to_string(),
                };
                CoreError::Conflict { message, field }
            }
            DbError::ForeignKeyViolation { constraint } => {
                tracing::debug!(constraint = %constraint, "Foreign key violation");
                CoreError::Conflict {
                    message: "Resource is still referenced".to_string(),
                    field: None,
                }
            }
            DbError::Unavailable(msg) => {
                tracing::error!(error = %msg, "Store unavailable");
                CoreError::Internal("Store unavailable".to_string())
            }
            DbError::Sqlx(err) => {
                tracing::error!(error = %err, "Database error");
                CoreError::Internal("Database error".to_string())
            }
        }
    }
}

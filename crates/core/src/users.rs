//! User account rules: registration input validation and account state.

use serde::Deserialize;
use validator::Validate;

use crate::error::{CoreError, CoreResult};
use crate::types::DbId;

/// Default minimum password length when none is configured.
pub const DEFAULT_PASSWORD_MIN_LENGTH: usize = 4;

/// Input for creating an account.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Registration {
    #[validate(length(min = 1, message = "login is required"))]
    pub login: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub privilege_id: DbId,
}

impl Registration {
    /// Trimmed login and email, with a blank display name dropped.
    pub fn normalized(mut self) -> Self {
        self.login = self.login.trim().to_string();
        self.email = self.email.trim().to_string();
        self.name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        self
    }
}

/// Check a registration before anything is persisted.
///
/// Field rules come from the `Validate` derive; blank (whitespace-only)
/// values and the password length are checked here.
pub fn validate_registration(input: &Registration, password_min_length: usize) -> CoreResult<()> {
    if input.login.trim().is_empty() {
        return Err(CoreError::Validation("login is required".into()));
    }
    if input.email.trim().is_empty() {
        return Err(CoreError::Validation("email is required".into()));
    }
    input.validate().map_err(|errors| {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|k| k.to_string())
            .collect();
        fields.sort();
        CoreError::Validation(format!("invalid fields: {}", fields.join(", ")))
    })?;
    validate_password(&input.password, password_min_length)
}

pub fn validate_password(password: &str, min_length: usize) -> CoreResult<()> {
    if password.trim().is_empty() {
        return Err(CoreError::Validation("password is required".into()));
    }
    if password.chars().count() < min_length {
        return Err(CoreError::Validation(format!(
            "password must be at least {min_length} characters"
        )));
    }
    Ok(())
}

/// Account state derived from the persisted `deleted` flag.
///
/// A deleted account has had its login, password hash, token, email and
/// name scrubbed; the transition is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserState {
    Active,
    Deleted,
}

impl UserState {
    pub fn from_row(deleted: bool) -> Self {
        if deleted {
            UserState::Deleted
        } else {
            UserState::Active
        }
    }

    pub fn is_active(self) -> bool {
        self == UserState::Active
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn registration() -> Registration {
        Registration {
            login: "alice".into(),
            password: "secret".into(),
            email: "alice@example.com".into(),
            name: Some("Alice".into()),
            privilege_id: 2,
        }
    }

    #[test]
    fn valid_registration_passes() {
        assert!(validate_registration(&registration(), DEFAULT_PASSWORD_MIN_LENGTH).is_ok());
    }

    #[test]
    fn blank_login_is_rejected() {
        let input = Registration {
            login: "   ".into(),
            ..registration()
        };
        assert_matches!(
            validate_registration(&input, DEFAULT_PASSWORD_MIN_LENGTH),
            Err(CoreError::Validation(msg)) if msg.contains("login")
        );
    }

    #[test]
    fn malformed_email_is_rejected() {
        let input = Registration {
            email: "not-an-email".into(),
            ..registration()
        };
        assert_matches!(
            validate_registration(&input, DEFAULT_PASSWORD_MIN_LENGTH),
            Err(CoreError::Validation(msg)) if msg.contains("email")
        );
    }

    #[test]
    fn short_password_is_rejected() {
        let input = Registration {
            password: "abc".into(),
            ..registration()
        };
        assert_matches!(
            validate_registration(&input, 4),
            Err(CoreError::Validation(msg)) if msg.contains("at least 4")
        );
    }

    #[test]
    fn normalization_trims_and_drops_blank_name() {
        let input = Registration {
            login: " bob ".into(),
            name: Some("  ".into()),
            ..registration()
        }
        .normalized();
        assert_eq!(input.login, "bob");
        assert_eq!(input.name, None);
    }

    #[test]
    fn deleted_flag_maps_to_state() {
        assert!(UserState::from_row(false).is_active());
        assert_eq!(UserState::from_row(true), UserState::Deleted);
    }
}

//! User entity model and DTOs.

use seclock_core::privileges::PrivilegeFlags;
use seclock_core::types::{DbId, Timestamp};
use seclock_core::users::UserState;
use serde::Serialize;
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password and token hashes -- NEVER serialize this to API
/// responses directly. Use [`UserProfile`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub login: Option<String>,
    pub password_hash: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub privilege_id: DbId,
    pub token_hash: Option<String>,
    pub token_expires_at: Option<Timestamp>,
    pub deleted: bool,
    pub created_at: Timestamp,
}

impl User {
    pub fn state(&self) -> UserState {
        UserState::from_row(self.deleted)
    }

    /// The authoritative token digest, if one is stored.
    pub fn stored_token(&self) -> Option<StoredToken> {
        match (&self.token_hash, self.token_expires_at) {
            (Some(hash), Some(expires_at)) => Some(StoredToken {
                token_hash: hash.clone(),
                expires_at,
            }),
            _ => None,
        }
    }
}

/// Digest and expiry of a user's current token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredToken {
    pub token_hash: String,
    pub expires_at: Timestamp,
}

/// DTO for inserting a user. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub login: String,
    pub password_hash: String,
    pub email: String,
    pub name: Option<String>,
    pub privilege_id: DbId,
}

/// A live user joined with its privilege, safe to return to clients.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserProfile {
    pub id: DbId,
    pub login: String,
    pub email: String,
    pub name: Option<String>,
    pub privilege_id: DbId,
    pub privilege_name: String,
    pub view_locks: bool,
    pub view_users: bool,
    pub view_logs: bool,
    pub edit_locks: bool,
    pub edit_users: bool,
}

impl UserProfile {
    pub fn flags(&self) -> PrivilegeFlags {
        PrivilegeFlags {
            view_locks: self.view_locks,
            view_users: self.view_users,
            view_logs: self.view_logs,
            edit_locks: self.edit_locks,
            edit_users: self.edit_users,
        }
    }
}

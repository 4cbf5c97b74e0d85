//! The fixed claim set embedded in every access token.

use serde::{Deserialize, Serialize};

use crate::privileges::PrivilegeFlags;
use crate::types::DbId;

/// Identity and privilege snapshot carried by a token.
///
/// The flags reflect the user's privilege at issuance time; a change to the
/// privilege takes effect at the next issue or refresh. Unknown fields are
/// rejected so that a token minted for another purpose never deserializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClaimSet {
    /// Subject: the user's internal database id.
    pub sub: DbId,
    pub login: String,
    pub email: String,
    pub privilege_id: DbId,
    pub privilege_name: String,
    pub view_locks: bool,
    pub view_users: bool,
    pub view_logs: bool,
    pub edit_locks: bool,
    pub edit_users: bool,
    /// Issued-at (UTC epoch seconds).
    pub iat: i64,
    /// Expiration (UTC epoch seconds).
    pub exp: i64,
    /// Unique token identifier, so that two tokens issued in the same second differ.
    pub jti: String,
}

impl ClaimSet {
    pub fn flags(&self) -> PrivilegeFlags {
        PrivilegeFlags {
            view_locks: self.view_locks,
            view_users: self.view_users,
            view_logs: self.view_logs,
            edit_locks: self.edit_locks,
            edit_users: self.edit_users,
        }
    }

    pub fn set_flags(&mut self, flags: PrivilegeFlags) {
        self.view_locks = flags.view_locks;
        self.view_users = flags.view_users;
        self.view_logs = flags.view_logs;
        self.edit_locks = flags.edit_locks;
        self.edit_users = flags.edit_users;
    }
}

#[cfg(test)]
pub(crate) fn sample_claims(sub: DbId, flags: PrivilegeFlags) -> ClaimSet {
    let mut claims = ClaimSet {
        sub,
        login: format!("user{sub}"),
        email: format!("user{sub}@example.com"),
        privilege_id: 1,
        privilege_name: "Test".into(),
        view_locks: false,
        view_users: false,
        view_logs: false,
        edit_locks: false,
        edit_users: false,
        iat: 0,
        exp: 3600,
        jti: "jti".into(),
    };
    claims.set_flags(flags);
    claims
}

//! Token lifecycle against the durable store.
//!
//! Exactly one token per user is authoritative: the one whose digest is
//! stored on the user row. Issuing overwrites it (last write wins), logout
//! clears it, and refresh swaps it with a compare-and-set.

use chrono::{Duration, Utc};
use seclock_core::claims::ClaimSet;
use seclock_core::error::{CoreError, CoreResult};
use seclock_core::types::{DbId, Timestamp};
use seclock_db::models::user::{StoredToken, UserProfile};
use seclock_db::Store;
use uuid::Uuid;

use super::jwt::{
    decode_token, decode_token_ignoring_expiry, encode_token, hash_token, JwtConfig,
};

/// A freshly signed token and what it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: ClaimSet,
    pub expires_at: Timestamp,
}

pub struct TokenService<'a> {
    store: &'a dyn Store,
    config: &'a JwtConfig,
}

impl<'a> TokenService<'a> {
    pub fn new(store: &'a dyn Store, config: &'a JwtConfig) -> Self {
        Self { store, config }
    }

    /// Sign a token embedding the profile's current privilege flags.
    fn sign(&self, profile: &UserProfile) -> CoreResult<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + Duration::minutes(self.config.token_expiry_mins);
        let mut claims = ClaimSet {
            sub: profile.id,
            login: profile.login.clone(),
            email: profile.email.clone(),
            privilege_id: profile.privilege_id,
            privilege_name: profile.privilege_name.clone(),
            view_locks: false,
            view_users: false,
            view_logs: false,
            edit_locks: false,
            edit_users: false,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        claims.set_flags(profile.flags());

        let token = encode_token(&claims, self.config)
            .map_err(|e| CoreError::Internal(format!("Token generation error: {e}")))?;
        Ok(IssuedToken {
            token,
            claims,
            expires_at,
        })
    }

    fn stored(issued: &IssuedToken) -> StoredToken {
        StoredToken {
            token_hash: hash_token(&issued.token),
            expires_at: issued.expires_at,
        }
    }

    /// Issue a token and make it the user's authoritative one.
    pub async fn issue(&self, profile: &UserProfile) -> CoreResult<IssuedToken> {
        let issued = self.sign(profile)?;
        if !self.store.store_token(profile.id, &Self::stored(&issued)).await? {
            return Err(CoreError::not_found("User", profile.id));
        }
        tracing::debug!(user_id = profile.id, jti = %issued.claims.jti, "Token issued");
        Ok(issued)
    }

    /// Signature and embedded expiry only; no store access.
    pub fn verify(&self, token: &str) -> CoreResult<ClaimSet> {
        decode_token(token, self.config)
    }

    /// Whether `token` is the one stored for `user_id` and the stored expiry
    /// has not passed.
    pub async fn verify_against_store(&self, user_id: DbId, token: &str) -> CoreResult<bool> {
        let Some(user) = self.store.user_by_id(user_id).await? else {
            return Ok(false);
        };
        Ok(user.stored_token().is_some_and(|stored| {
            stored.token_hash == hash_token(token) && stored.expires_at > Utc::now()
        }))
    }

    /// Full check applied to every authenticated request.
    pub async fn authenticate(&self, token: &str) -> CoreResult<ClaimSet> {
        let claims = self.verify(token)?;
        if !self.verify_against_store(claims.sub, token).await? {
            return Err(CoreError::Unauthorized(
                "Token has been revoked or superseded".into(),
            ));
        }
        Ok(claims)
    }

    /// Exchange the user's current token for a new one.
    ///
    /// The embedded and stored expiries are ignored, but the presented token
    /// must still be the stored one. The privilege is re-resolved, so flag
    /// changes take effect here.
    pub async fn refresh(&self, old_token: &str) -> CoreResult<(UserProfile, IssuedToken)> {
        let invalid = || CoreError::Unauthorized("Invalid token".into());

        let old_claims = decode_token_ignoring_expiry(old_token, self.config)?;
        let profile = self
            .store
            .user_profile(old_claims.sub)
            .await?
            .ok_or_else(invalid)?;

        let issued = self.sign(&profile)?;
        let swapped = self
            .store
            .swap_token(profile.id, &hash_token(old_token), &Self::stored(&issued))
            .await?;
        if !swapped {
            tracing::info!(user_id = profile.id, "Refresh rejected for non-current token");
            return Err(invalid());
        }
        Ok((profile, issued))
    }

    /// Clear the stored token (logout).
    pub async fn revoke(&self, user_id: DbId) -> CoreResult<()> {
        self.store.clear_token(user_id).await?;
        Ok(())
    }
}

//! HS256 encoding and decoding of access tokens.
//!
//! The payload is the fixed [`ClaimSet`]. Only the SHA-256 digest of an
//! issued token is persisted, so a database leak does not expose live tokens.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use seclock_core::claims::ClaimSet;
use seclock_core::error::CoreError;
use sha2::{Digest, Sha256};

use crate::config::{parse_env, ConfigError};

/// Default token lifetime in minutes.
pub const DEFAULT_TOKEN_EXPIRY_MINS: i64 = 60;

/// Configuration for token signing and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Token lifetime in minutes (default: 60).
    pub token_expiry_mins: i64,
}

impl JwtConfig {
    /// Load from `JWT_SECRET` (required, non-empty) and `TOKEN_EXPIRY_MINS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let token_expiry_mins = parse_env("TOKEN_EXPIRY_MINS", DEFAULT_TOKEN_EXPIRY_MINS)?;
        Ok(Self {
            secret,
            token_expiry_mins,
        })
    }
}

pub fn encode_token(
    claims: &ClaimSet,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(), // HS256
        claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate signature and expiry, returning the embedded claims.
pub fn decode_token(token: &str, config: &JwtConfig) -> Result<ClaimSet, CoreError> {
    decode_with(token, config, Validation::default())
}

/// Validate the signature only; an expired token still decodes.
pub fn decode_token_ignoring_expiry(token: &str, config: &JwtConfig) -> Result<ClaimSet, CoreError> {
    let mut validation = Validation::default();
    validation.validate_exp = false;
    decode_with(token, config, validation)
}

fn decode_with(token: &str, config: &JwtConfig, validation: Validation) -> Result<ClaimSet, CoreError> {
    decode::<ClaimSet>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|err| match err.kind() {
        ErrorKind::ExpiredSignature => CoreError::TokenExpired,
        _ => CoreError::Unauthorized("Invalid token".into()),
    })
}

/// Compute the SHA-256 hex digest stored in place of a token.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

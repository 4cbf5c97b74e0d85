//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- HS256 encoding/decoding of [`ClaimSet`](seclock_core::claims::ClaimSet) tokens.
//! - [`tokens`] -- token lifecycle against the store (issue, verify, refresh, revoke).
//! - [`credentials`] -- account creation and login credential checks.

pub mod credentials;
pub mod jwt;
pub mod password;
pub mod tokens;

//! Authorization checks against the claim snapshot.
//!
//! These are pure lookups: no storage is consulted. Token validity (signature,
//! stored-token match, expiry) is established before a claim set reaches here.

use crate::claims::ClaimSet;
use crate::error::{CoreError, CoreResult};
use crate::privileges::Capability;
use crate::types::DbId;

/// How a caller was granted access to a per-user resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The caller is the resource owner.
    SelfAccess,
    /// The caller holds the named capability.
    Capability(Capability),
}

pub fn require_capability(claims: &ClaimSet, capability: Capability) -> CoreResult<()> {
    if claims.flags().grants(capability) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "Missing required capability: {capability}"
        )))
    }
}

/// Self-access is evaluated first; otherwise `capability` is required.
pub fn require_self_or_capability(
    claims: &ClaimSet,
    target: DbId,
    capability: Capability,
) -> CoreResult<Access> {
    if claims.sub == target {
        return Ok(Access::SelfAccess);
    }
    require_capability(claims, capability).map(|()| Access::Capability(capability))
}

//! Time-bounded cache of the privilege name -> flags mapping.
//!
//! The cache itself is synchronous and storage-agnostic; the owner decides
//! when to reload it (on access when stale, or after a privilege mutation).

use std::collections::BTreeMap;

use crate::privileges::PrivilegeFlags;
use crate::types::Timestamp;

/// Default time-to-live for cached rights.
pub const DEFAULT_TTL_SECS: i64 = 300;

#[derive(Debug, Clone)]
pub struct PrivilegeCache {
    entries: BTreeMap<String, PrivilegeFlags>,
    refreshed_at: Option<Timestamp>,
    ttl: chrono::Duration,
}

impl PrivilegeCache {
    pub fn new(ttl: chrono::Duration) -> Self {
        Self {
            entries: BTreeMap::new(),
            refreshed_at: None,
            ttl,
        }
    }

    /// Never loaded, invalidated, or older than the TTL.
    pub fn is_stale(&self, now: Timestamp) -> bool {
        match self.refreshed_at {
            None => true,
            Some(at) => now - at >= self.ttl,
        }
    }

    pub fn entries(&self) -> &BTreeMap<String, PrivilegeFlags> {
        &self.entries
    }

    pub fn replace<I>(&mut self, entries: I, now: Timestamp)
    where
        I: IntoIterator<Item = (String, PrivilegeFlags)>,
    {
        self.entries = entries.into_iter().collect();
        self.refreshed_at = Some(now);
    }

    pub fn invalidate(&mut self) {
        self.refreshed_at = None;
    }
}

impl Default for PrivilegeCache {
    fn default() -> Self {
        Self::new(chrono::Duration::seconds(DEFAULT_TTL_SECS))
    }
}

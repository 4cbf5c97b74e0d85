//! Shared query parameter types for API handlers.

use seclock_core::audit::{parse_kind_filter, LogStream};
use seclock_core::pagination::PageRequest;
use serde::Deserialize;

/// Pagination parameters (`?page=&limit=`).
///
/// Kept as raw strings so oversized numbers clamp instead of rejecting;
/// see [`PageRequest::from_raw`].
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageParams {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::from_raw(self.page.as_deref(), self.limit.as_deref())
    }
}

/// Log listing parameters (`?page=&limit=&actions=1,2`).
#[derive(Debug, Default, Deserialize)]
pub struct LogQueryParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    /// Comma-separated action kind ids.
    pub actions: Option<String>,
}

impl LogQueryParams {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::from_raw(self.page.as_deref(), self.limit.as_deref())
    }

    pub fn kinds(&self, stream: LogStream) -> Vec<i16> {
        parse_kind_filter(self.actions.as_deref(), stream)
    }
}

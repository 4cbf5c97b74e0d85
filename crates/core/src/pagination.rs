//! Page/size clamping and the paginated result envelope for log queries.

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE: i64 = 1023;
pub const MAX_PAGE_SIZE: i64 = 1023;

/// A 1-based page request with both values clamped to `[1, 1023]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, size: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).clamp(1, MAX_PAGE),
            size: size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Build a request from raw query-string values.
    ///
    /// Integers beyond `i64` saturate before clamping; anything that is not
    /// an integer falls back to the default.
    pub fn from_raw(page: Option<&str>, size: Option<&str>) -> Self {
        Self::new(page.and_then(parse_saturating), size.and_then(parse_saturating))
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.size
    }

    /// `ceil(total / size)`; zero when there are no rows.
    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            0
        } else {
            (total + self.size - 1) / self.size
        }
    }
}

fn parse_saturating(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<i64>() {
        return Some(value);
    }
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(if negative { i64::MIN } else { i64::MAX })
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results plus the totals needed to render a pager.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub entries: Vec<T>,
    pub total_pages: i64,
    pub total_count: i64,
    pub current_page: i64,
}

impl<T> Page<T> {
    pub fn new(entries: Vec<T>, total_count: i64, request: PageRequest) -> Self {
        Self {
            entries,
            total_pages: request.total_pages(total_count),
            total_count,
            current_page: request.page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let req = PageRequest::default();
        assert_eq!(req, PageRequest { page: 1, size: 50 });
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn values_are_clamped() {
        assert_eq!(PageRequest::new(Some(0), Some(0)), PageRequest { page: 1, size: 1 });
        assert_eq!(
            PageRequest::new(Some(5000), Some(-3)),
            PageRequest { page: 1023, size: 1 }
        );
        assert_eq!(PageRequest::new(None, Some(2000)).size, 1023);
    }

    #[test]
    fn raw_values_saturate_or_fall_back() {
        assert_eq!(
            PageRequest::from_raw(Some("99999999999999999999"), Some("5000")),
            PageRequest { page: 1023, size: 1023 }
        );
        assert_eq!(
            PageRequest::from_raw(Some("-99999999999999999999"), Some(" 7 ")),
            PageRequest { page: 1, size: 7 }
        );
        assert_eq!(PageRequest::from_raw(Some("abc"), Some("")), PageRequest::default());
        assert_eq!(PageRequest::from_raw(Some("2.5"), None), PageRequest::default());
    }

    #[test]
    fn offset_and_total_pages() {
        let req = PageRequest::new(Some(3), Some(10));
        assert_eq!(req.offset(), 20);
        assert_eq!(req.total_pages(0), 0);
        assert_eq!(req.total_pages(10), 1);
        assert_eq!(req.total_pages(21), 3);
    }

    #[test]
    fn page_envelope_reports_current_page() {
        let page = Page::new(vec![1, 2], 12, PageRequest::new(Some(2), Some(5)));
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.total_count, 12);
    }
}

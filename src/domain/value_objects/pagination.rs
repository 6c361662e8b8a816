//! Offset pagination.
//!
//! `page` is 1-based. Metadata is derived from the total match count:
//! `totalPages = ceil(total / limit)`, `hasNext = page < totalPages`,
//! `hasPrev = page > 1`.

use serde::Serialize;

use crate::shared::validation::FieldErrors;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Validate raw query parameters, recording out-of-range values.
    pub fn parse(page: Option<i64>, limit: Option<i64>, errors: &mut FieldErrors) -> Self {
        let page = match page {
            None => DEFAULT_PAGE,
            Some(p) if p >= 1 && p <= u32::MAX as i64 => p as u32,
            Some(p) => {
                errors.add("page", "page must be a positive integer", p);
                DEFAULT_PAGE
            }
        };
        let limit = match limit {
            None => DEFAULT_LIMIT,
            Some(l) if (1..=MAX_LIMIT as i64).contains(&l) => l as u32,
            Some(l) => {
                errors.add("limit", format!("limit must be between 1 and {}", MAX_LIMIT), l);
                DEFAULT_LIMIT
            }
        };
        Self { page, limit }
    }

    /// Number of documents to skip.
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// One page of results plus the total number of matches.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }
}

/// Pagination metadata returned with every list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageMeta {
    pub fn new(request: PageRequest, total: u64) -> Self {
        let total_pages = total.div_ceil(request.limit as u64);
        Self {
            page: request.page,
            limit: request.limit,
            total,
            total_pages,
            has_next: (request.page as u64) < total_pages,
            has_prev: request.page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(0, 10, 0 ; "empty dataset")]
    #[test_case(1, 10, 1 ; "single item")]
    #[test_case(10, 10, 1 ; "exactly one page")]
    #[test_case(11, 10, 2 ; "one over")]
    #[test_case(250, 100, 3 ; "max limit")]
    #[test_case(7, 1, 7 ; "limit one")]
    fn test_total_pages_is_ceiling(total: u64, limit: u32, expected: u64) {
        let meta = PageMeta::new(PageRequest { page: 1, limit }, total);
        assert_eq!(meta.total_pages, expected);
    }

    #[test_case(1, 3, true, false)]
    #[test_case(2, 3, true, true)]
    #[test_case(3, 3, false, true)]
    #[test_case(4, 3, false, true ; "past the end")]
    fn test_has_next_and_prev(page: u32, total_pages: u64, has_next: bool, has_prev: bool) {
        let meta = PageMeta::new(PageRequest { page, limit: 10 }, total_pages * 10);
        assert_eq!(meta.has_next, has_next);
        assert_eq!(meta.has_prev, has_prev);
    }

    #[test]
    fn test_defaults_when_absent() {
        let mut errors = FieldErrors::new();
        let request = PageRequest::parse(None, None, &mut errors);
        assert!(errors.is_empty());
        assert_eq!(request, PageRequest { page: 1, limit: 10 });
        assert_eq!(request.offset(), 0);
    }

    #[test_case(Some(0), None, "page")]
    #[test_case(Some(-2), None, "page")]
    #[test_case(None, Some(0), "limit")]
    #[test_case(None, Some(101), "limit")]
    fn test_out_of_range_is_rejected(page: Option<i64>, limit: Option<i64>, field: &str) {
        let mut errors = FieldErrors::new();
        PageRequest::parse(page, limit, &mut errors);
        assert!(errors.has(field));
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest { page: 3, limit: 25 }.offset(), 50);
    }

    #[test]
    fn test_meta_serializes_camel_case() {
        let json = serde_json::to_value(PageMeta::new(PageRequest::default(), 21)).unwrap();
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["hasNext"], true);
        assert_eq!(json["hasPrev"], false);
    }
}

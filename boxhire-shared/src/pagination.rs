//! Page/limit handling for list endpoints
//!
//! Out-of-range values are clamped rather than rejected: `page` is at least 1
//! and `limit` lies in `1..=MAX_LIMIT`.

use serde::{Deserialize, Serialize};

/// Largest page size any list endpoint will return
pub const MAX_LIMIT: i64 = 100;

/// Normalised paging request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    /// Builds a pagination from raw query values.
    ///
    /// Missing values fall back to page 1 and `default_limit`.
    pub fn new(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(default_limit).clamp(1, MAX_LIMIT),
        }
    }

    /// Rows to skip before this page
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Page metadata for a result set of `total` rows
    pub fn info(&self, total: i64) -> PageInfo {
        PageInfo {
            page: self.page,
            limit: self.limit,
            total,
            pages: page_count(total, self.limit),
        }
    }
}

/// `pagination` object returned next to every paged list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

/// `ceil(total / limit)`, zero for an empty result
pub fn page_count(total: i64, limit: i64) -> i64 {
    if total <= 0 || limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

/// Sort direction, parsed case-insensitively
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Parses `asc`/`desc` in any case; anything else yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ASC" => Some(SortOrder::Asc),
            "DESC" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = Pagination::new(None, None, 20);
        assert_eq!(p, Pagination { page: 1, limit: 20 });
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_clamping() {
        assert_eq!(Pagination::new(Some(0), Some(0), 20), Pagination { page: 1, limit: 1 });
        assert_eq!(Pagination::new(Some(-4), Some(500), 20), Pagination { page: 1, limit: 100 });
    }

    #[test]
    fn test_offset() {
        assert_eq!(Pagination::new(Some(3), Some(10), 20).offset(), 20);
        assert_eq!(Pagination::new(Some(2), Some(7), 20).offset(), 7);
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 20), 0);
        assert_eq!(page_count(1, 20), 1);
        assert_eq!(page_count(20, 20), 1);
        assert_eq!(page_count(21, 20), 2);
        assert_eq!(page_count(12, 5), 3);
    }

    #[test]
    fn test_info_serializes_camel_case() {
        let info = Pagination::new(Some(2), Some(5), 20).info(12);
        assert_eq!(info.pages, 3);
        let json = serde_json::to_value(info).unwrap();
        assert_eq!(json["page"], 2);
        assert_eq!(json["total"], 12);
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!(SortOrder::parse("desc"), Some(SortOrder::Desc));
        assert_eq!(SortOrder::parse("ASC"), Some(SortOrder::Asc));
        assert_eq!(SortOrder::parse("DeSc"), Some(SortOrder::Desc));
        assert_eq!(SortOrder::parse("sideways"), None);
    }
}

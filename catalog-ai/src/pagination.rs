//! Pagination utilities for catalog-ai
//!
//! Paging parameters are never rejected: values below 1 are raised to 1,
//! page sizes are capped at [`MAX_LIMIT`] and page numbers at [`MAX_PAGE`].

/// Default page size for listings
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest page size served
pub const MAX_LIMIT: i64 = 500;

/// Largest page number served; keeps `offset()` within `i64`
pub const MAX_PAGE: i64 = i64::MAX / MAX_LIMIT;

/// Sanitized page/limit pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Page size
    pub limit: i64,
}

impl Pagination {
    /// Clamp a requested page and limit into the served range
    ///
    /// # Examples
    /// ```
    /// use catalog_ai::pagination::{Pagination, MAX_LIMIT};
    ///
    /// let p = Pagination::new(Some(0), Some(100_000));
    /// assert_eq!(p.page, 1);
    /// assert_eq!(p.limit, MAX_LIMIT);
    /// ```
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).clamp(1, MAX_PAGE),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    /// Parse raw query-string values; unparseable values use the defaults
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        let parse = |v: Option<&str>| v.and_then(|s| s.trim().parse::<i64>().ok());
        Self::new(parse(page), parse(limit))
    }

    /// Offset for SQL LIMIT/OFFSET
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    /// Number of pages needed for `total` results
    pub fn total_pages(&self, total: i64) -> i64 {
        (total + self.limit - 1) / self.limit
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

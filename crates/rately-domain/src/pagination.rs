//! Page-based pagination.
//!
//! Requests carry a 1-based `page` and a `limit` (page size); responses
//! carry a [`PageInfo`] block with the total row count and page count.
//! Parsing is lenient: anything that is not a positive integer falls back
//! to the default instead of failing the request.

use serde::Serialize;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Which slice of a collection the client asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: DEFAULT_PAGE, limit: DEFAULT_LIMIT }
    }
}

impl PageRequest {
    /// Builds a request from raw query parameter values.
    ///
    /// Missing, non-numeric, zero or negative values fall back to the
    /// defaults; an oversized limit is clamped to [`MAX_LIMIT`].
    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: parse_positive(page).unwrap_or(DEFAULT_PAGE),
            limit: parse_positive(limit).unwrap_or(DEFAULT_LIMIT),
        }
        .clamped()
    }

    pub fn clamped(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, MAX_LIMIT),
        }
    }

    /// Row offset of the first item on this page.
    pub fn offset(self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

fn parse_positive(value: Option<&str>) -> Option<u32> {
    value
        .map(str::trim)
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|v| *v > 0)
}

/// Pagination block returned alongside every collection response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

impl PageInfo {
    pub fn new(request: PageRequest, total: u64) -> Self {
        Self {
            page: request.page,
            limit: request.limit,
            total,
            pages: total.div_ceil(u64::from(request.limit)),
        }
    }
}

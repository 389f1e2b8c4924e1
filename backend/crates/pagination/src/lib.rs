//! Page-number pagination primitives shared by listing endpoints.
//!
//! Listing endpoints accept `page` and `limit` query parameters and answer with
//! a `pagination` object describing the neighbouring pages. This crate keeps
//! that arithmetic in one place so every collection paginates identically.
//!
//! Raw query parameters are parsed leniently: a missing, non-numeric, or
//! non-positive value falls back to the default rather than failing the
//! request.
//!
//! # Examples
//!
//! ```
//! use pagination::{PageRequest, Pagination};
//!
//! let request = PageRequest::from_raw(Some("2"), Some("2"), 25);
//! let pagination = Pagination::for_total(request, 5);
//!
//! assert_eq!(request.offset(), 2);
//! assert_eq!(pagination.prev.map(|link| link.page), Some(1));
//! assert_eq!(pagination.next.map(|link| link.page), Some(3));
//! ```

use serde::{Deserialize, Serialize};

/// Page returned when the client does not ask for one.
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when neither the client nor the caller supplies one.
pub const DEFAULT_LIMIT: u32 = 25;

/// Validation failures raised by [`PageRequest::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// Pages are numbered from one.
    #[error("page must be at least 1")]
    ZeroPage,
    /// A page must hold at least one record.
    #[error("limit must be at least 1")]
    ZeroLimit,
}

/// A validated page-number request.
///
/// ## Invariants
/// - `page >= 1`
/// - `limit >= 1`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Build a request from already-parsed values.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] when either value is zero.
    pub const fn new(page: u32, limit: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::ZeroPage);
        }
        if limit == 0 {
            return Err(PageRequestError::ZeroLimit);
        }
        Ok(Self { page, limit })
    }

    /// Parse raw query-string values, falling back to defaults for anything
    /// missing, non-numeric, or not strictly positive.
    ///
    /// A `default_limit` of zero is treated as [`DEFAULT_LIMIT`].
    #[must_use]
    pub fn from_raw(page: Option<&str>, limit: Option<&str>, default_limit: u32) -> Self {
        let fallback_limit = if default_limit == 0 {
            DEFAULT_LIMIT
        } else {
            default_limit
        };
        Self {
            page: parse_positive(page).unwrap_or(DEFAULT_PAGE),
            limit: parse_positive(limit).unwrap_or(fallback_limit),
        }
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of records on the page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of records to skip before the page starts.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Exclusive index of the last record on the page.
    #[must_use]
    pub fn end(&self) -> u64 {
        u64::from(self.page) * u64::from(self.limit)
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

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw.map(str::trim)
        .and_then(|value| value.parse::<u32>().ok())
        .filter(|value| *value > 0)
}

/// Descriptor pointing at a neighbouring page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    /// One-based page number.
    pub page: u32,
    /// Page size the link was computed with.
    pub limit: u32,
}

/// Neighbouring-page descriptors for a listing response.
///
/// Each side is present only when such a page exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// The following page, when more records remain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<PageLink>,
    /// The preceding page, when the request is past the first page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageLink>,
}

impl Pagination {
    /// Compute neighbouring pages for `request` given the total number of
    /// records matching the listing before pagination.
    #[must_use]
    pub fn for_total(request: PageRequest, total: u64) -> Self {
        let limit = request.limit();
        let next = (request.end() < total)
            .then(|| request.page().checked_add(1))
            .flatten()
            .map(|page| PageLink { page, limit });
        let prev = (request.page() > 1).then(|| PageLink {
            page: request.page() - 1,
            limit,
        });
        Self { next, prev }
    }

    /// Return `true` when neither neighbour exists.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.next.is_none() && self.prev.is_none()
    }
}

//! Pagination primitives
//!
//! Every list endpoint shares the same contract: a 1-based page number
//! and a page size produce a stable slice plus totals computed from the
//! filter alone.

use serde::{Deserialize, Serialize};

/// Upper bound on page size; larger requests are clamped, not rejected.
pub const MAX_PAGE_SIZE: i64 = 100;
const DEFAULT_PAGE_SIZE: i64 = 10;

/// Raw pagination query parameters, validated into a [`PageRequest`].
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// A validated pagination request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: i64,
    /// Page size (1..=MAX_PAGE_SIZE)
    pub limit: i64,
}

impl PageRequest {
    /// Validate raw query parameters.
    ///
    /// Missing values fall back to page 1 / limit 10. A page or limit
    /// of zero or less is a caller error, not something to silently
    /// correct.
    pub fn from_params(params: &PageParams) -> Result<Self, crate::error::AppError> {
        let page = params.page.unwrap_or(1);
        let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE);

        if page <= 0 {
            return Err(crate::error::AppError::Validation(
                "page must be a positive integer".to_string(),
            ));
        }
        if limit <= 0 {
            return Err(crate::error::AppError::Validation(
                "limit must be a positive integer".to_string(),
            ));
        }

        Ok(Self {
            page,
            limit: limit.min(MAX_PAGE_SIZE),
        })
    }

    /// Rows to skip: `(page - 1) * limit`
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

impl TryFrom<&PageParams> for PageRequest {
    type Error = crate::error::AppError;

    fn try_from(params: &PageParams) -> Result<Self, Self::Error> {
        Self::from_params(params)
    }
}

/// One page of results plus totals
///
/// `total_items` reflects the filter alone, independent of paging.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total_items: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    /// Assemble a page from a slice of items and the filter-only total.
    pub fn new(items: Vec<T>, request: PageRequest, total_items: i64) -> Self {
        Self {
            items,
            page: request.page,
            limit: request.limit,
            total_items,
            // ceil(total_items / limit) without floating point
            total_pages: (total_items + request.limit - 1) / request.limit,
        }
    }

    /// Map item type while keeping the paging envelope.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

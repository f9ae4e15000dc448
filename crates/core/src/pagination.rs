//! Pagination parameters and the `{ items, pagination }` list envelope.
//!
//! Every list endpoint accepts `page` / `page_size` query parameters and
//! returns a [`Page`] of items. Page is floored at 1, page_size is
//! clamped to 1..=100 with a default of 20.

use serde::{Deserialize, Serialize};

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Hard upper bound on page size.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Raw `page` / `page_size` query parameters as sent by the client.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageParams {
    /// Clamp raw parameters into an effective page and page size.
    pub fn clamp(self) -> (i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let page_size = self
            .page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        (page, page_size)
    }

    /// Number of rows to skip for the effective page.
    pub fn offset(self) -> i64 {
        let (page, page_size) = self.clamp();
        (page - 1) * page_size
    }

    /// Number of rows to fetch.
    pub fn limit(self) -> i64 {
        self.clamp().1
    }
}

/// Pagination metadata echoed back alongside list items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    /// Build metadata from the effective params and a total row count.
    pub fn new(params: PageParams, total: i64) -> Self {
        let (page, page_size) = params.clamp();
        Self {
            page,
            page_size,
            total,
            // Ceiling division; page_size is clamped to >= 1 and total is a
            // row count, so this cannot divide by zero or overflow.
            total_pages: (total + page_size - 1) / page_size,
        }
    }
}

/// Standard list response envelope: `{ "items": [...], "pagination": {...} }`.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, params: PageParams, total: i64) -> Self {
        Self {
            items,
            pagination: Pagination::new(params, total),
        }
    }
}

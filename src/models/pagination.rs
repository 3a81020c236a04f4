//! Pagination query parameters and paged response envelope.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;

/// Pagination parameters as they arrive in the query string.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct PageParams {
    /// 1-based page index
    pub page: Option<u32>,
    /// items per page
    pub per_page: Option<u32>,
}

/// Normalized pagination window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Pagination {
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl From<PageParams> for Pagination {
    /// Clamp to sane defaults: page 0 becomes 1, per_page lands in 1..=100.
    fn from(p: PageParams) -> Self {
        let page = p.page.filter(|&p| p > 0).unwrap_or(1);
        let per_page = p.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
        Self { page, per_page }
    }
}

#[derive(Debug, Serialize)]
pub struct PageMeta {
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub total_pages: i64,
}

/// `{"data": [...], "meta": {...}}`
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, pagination: Pagination, total: i64) -> Self {
        let per_page = i64::from(pagination.per_page);
        let total_pages = if total <= 0 {
            0
        } else {
            (total + per_page - 1) / per_page
        };
        Self {
            data,
            meta: PageMeta {
                page: pagination.page,
                per_page: pagination.per_page,
                total,
                total_pages,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_page_and_per_page_are_clamped() {
        let p = Pagination::from(PageParams {
            page: Some(0),
            per_page: Some(0),
        });
        assert_eq!(p, Pagination { page: 1, per_page: 1 });
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn per_page_upper_bound() {
        let p = Pagination::from(PageParams {
            page: Some(5),
            per_page: Some(1000),
        });
        assert_eq!(p.per_page, 100);
        assert_eq!(p.offset(), 400);
        assert_eq!(p.limit(), 100);
    }

    #[test]
    fn defaults_when_absent() {
        assert_eq!(Pagination::from(PageParams::default()), Pagination::default());
    }

    #[test]
    fn total_pages_rounds_up() {
        let p = Pagination { page: 1, per_page: 20 };
        assert_eq!(Page::<()>::new(vec![], p, 0).meta.total_pages, 0);
        assert_eq!(Page::<()>::new(vec![], p, 20).meta.total_pages, 1);
        assert_eq!(Page::<()>::new(vec![], p, 21).meta.total_pages, 2);
        assert_eq!(Page::<()>::new(vec![], p, 42).meta.total_pages, 3);
    }
}

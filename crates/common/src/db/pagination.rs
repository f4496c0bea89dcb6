//! Page arithmetic and the list response envelope

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, Result};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 20;
pub const MAX_LIMIT: u64 = 100;

/// A validated page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl PageRequest {
    /// Build from optional query values, applying defaults and bounds
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Result<Self> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let limit = limit.unwrap_or(DEFAULT_LIMIT);

        if page < 1 {
            return Err(AppError::validation("page", "Page must be >= 1"));
        }
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(AppError::validation("limit", format!("Limit must be 1-{}", MAX_LIMIT)));
        }

        Ok(Self { page, limit })
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Rows to skip before this page
    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: DEFAULT_PAGE, limit: DEFAULT_LIMIT }
    }
}

/// Pagination block of a list response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: u64) -> Self {
        Self {
            page: request.page,
            limit: request.limit,
            total,
            pages: total.div_ceil(request.limit),
        }
    }
}

/// `{ data, pagination }` envelope shared by every paginated list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            data,
            pagination: Pagination::new(request, total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let request = PageRequest::new(None, None).unwrap();
        assert_eq!(request, PageRequest::default());
        assert_eq!(request.page(), 1);
        assert_eq!(request.limit(), 20);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn test_offset_follows_page_and_limit() {
        for (page, limit) in [(1, 1), (2, 20), (7, 15), (3, 100)] {
            let request = PageRequest::new(Some(page), Some(limit)).unwrap();
            assert_eq!(request.offset(), (page - 1) * limit);
        }
    }

    #[test]
    fn test_bounds() {
        assert!(PageRequest::new(Some(0), None).is_err());
        assert!(PageRequest::new(None, Some(0)).is_err());
        assert!(PageRequest::new(None, Some(101)).is_err());
        assert!(PageRequest::new(None, Some(100)).is_ok());
    }

    #[test]
    fn test_page_count_rounds_up() {
        let request = PageRequest::new(Some(1), Some(20)).unwrap();
        assert_eq!(Pagination::new(request, 0).pages, 0);
        assert_eq!(Pagination::new(request, 1).pages, 1);
        assert_eq!(Pagination::new(request, 20).pages, 1);
        assert_eq!(Pagination::new(request, 41).pages, 3);
    }

    #[test]
    fn test_envelope_shape() {
        let request = PageRequest::new(Some(2), Some(10)).unwrap();
        let page = Paginated::new(vec![1, 2, 3], request, 13);
        let json = serde_json::to_value(&page).unwrap();

        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
        assert_eq!(json["pagination"]["page"], 2);
        assert_eq!(json["pagination"]["limit"], 10);
        assert_eq!(json["pagination"]["total"], 13);
        assert_eq!(json["pagination"]["pages"], 2);
    }
}

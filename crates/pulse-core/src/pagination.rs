//! Pagination types for list queries and API responses

use serde::{Deserialize, Serialize};

/// Pagination parameters (from query string)
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Items per page
    #[serde(default = "default_page_size")]
    pub page_size: i64,

    /// Offset into the result set
    #[serde(default)]
    pub offset: i64,
}

fn default_page_size() -> i64 {
    20
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            offset: 0,
        }
    }
}

impl Pagination {
    pub fn new(page_size: i64, offset: i64) -> Self {
        Self {
            page_size: page_size.clamp(1, 500),
            offset: offset.max(0),
        }
    }

    pub fn page(page: i64, per_page: i64) -> Self {
        Self::new(per_page, (page.max(1) - 1) * per_page)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

/// Query result with pagination metadata
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page_size: i64,
    pub offset: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, pagination: Pagination) -> Self {
        Self {
            items,
            total,
            page_size: pagination.page_size,
            offset: pagination.offset,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page_size: self.page_size,
            offset: self.offset,
        }
    }

    pub fn total_pages(&self) -> i64 {
        if self.page_size == 0 {
            1
        } else {
            (self.total + self.page_size - 1) / self.page_size
        }
    }

    pub fn has_next(&self) -> bool {
        self.offset + self.page_size < self.total
    }

    pub fn has_prev(&self) -> bool {
        self.offset > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_default() {
        let p = Pagination::default();
        assert_eq!(p.page_size, 20);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn test_pagination_page() {
        let p = Pagination::page(3, 10);
        assert_eq!(p.limit(), 10);
        assert_eq!(p.offset, 20);
    }

    #[test]
    fn test_pagination_clamps() {
        let p = Pagination::new(10_000, -5);
        assert_eq!(p.page_size, 500);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn test_paginated_metadata() {
        let result = Paginated::new(vec![1, 2, 3, 4, 5], 50, Pagination::page(2, 5));
        assert_eq!(result.total_pages(), 10);
        assert!(result.has_next());
        assert!(result.has_prev());
    }

    #[test]
    fn test_paginated_map() {
        let result = Paginated::new(vec![1, 2], 2, Pagination::default()).map(|n| n * 2);
        assert_eq!(result.items, vec![2, 4]);
        assert_eq!(result.total, 2);
    }
}

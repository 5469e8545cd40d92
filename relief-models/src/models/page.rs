//! Pagination request and response envelope.

use serde::{Deserialize, Serialize};

use relief_core::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// One-based page request. Out-of-range values are clamped, not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a request, clamping page to at least 1 and limit to 1..=MAX_PAGE_SIZE.
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Index of the first item on this page.
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// A page of results plus the totals needed to render pagers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

impl<T: Clone> Page<T> {
    /// Slice `all` according to `req`.
    pub fn from_slice(all: &[T], req: PageRequest) -> Self {
        let total = all.len();
        let items = all
            .iter()
            .skip(req.offset())
            .take(req.limit)
            .cloned()
            .collect();
        Self {
            items,
            total,
            page: req.page,
            limit: req.limit,
            total_pages: total.div_ceil(req.limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamping() {
        let req = PageRequest::new(0, 1000);
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, MAX_PAGE_SIZE);
        assert_eq!(PageRequest::new(3, 0).limit, 1);
    }

    #[test]
    fn test_from_slice() {
        let all: Vec<u32> = (1..=25).collect();
        let page = Page::from_slice(&all, PageRequest::new(3, 10));
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);

        let beyond = Page::from_slice(&all, PageRequest::new(9, 10));
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 25);
    }

    #[test]
    fn test_empty() {
        let page = Page::<u32>::from_slice(&[], PageRequest::default());
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }
}

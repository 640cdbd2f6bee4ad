//! Page/limit handling shared by the pitch listing and the leaderboard.

use crate::MAX_PAGE_LIMIT;
use serde::Serialize;

/// A 1-indexed page request. Always holds `page >= 1` and `limit >= 1`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Pagination {
    /// Build a page request, clamping out-of-range values instead of failing.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Build a page request from raw query parameters.
    /// Missing values fall back to page 1 and `default_limit`; non-positive values clamp to 1.
    /// Requested limits above `MAX_PAGE_LIMIT` are cut down to it.
    pub fn from_query(page: Option<i64>, limit: Option<i64>, default_limit: u32) -> Self {
        let page = page.map_or(1, clamp_to_u32);
        let limit = limit.map_or(default_limit, clamp_to_u32);
        Self::new(page, limit.min(MAX_PAGE_LIMIT))
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Index of the first item on this page.
    pub fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.limit as usize)
    }

    /// `ceil(total / limit)`. Zero items means zero pages.
    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.limit as usize)
    }

    /// Cut this page out of a fully sorted list.
    pub fn paginate<T>(&self, items: Vec<T>) -> Page<T> {
        let total = items.len();
        let items: Vec<T> = items
            .into_iter()
            .skip(self.offset())
            .take(self.limit as usize)
            .collect();
        Page {
            items,
            total_pages: self.total_pages(total),
            current_page: self.page,
            total,
        }
    }
}

fn clamp_to_u32(value: i64) -> u32 {
    u32::try_from(value.max(1)).unwrap_or(u32::MAX)
}

/// One page of results plus the totals needed to render a pager.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: usize,
    pub current_page: u32,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_from_query_defaults() {
        let p = Pagination::from_query(None, None, 20);
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 20);
    }

    #[test_log::test]
    fn test_from_query_clamps_non_positive() {
        let p = Pagination::from_query(Some(0), Some(-5), 20);
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 1);

        let p = Pagination::from_query(Some(-3), Some(0), 10);
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 1);
    }

    #[test_log::test]
    fn test_limit_is_capped() {
        let p = Pagination::from_query(Some(2), Some(10_000), 20);
        assert_eq!(p.limit(), MAX_PAGE_LIMIT);
        let p = Pagination::from_query(Some(i64::MAX), None, 20);
        assert_eq!(p.page(), u32::MAX);
    }

    #[test_log::test]
    fn test_new_keeps_large_limit() {
        let p = Pagination::new(1, 200);
        assert_eq!(p.limit(), 200);
        let result = p.paginate((0..150).collect::<Vec<u32>>());
        assert_eq!(result.items.len(), 150);
        assert_eq!(result.total_pages, 1);

        let p = Pagination::new(0, 0);
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 1);
    }

    #[test_log::test]
    fn test_total_pages_is_ceiling() {
        let p = Pagination::new(1, 3);
        assert_eq!(p.total_pages(0), 0);
        assert_eq!(p.total_pages(1), 1);
        assert_eq!(p.total_pages(3), 1);
        assert_eq!(p.total_pages(4), 2);
        assert_eq!(p.total_pages(9), 3);
    }

    #[test_log::test]
    fn test_pages_concatenate_to_full_list() {
        let items: Vec<u32> = (0..23).collect();
        let limit = 5;
        let total_pages = Pagination::new(1, limit).total_pages(items.len());
        assert_eq!(total_pages, 5);

        let mut rebuilt = Vec::new();
        for page in 1..=total_pages as u32 {
            let result = Pagination::new(page, limit).paginate(items.clone());
            assert_eq!(result.current_page, page);
            assert_eq!(result.total, 23);
            rebuilt.extend(result.items);
        }
        assert_eq!(rebuilt, items);
    }

    #[test_log::test]
    fn test_page_past_end_is_empty() {
        let result = Pagination::new(4, 10).paginate(vec![1, 2, 3]);
        assert!(result.items.is_empty());
        assert_eq!(result.total_pages, 1);
        assert_eq!(result.current_page, 4);
        assert_eq!(result.total, 3);
    }

    #[test_log::test]
    fn test_huge_page_does_not_overflow() {
        let result = Pagination::new(u32::MAX, MAX_PAGE_LIMIT).paginate(vec![1, 2, 3]);
        assert!(result.items.is_empty());
    }
}

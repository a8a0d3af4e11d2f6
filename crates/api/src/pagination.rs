//! Page-number pagination envelope.
//!
//! Every list endpoint returns pages of [`PAGE_SIZE`] rows wrapped in a
//! `{count, next, previous, results}` envelope, where `next`/`previous` are
//! page numbers (1-based) or null at the edges.

use serde::{Deserialize, Serialize};

/// Fixed page size for all list endpoints.
pub const PAGE_SIZE: i64 = 10;

/// Query parameter carrying the requested page number.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    /// 1-based page number; absent means the first page.
    pub page: Option<u32>,
}

impl PageQuery {
    /// The effective 1-based page number.
    #[must_use]
    pub fn number(self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Row offset for the effective page.
    #[must_use]
    pub fn offset(self) -> i64 {
        i64::from(self.number() - 1) * PAGE_SIZE
    }
}

/// A single page of results.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    /// Total number of rows matching the query, across all pages.
    pub count: i64,
    /// Next page number, if one exists.
    pub next: Option<u32>,
    /// Previous page number, if one exists.
    pub previous: Option<u32>,
    /// Rows for this page.
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Wrap `results` for page `number` out of a total of `count` rows.
    #[must_use]
    pub fn new(count: i64, number: u32, results: Vec<T>) -> Self {
        let has_next = i64::from(number) * PAGE_SIZE < count;
        Self {
            count,
            next: has_next.then(|| number + 1),
            previous: (number > 1).then(|| number - 1),
            results,
        }
    }

    /// Map each row of the page, keeping the envelope.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page_of_many() {
        let page = Page::new(25, 1, vec![0; 10]);
        assert_eq!(page.next, Some(2));
        assert_eq!(page.previous, None);
        assert_eq!(page.count, 25);
    }

    #[test]
    fn test_middle_page() {
        let page = Page::new(25, 2, vec![0; 10]);
        assert_eq!(page.next, Some(3));
        assert_eq!(page.previous, Some(1));
    }

    #[test]
    fn test_last_partial_page() {
        let page = Page::new(25, 3, vec![0; 5]);
        assert_eq!(page.next, None);
        assert_eq!(page.previous, Some(2));
    }

    #[test]
    fn test_exactly_one_page() {
        let page = Page::new(10, 1, vec![0; 10]);
        assert_eq!(page.next, None);
        assert_eq!(page.previous, None);
    }

    #[test]
    fn test_empty_result_set() {
        let page = Page::<i32>::new(0, 1, Vec::new());
        assert_eq!(page.next, None);
        assert_eq!(page.previous, None);
        assert_eq!(page.count, 0);
    }

    #[test]
    fn test_page_query_offsets() {
        assert_eq!(PageQuery { page: None }.offset(), 0);
        assert_eq!(PageQuery { page: Some(1) }.offset(), 0);
        assert_eq!(PageQuery { page: Some(3) }.offset(), 20);
        // Page 0 is clamped to the first page
        assert_eq!(PageQuery { page: Some(0) }.number(), 1);
    }
}

//! Paging of search results

use crate::db::Window;

/// Tires per result page
pub const PAGE_SIZE: i64 = 100;

/// Which slice of a search result a response carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page actually served
    pub page: i64,
    /// 0 when the search matched nothing
    pub total_pages: i64,
    /// Rows skipped before this page
    pub offset: i64,
}

/// Settle the page to serve for a search that matched `total_results` tires
///
/// Requests past the last page get the last page; requests below 1 get the
/// first. An empty result still reports page 1.
///
/// ```
/// use tiresearch_web::pagination::calculate_pagination;
///
/// let p = calculate_pagination(150, 7);
/// assert_eq!((p.page, p.total_pages, p.offset), (2, 2, 100));
/// ```
pub fn calculate_pagination(total_results: i64, requested_page: i64) -> Pagination {
    let total_pages = (total_results + PAGE_SIZE - 1) / PAGE_SIZE;
    let page = requested_page.clamp(1, total_pages.max(1));

    Pagination {
        page,
        total_pages,
        offset: (page - 1) * PAGE_SIZE,
    }
}

impl Pagination {
    /// LIMIT/OFFSET for the tire query
    pub fn window(&self) -> Window {
        Window {
            limit: PAGE_SIZE,
            offset: self.offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_of_a_search() {
        // (matched tires, requested page) -> (page, total_pages, offset)
        let cases = [
            ((1, 1), (1, 1, 0)),
            ((100, 1), (1, 1, 0)),
            ((101, 2), (2, 2, 100)),
            ((250, 3), (3, 3, 200)),
        ];
        for ((total, requested), expected) in cases {
            let p = calculate_pagination(total, requested);
            assert_eq!((p.page, p.total_pages, p.offset), expected, "{} tires", total);
        }
    }

    #[test]
    fn test_requested_page_is_clamped() {
        assert_eq!(calculate_pagination(150, 0).page, 1);
        assert_eq!(calculate_pagination(150, -4).page, 1);
        assert_eq!(calculate_pagination(150, 99).page, 2);
    }

    #[test]
    fn test_no_matches() {
        let p = calculate_pagination(0, 3);
        assert_eq!(p.page, 1);
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.window().offset, 0);
    }

    #[test]
    fn test_window_follows_page() {
        let w = calculate_pagination(250, 3).window();
        assert_eq!(w.limit, PAGE_SIZE);
        assert_eq!(w.offset, 200);
    }
}

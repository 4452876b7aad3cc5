use serde::Serialize;

/// Parse a raw `?page=` query value.
///
/// Anything that is not a positive integer yields page 1; clamping against
/// the last page happens in the repository once the page count is known.
pub fn requested_page(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1)
}

/// One page of results plus pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number actually served.
    pub number: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub per_page: u64,
}

impl<T> Page<T> {
    /// Total page count for an item count. An empty result set still has one
    /// (empty) page so out-of-range requests have something to clamp to.
    pub fn pages_for(total_items: u64, per_page: u64) -> u64 {
        total_items.div_ceil(per_page).max(1)
    }

    /// Clamp a requested page number to the valid range.
    pub fn clamp(requested: u64, total_pages: u64) -> u64 {
        requested.min(total_pages.max(1))
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_numeric_page_falls_back_to_first() {
        assert_eq!(requested_page(None), 1);
        assert_eq!(requested_page(Some("abc")), 1);
        assert_eq!(requested_page(Some("")), 1);
        assert_eq!(requested_page(Some("0")), 1);
        assert_eq!(requested_page(Some("-3")), 1);
        assert_eq!(requested_page(Some("2")), 2);
        assert_eq!(requested_page(Some(" 4 ")), 4);
    }

    #[test]
    fn out_of_range_page_clamps_to_last() {
        assert_eq!(Page::<()>::pages_for(7, 3), 3);
        assert_eq!(Page::<()>::pages_for(0, 3), 1);
        assert_eq!(Page::<()>::clamp(99, 3), 3);
        assert_eq!(Page::<()>::clamp(1, 3), 1);
        assert_eq!(Page::<()>::clamp(5, 0), 1);
    }

    #[test]
    fn navigation_flags() {
        let page = Page {
            items: vec![1, 2, 3],
            number: 2,
            total_pages: 3,
            total_items: 7,
            per_page: 3,
        };
        assert!(page.has_previous());
        assert!(page.has_next());

        let last = Page {
            items: vec![7],
            number: 3,
            total_pages: 3,
            total_items: 7,
            per_page: 3,
        };
        assert!(!last.has_next());
    }
}

//! Client-side pagination over a fully fetched result set.
//!
//! `page` is clamped to at least 1 and `per_page` into `[1, 100]`. Pages
//! past the end are empty, not an error.

/// Upper bound for `per_page`.
pub const MAX_PER_PAGE: i64 = 100;

/// One page of rows plus the metadata echoed in response headers.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Effective page number
    pub page: i64,
    /// Effective page size
    pub per_page: i64,
    pub total_pages: u64,
    pub total_count: u64,
}

#[inline]
pub fn normalize_page(page: i64) -> i64 {
    page.max(1)
}

#[inline]
pub fn normalize_per_page(per_page: i64) -> i64 {
    per_page.clamp(1, MAX_PER_PAGE)
}

/// Slices `rows` to the requested page.
///
/// The slice covers indices `[per_page * (page - 1), per_page * page)`
/// intersected with `[0, rows.len())`.
pub fn paginate<T>(rows: Vec<T>, page: i64, per_page: i64) -> Page<T> {
    let page = normalize_page(page);
    let per_page = normalize_per_page(per_page);

    let total_count = rows.len() as u64;
    let size = per_page as u64;
    let total_pages = total_count.div_ceil(size);

    // page - 1 fits in u64 since page >= 1; the product can overflow for huge pages
    let start = (page as u64 - 1).checked_mul(size).unwrap_or(u64::MAX);

    let items = if start >= total_count {
        Vec::new()
    } else {
        rows.into_iter()
            .skip(start as usize)
            .take(size as usize)
            .collect()
    };

    Page {
        items,
        page,
        per_page,
        total_pages,
        total_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn test_first_page() {
        let page = paginate(rows(5), 1, 2);
        assert_eq!(page.items, vec![0, 1]);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_count, 5);
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 2);
    }

    #[test]
    fn test_partial_last_page() {
        let page = paginate(rows(5), 3, 2);
        assert_eq!(page.items, vec![4]);
    }

    #[test]
    fn test_page_beyond_range_is_empty() {
        let page = paginate(rows(3), 1000, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.total_count, 3);
        assert_eq!(page.page, 1000);
    }

    #[test]
    fn test_page_clamped_to_one() {
        for requested in [0, -1, i64::MIN] {
            let page = paginate(rows(3), requested, 2);
            assert_eq!(page.page, 1);
            assert_eq!(page.items, vec![0, 1]);
        }
    }

    #[test]
    fn test_per_page_clamped() {
        assert_eq!(normalize_per_page(0), 1);
        assert_eq!(normalize_per_page(-50), 1);
        assert_eq!(normalize_per_page(101), 100);
        assert_eq!(normalize_per_page(i64::MAX), 100);
        assert_eq!(normalize_per_page(37), 37);

        let page = paginate(rows(250), 1, 1000);
        assert_eq!(page.per_page, 100);
        assert_eq!(page.items.len(), 100);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_total_pages_is_ceiling() {
        for count in 0..50usize {
            for per_page in 1..=12i64 {
                let page = paginate(rows(count), 1, per_page);
                let expected = (count as u64 + per_page as u64 - 1) / per_page as u64;
                assert_eq!(page.total_pages, expected, "count={count} per_page={per_page}");
            }
        }
    }

    #[test]
    fn test_slices_cover_every_row_once() {
        let count = 23;
        let per_page = 5;
        let total_pages = paginate(rows(count), 1, per_page).total_pages as i64;

        let mut seen = Vec::new();
        for page in 1..=total_pages + 1 {
            let slice = paginate(rows(count), page, per_page);
            assert!(slice.items.len() as i64 <= per_page);
            seen.extend(slice.items);
        }
        assert_eq!(seen, rows(count));
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let page = paginate(rows(3), i64::MAX, 100);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_empty_rows() {
        let page = paginate(Vec::<u8>::new(), 1, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.total_count, 0);
    }
}

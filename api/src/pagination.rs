/// One window of an ordered sequence.
#[derive(Debug, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// Clamped 1-based page number.
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl<T> Page<'_, T> {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Slice `items` into the requested page.
///
/// There is always at least one page, even for an empty sequence, and the
/// requested page is clamped into `1..=total_pages`.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> Page<'_, T> {
    let per_page = per_page.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);

    let start = ((page - 1) * per_page).min(total);
    let end = (start + per_page).min(total);

    Page {
        items: &items[start..end],
        page,
        per_page,
        total,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_case() {
        let items: Vec<u32> = (1..=13).collect();
        let page = paginate(&items, 1, 3);
        assert_eq!(page.total_pages, 5);
        assert_eq!(page.items, &[1, 2, 3]);
        assert!(!page.has_prev());
        assert!(page.has_next());

        assert_eq!(paginate(&items, 4, 3).items, &[10, 11, 12]);

        let last = paginate(&items, 5, 3);
        assert_eq!(last.items, &[13]);
        assert!(!last.has_next());
    }

    #[test]
    fn test_clamps_out_of_range() {
        let items: Vec<u32> = (1..=13).collect();
        let low = paginate(&items, 0, 3);
        assert_eq!(low.page, 1);
        assert_eq!(low.items, &[1, 2, 3]);

        let high = paginate(&items, 99, 3);
        assert_eq!(high.page, 5);
        assert_eq!(high.items, &[13]);
    }

    #[test]
    fn test_empty() {
        let items: Vec<u32> = vec![];
        let page = paginate(&items, 3, 5);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_window_length() {
        let items: Vec<usize> = (0..23).collect();
        for per_page in 1..=7 {
            let total_pages = paginate(&items, 1, per_page).total_pages;
            for page in 1..=total_pages {
                let window = paginate(&items, page, per_page);
                let expected = per_page.min(items.len() - (page - 1) * per_page);
                assert_eq!(window.items.len(), expected);
                assert_eq!(window.items[0], (page - 1) * per_page);
            }
        }
    }
}

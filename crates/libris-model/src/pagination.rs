//! Page math for the book grid.
//!
//! The grid shows a bounded window of page links centred on the current
//! page, with ellipsis markers where the window stops short of the first
//! or last page, plus first/prev/next/last controls.

/// Number of page links shown around the current page.
pub const DEFAULT_PAGE_WINDOW: usize = 7;

/// Width of one book card, in pixels.
pub const DEFAULT_ITEM_WIDTH: u32 = 280;

/// Space between two cards, in pixels.
pub const DEFAULT_GUTTER: u32 = 24;

/// One entry of the page-link window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    /// A link to a numbered page.
    Page(u32),
    /// Pages were skipped here.
    Ellipsis,
}

/// Paging state reconciled from the server's list metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    total_items: u64,
    page_size: u32,
    current_page: u32,
}

impl Pagination {
    /// `page_size` below 1 is treated as 1; `current_page` is clamped into range.
    #[must_use]
    pub fn new(total_items: u64, page_size: u32, current_page: u32) -> Self {
        let mut pagination = Self {
            total_items,
            page_size: page_size.max(1),
            current_page: 1,
        };
        pagination.current_page = current_page.clamp(1, pagination.total_pages());
        pagination
    }

    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    #[must_use]
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// `ceil(total_items / page_size)`, never below 1.
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        let pages = self.total_items.div_ceil(u64::from(self.page_size)).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn can_go_first(&self) -> bool {
        self.current_page > 1
    }

    #[must_use]
    pub fn can_go_prev(&self) -> bool {
        self.current_page > 1
    }

    #[must_use]
    pub fn can_go_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    #[must_use]
    pub fn can_go_last(&self) -> bool {
        self.current_page < self.total_pages()
    }

    /// Target of the "first" control, `None` while disabled.
    #[must_use]
    pub fn first(&self) -> Option<u32> {
        self.can_go_first().then_some(1)
    }

    #[must_use]
    pub fn prev(&self) -> Option<u32> {
        self.can_go_prev().then(|| self.current_page - 1)
    }

    #[must_use]
    pub fn next(&self) -> Option<u32> {
        self.can_go_next().then(|| self.current_page + 1)
    }

    #[must_use]
    pub fn last(&self) -> Option<u32> {
        self.can_go_last().then(|| self.total_pages())
    }

    /// Up to `size` consecutive page links centred on the current page.
    ///
    /// An [`PageLink::Ellipsis`] is added on each side where the window does
    /// not reach page 1 or the last page.
    #[must_use]
    pub fn window(&self, size: usize) -> Vec<PageLink> {
        let total = self.total_pages();
        let size = u32::try_from(size.max(1)).unwrap_or(u32::MAX);

        if total <= size {
            return (1..=total).map(PageLink::Page).collect();
        }

        let half = size / 2;
        let mut start = self.current_page.saturating_sub(half).max(1);
        let mut end = start + size - 1;
        if end > total {
            end = total;
            start = total - size + 1;
        }

        let mut links = Vec::with_capacity(size as usize + 2);
        if start > 1 {
            links.push(PageLink::Ellipsis);
        }
        links.extend((start..=end).map(PageLink::Page));
        if end < total {
            links.push(PageLink::Ellipsis);
        }
        links
    }
}

/// How many cards fit across `available_width`.
///
/// Floors to an integer and never returns less than 1.
#[must_use]
pub fn page_size_for_viewport(available_width: u32, item_width: u32, gutter: u32) -> u32 {
    let slot = item_width.saturating_add(gutter);
    if slot == 0 {
        return 1;
    }
    (available_width / slot).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ninety_five_items_in_pages_of_ten() {
        let pagination = Pagination::new(95, 10, 5);
        assert_eq!(pagination.total_pages(), 10);
        assert!(pagination.can_go_first());
        assert!(pagination.can_go_prev());
        assert!(pagination.can_go_next());
        assert!(pagination.can_go_last());

        let window = pagination.window(DEFAULT_PAGE_WINDOW);
        assert!(window.contains(&PageLink::Page(5)));
        assert_eq!(window.first(), Some(&PageLink::Ellipsis));
        assert_eq!(window.last(), Some(&PageLink::Ellipsis));
        assert_eq!(
            window,
            vec![
                PageLink::Ellipsis,
                PageLink::Page(2),
                PageLink::Page(3),
                PageLink::Page(4),
                PageLink::Page(5),
                PageLink::Page(6),
                PageLink::Page(7),
                PageLink::Page(8),
                PageLink::Ellipsis,
            ]
        );
    }

    #[test]
    fn window_sticks_to_the_edges() {
        let start = Pagination::new(95, 10, 1).window(7);
        assert_eq!(start.first(), Some(&PageLink::Page(1)));
        assert_eq!(start.last(), Some(&PageLink::Ellipsis));
        assert_eq!(start.len(), 8);

        let end = Pagination::new(95, 10, 10).window(7);
        assert_eq!(end.first(), Some(&PageLink::Ellipsis));
        assert_eq!(end.last(), Some(&PageLink::Page(10)));
    }

    #[test]
    fn small_lists_have_no_ellipsis() {
        let window = Pagination::new(30, 10, 2).window(7);
        assert_eq!(
            window,
            vec![PageLink::Page(1), PageLink::Page(2), PageLink::Page(3)]
        );
    }

    #[test]
    fn controls_disable_at_the_bounds() {
        let first = Pagination::new(95, 10, 1);
        assert_eq!(first.first(), None);
        assert_eq!(first.prev(), None);
        assert_eq!(first.next(), Some(2));
        assert_eq!(first.last(), Some(10));

        let last = Pagination::new(95, 10, 10);
        assert_eq!(last.next(), None);
        assert_eq!(last.last(), None);
        assert_eq!(last.prev(), Some(9));
    }

    #[test]
    fn empty_list_is_one_page() {
        let pagination = Pagination::new(0, 10, 1);
        assert_eq!(pagination.total_pages(), 1);
        assert!(!pagination.can_go_next());
        assert_eq!(pagination.window(7), vec![PageLink::Page(1)]);
    }

    #[test]
    fn current_page_is_clamped() {
        assert_eq!(Pagination::new(20, 10, 9).current_page(), 2);
        assert_eq!(Pagination::new(20, 0, 0).current_page(), 1);
    }

    #[test]
    fn viewport_sizing_floors() {
        assert_eq!(page_size_for_viewport(1300, 280, 24), 4);
        assert_eq!(page_size_for_viewport(100, 280, 24), 1);
        assert_eq!(page_size_for_viewport(100, 0, 0), 1);
    }
}

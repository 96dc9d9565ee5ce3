//! Property tests for the page-link window.

use libris_model::{PageLink, Pagination};
use proptest::prelude::*;

fn pages(links: &[PageLink]) -> Vec<u32> {
    links
        .iter()
        .filter_map(|link| match link {
            PageLink::Page(page) => Some(*page),
            PageLink::Ellipsis => None,
        })
        .collect()
}

proptest! {
    #[test]
    fn window_contains_current_page(
        total in 0u64..5_000,
        page_size in 1u32..100,
        current in 1u32..200,
        size in 1usize..15,
    ) {
        let pagination = Pagination::new(total, page_size, current);
        let links = pagination.window(size);
        let numbered = pages(&links);

        prop_assert!(numbered.contains(&pagination.current_page()));
        prop_assert!(numbered.len() <= size.max(1));
        prop_assert!(numbered.windows(2).all(|pair| pair[1] == pair[0] + 1));
    }

    #[test]
    fn ellipsis_marks_unreached_edges(
        total in 0u64..5_000,
        page_size in 1u32..100,
        current in 1u32..200,
        size in 1usize..15,
    ) {
        let pagination = Pagination::new(total, page_size, current);
        let links = pagination.window(size);
        let numbered = pages(&links);
        let first = *numbered.first().unwrap();
        let last = *numbered.last().unwrap();

        prop_assert_eq!(links.first() == Some(&PageLink::Ellipsis), first > 1);
        prop_assert_eq!(links.last() == Some(&PageLink::Ellipsis), last < pagination.total_pages());
    }

    #[test]
    fn total_pages_is_ceiling(total in 1u64..100_000, page_size in 1u32..500) {
        let pagination = Pagination::new(total, page_size, 1);
        let pages = u64::from(pagination.total_pages());
        prop_assert!(pages * u64::from(page_size) >= total);
        prop_assert!((pages - 1) * u64::from(page_size) < total);
    }

    #[test]
    fn controls_follow_bounds(total in 0u64..5_000, page_size in 1u32..100, current in 1u32..200) {
        let pagination = Pagination::new(total, page_size, current);
        prop_assert_eq!(pagination.can_go_prev(), pagination.current_page() > 1);
        prop_assert_eq!(pagination.can_go_next(), pagination.current_page() < pagination.total_pages());
        prop_assert_eq!(pagination.can_go_first(), pagination.can_go_prev());
        prop_assert_eq!(pagination.can_go_last(), pagination.can_go_next());
    }
}

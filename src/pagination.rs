//! Computes the window of page numbers rendered around the current page of a
//! paginated list (see [`compute_window`]).
//!
//! Given page 5 of 10 the control renders as:
//!
//! ```text
//! 1 … 3 4 [5] 6 7 … 10
//! ```
//!
//! where `3 4` are the [`PageWindow::left_pages`], `6 7` are the
//! [`PageWindow::right_pages`], and the leading `1` and trailing `10` are
//! rendered because of [`PageWindow::show_first`] and
//! [`PageWindow::show_last`].

use std::fmt;

/// The number of neighbouring pages shown on each side of the current page.
pub const WINDOW_WIDTH: usize = 2;

/// The page numbers and flags needed to render a pagination control for a
/// single page of a paginated list. All page numbers are 1-indexed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageWindow {
    /// The page being rendered.
    pub current_page: usize,

    /// The number of pages in the list.
    pub total_pages: usize,

    /// Up to [`WINDOW_WIDTH`] pages immediately preceding `current_page`, in
    /// ascending order. May include page 1.
    pub left_pages: Vec<usize>,

    /// Up to [`WINDOW_WIDTH`] pages immediately following `current_page`, in
    /// ascending order. May include the last page.
    pub right_pages: Vec<usize>,

    /// Whether page 1 must be rendered explicitly, ahead of `left_pages`.
    pub show_first: bool,

    /// Whether the last page must be rendered explicitly, after
    /// `right_pages`.
    pub show_last: bool,

    /// Whether pages are hidden between page 1 and `left_pages`.
    pub left_ellipsis: bool,

    /// Whether pages are hidden between `right_pages` and the last page.
    pub right_ellipsis: bool,
}

/// Computes the [`PageWindow`] for `current_page` of a list with
/// `total_pages` pages.
///
/// Returns `Ok(None)` when the list isn't paginated (`is_paginated` is false
/// or there is only a single page); callers render no pagination control in
/// that case. Returns [`Error::InvalidArgument`] when `total_pages` is zero
/// or `current_page` lies outside `[1, total_pages]`.
pub fn compute_window(
    current_page: usize,
    total_pages: usize,
    is_paginated: bool,
) -> Result<Option<PageWindow>> {
    if !is_paginated || total_pages == 1 {
        return Ok(None);
    }
    if total_pages < 1 || current_page < 1 || current_page > total_pages {
        return Err(Error::InvalidArgument {
            current_page,
            total_pages,
        });
    }

    let left_pages: Vec<usize> =
        (current_page.saturating_sub(WINDOW_WIDTH).max(1)..current_page)
            .collect();
    let right_pages: Vec<usize> = (1..=WINDOW_WIDTH)
        .filter_map(|offset| current_page.checked_add(offset))
        .take_while(|&page| page <= total_pages)
        .collect();

    let (left_ellipsis, show_first) = match left_pages.first() {
        None => (false, current_page != 1),
        Some(&first) => (first > 2, first > 1 && current_page != 1),
    };
    let (right_ellipsis, show_last) = match right_pages.last() {
        None => (false, current_page != total_pages),
        Some(&last) => (
            last < total_pages - 1,
            last < total_pages && current_page != total_pages,
        ),
    };

    Ok(Some(PageWindow {
        current_page,
        total_pages,
        left_pages,
        right_pages,
        show_first,
        show_last,
        left_ellipsis,
        right_ellipsis,
    }))
}

/// The result of a window computation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a misuse of [`compute_window`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Returned when `total_pages` is zero or `current_page` is outside of
    /// `[1, total_pages]`.
    InvalidArgument {
        current_page: usize,
        total_pages: usize,
    },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidArgument {
                current_page,
                total_pages,
            } => write!(
                f,
                "invalid page {} of {}: page must be within [1, total pages]",
                current_page, total_pages
            ),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod test {
    use super::*;

    fn window(current_page: usize, total_pages: usize) -> PageWindow {
        compute_window(current_page, total_pages, true)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_not_paginated() {
        assert_eq!(Ok(None), compute_window(1, 1, false));
        // ignored entirely when the list isn't paginated
        assert_eq!(Ok(None), compute_window(7, 3, false));
    }

    #[test]
    fn test_single_page() {
        assert_eq!(Ok(None), compute_window(1, 1, true));
        assert_eq!(Ok(None), compute_window(4, 1, true));
    }

    #[test]
    fn test_invalid_arguments() {
        for (current_page, total_pages) in [(0, 5), (6, 5), (1, 0), (0, 0)] {
            assert_eq!(
                Err(Error::InvalidArgument {
                    current_page,
                    total_pages
                }),
                compute_window(current_page, total_pages, true),
            );
        }
    }

    #[test]
    fn test_first_page() {
        assert_eq!(
            PageWindow {
                current_page: 1,
                total_pages: 10,
                left_pages: vec![],
                right_pages: vec![2, 3],
                show_first: false,
                show_last: true,
                left_ellipsis: false,
                right_ellipsis: true,
            },
            window(1, 10),
        );
    }

    #[test]
    fn test_last_page() {
        assert_eq!(
            PageWindow {
                current_page: 10,
                total_pages: 10,
                left_pages: vec![8, 9],
                right_pages: vec![],
                show_first: true,
                show_last: false,
                left_ellipsis: true,
                right_ellipsis: false,
            },
            window(10, 10),
        );
    }

    #[test]
    fn test_middle_page() {
        assert_eq!(
            PageWindow {
                current_page: 5,
                total_pages: 10,
                left_pages: vec![3, 4],
                right_pages: vec![6, 7],
                show_first: true,
                show_last: true,
                left_ellipsis: true,
                right_ellipsis: true,
            },
            window(5, 10),
        );
    }

    #[test]
    fn test_window_covers_all_pages() {
        assert_eq!(
            PageWindow {
                current_page: 2,
                total_pages: 3,
                left_pages: vec![1],
                right_pages: vec![3],
                show_first: false,
                show_last: false,
                left_ellipsis: false,
                right_ellipsis: false,
            },
            window(2, 3),
        );
    }

    #[test]
    fn test_adjacent_to_edges() {
        struct TestCase {
            current_page: usize,
            total_pages: usize,
            show_first: bool,
            left_ellipsis: bool,
            right_ellipsis: bool,
            show_last: bool,
        }

        for tc in &[
            // 2 is directly after 1; 3 and 4 are in the window; 5 is hidden
            TestCase {
                current_page: 4,
                total_pages: 7,
                show_first: true,
                left_ellipsis: false,
                right_ellipsis: false,
                show_last: true,
            },
            TestCase {
                current_page: 3,
                total_pages: 10,
                show_first: false,
                left_ellipsis: false,
                right_ellipsis: true,
                show_last: true,
            },
            TestCase {
                current_page: 7,
                total_pages: 10,
                show_first: true,
                left_ellipsis: true,
                right_ellipsis: false,
                show_last: true,
            },
            TestCase {
                current_page: 8,
                total_pages: 10,
                show_first: true,
                left_ellipsis: true,
                right_ellipsis: false,
                show_last: false,
            },
        ] {
            let w = window(tc.current_page, tc.total_pages);
            assert_eq!(tc.show_first, w.show_first, "page {}", tc.current_page);
            assert_eq!(
                tc.left_ellipsis, w.left_ellipsis,
                "page {}",
                tc.current_page
            );
            assert_eq!(
                tc.right_ellipsis, w.right_ellipsis,
                "page {}",
                tc.current_page
            );
            assert_eq!(tc.show_last, w.show_last, "page {}", tc.current_page);
        }
    }

    #[test]
    fn test_two_pages_never_elide() {
        for current_page in 1..=2 {
            let w = window(current_page, 2);
            assert!(!w.left_ellipsis);
            assert!(!w.right_ellipsis);
            assert!(!w.show_first);
            assert!(!w.show_last);
        }
        assert_eq!(vec![2], window(1, 2).right_pages);
        assert_eq!(vec![1], window(2, 2).left_pages);
    }

    #[test]
    fn test_pages_in_range() {
        for total_pages in 2..=40 {
            for current_page in 1..=total_pages {
                let w = window(current_page, total_pages);
                for page in w.left_pages.iter().chain(w.right_pages.iter()) {
                    assert!((1..=total_pages).contains(page));
                    assert_ne!(current_page, *page);
                }
                assert!(w.left_pages.len() <= WINDOW_WIDTH);
                assert!(w.right_pages.len() <= WINDOW_WIDTH);
            }
        }
    }

    #[test]
    fn test_rendered_pages_strictly_increase() {
        for total_pages in 2..=40 {
            for current_page in 1..=total_pages {
                let w = window(current_page, total_pages);
                let mut rendered = Vec::new();
                if w.show_first {
                    rendered.push(1);
                }
                rendered.extend(&w.left_pages);
                rendered.push(current_page);
                rendered.extend(&w.right_pages);
                if w.show_last {
                    rendered.push(total_pages);
                }

                assert!(
                    rendered.windows(2).all(|p| p[0] < p[1]),
                    "{:?} for page {} of {}",
                    rendered,
                    current_page,
                    total_pages
                );

                // first and last are always reachable
                assert_eq!(Some(&1), rendered.first());
                assert_eq!(Some(&total_pages), rendered.last());

                // ellipses mark exactly the gaps in the rendered sequence
                assert_eq!(
                    w.left_ellipsis,
                    w.show_first && rendered[1] > 2,
                    "left gap for page {} of {}",
                    current_page,
                    total_pages
                );
                assert_eq!(
                    w.right_ellipsis,
                    w.show_last && rendered[rendered.len() - 2] + 1 < total_pages,
                    "right gap for page {} of {}",
                    current_page,
                    total_pages
                );
            }
        }
    }

    #[test]
    fn test_largest_page_counts() {
        let max = usize::MAX;
        assert_eq!(
            PageWindow {
                current_page: max,
                total_pages: max,
                left_pages: vec![max - 2, max - 1],
                right_pages: vec![],
                show_first: true,
                show_last: false,
                left_ellipsis: true,
                right_ellipsis: false,
            },
            window(max, max)
        );
        assert_eq!(
            PageWindow {
                current_page: max - 1,
                total_pages: max,
                left_pages: vec![max - 3, max - 2],
                right_pages: vec![max],
                show_first: true,
                show_last: false,
                left_ellipsis: true,
                right_ellipsis: false,
            },
            window(max - 1, max)
        );
    }

    #[test]
    fn test_idempotent() {
        for total_pages in 1..=20 {
            for current_page in 1..=total_pages {
                assert_eq!(
                    compute_window(current_page, total_pages, true),
                    compute_window(current_page, total_pages, true),
                );
            }
        }
    }

    #[test]
    fn test_symmetric() {
        let mirror = |pages: &[usize], total_pages: usize| -> Vec<usize> {
            pages.iter().rev().map(|p| total_pages - p + 1).collect()
        };

        for total_pages in 2..=40 {
            for current_page in 1..=total_pages {
                let w = window(current_page, total_pages);
                let m = window(total_pages - current_page + 1, total_pages);
                assert_eq!(mirror(&w.left_pages, total_pages), m.right_pages);
                assert_eq!(mirror(&w.right_pages, total_pages), m.left_pages);
                assert_eq!(w.show_first, m.show_last);
                assert_eq!(w.show_last, m.show_first);
                assert_eq!(w.left_ellipsis, m.right_ellipsis);
                assert_eq!(w.right_ellipsis, m.left_ellipsis);
            }
        }
    }
}

//! Pagination of the date-sorted post collection into fixed-size windows.

use std::ops::Range;

/// One listing page: a contiguous slice of the sorted posts. Page 1 holds
/// the newest posts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Window {
    /// The 1-based page number.
    pub number: usize,

    /// The total number of pages in the listing.
    pub total: usize,

    /// The indices of this page's posts.
    pub range: Range<usize>,
}

impl Window {
    /// Whether a page with newer posts precedes this one.
    pub fn has_newer(&self) -> bool {
        self.number > 1
    }

    /// Whether a page with older posts follows this one.
    pub fn has_older(&self) -> bool {
        self.number < self.total
    }

    /// The window's slice of `items`.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.range.clone()]
    }
}

/// Splits `len` items into pages of `page_size`. There are
/// `max(1, ceil(len / page_size))` pages; with no items, there is a single
/// empty page. A `page_size` of 0 is treated as 1.
pub fn paginate(len: usize, page_size: usize) -> Vec<Window> {
    let page_size = page_size.max(1);
    let total = std::cmp::max(1, (len + page_size - 1) / page_size);
    (0..total)
        .map(|i| Window {
            number: i + 1,
            total,
            range: (i * page_size)..std::cmp::min(len, (i + 1) * page_size),
        })
        .collect()
}

//! Fixed-size pagination over feeds.

use serde::Serialize;

/// Number of posts on every feed page.
pub const PAGE_SIZE: u64 = 10;

/// Position of one page within a feed of known size.
///
/// Page numbers are 1-indexed. A missing or non-numeric page request resolves
/// to the first page; a number outside `1..=num_pages` resolves to the last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Current page number.
    pub number: u64,
    /// Total number of pages (at least 1, even for an empty feed).
    pub num_pages: u64,
    /// Total number of items in the feed.
    pub count: u64,
}

impl PageWindow {
    /// Resolve a raw `page` query value against a feed of `count` items.
    #[must_use]
    pub fn resolve(requested: Option<&str>, count: u64) -> Self {
        let num_pages = count.div_ceil(PAGE_SIZE).max(1);
        let number = match requested.map(str::trim).map(str::parse::<i64>) {
            Some(Ok(n)) if n >= 1 && (n as u64) <= num_pages => n as u64,
            Some(Ok(_)) => num_pages,
            Some(Err(_)) | None => 1,
        };

        Self {
            number,
            num_pages,
            count,
        }
    }

    /// Offset of the first item on this page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.number - 1) * PAGE_SIZE
    }

    /// Maximum number of items on this page.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        PAGE_SIZE
    }

    /// Whether a later page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 1
    }
}

/// One page of a feed, as exposed to page contexts.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// Items on this page.
    pub object_list: Vec<T>,
    /// Current page number.
    pub number: u64,
    /// Total number of pages.
    pub num_pages: u64,
    /// Total number of items across all pages.
    pub count: u64,
    /// Whether a later page exists.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_previous: bool,
}

impl<T> Page<T> {
    /// Pair a window with the items fetched for it.
    #[must_use]
    pub const fn new(window: PageWindow, object_list: Vec<T>) -> Self {
        Self {
            object_list,
            number: window.number,
            num_pages: window.num_pages,
            count: window.count,
            has_next: window.has_next(),
            has_previous: window.has_previous(),
        }
    }
}

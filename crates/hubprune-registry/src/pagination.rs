//! Tag listing pagination.
//!
//! The tag listing endpoint can be walked two ways, and a run picks exactly
//! one of them:
//!
//! - [`PaginationStrategy::PageNumber`]: read the item count from page 1,
//!   then request pages `N, N-1, ..., 1` by number.
//! - [`PaginationStrategy::Cursor`]: start without a page number and follow
//!   the `next` URL the registry returns until it is null.

use std::fmt;

use hubprune_core::TagRecord;

/// Default number of tags requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// How the tags of a repository are traversed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaginationStrategy {
    /// Explicit page numbers, walked from the last page down to the first.
    #[default]
    PageNumber,
    /// Opaque `next` URLs supplied by the registry.
    Cursor,
}

impl fmt::Display for PaginationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PageNumber => write!(f, "page-number"),
            Self::Cursor => write!(f, "cursor"),
        }
    }
}

/// Query parameters for one tag listing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Number of tags per page.
    pub page_size: u32,
    /// 1-based page index; `None` omits the `page` parameter.
    pub page: Option<u64>,
}

impl PageRequest {
    /// Requests a specific page.
    #[must_use]
    pub const fn numbered(page_size: u32, page: u64) -> Self {
        Self {
            page_size,
            page: Some(page),
        }
    }

    /// Requests the start of a cursor chain.
    #[must_use]
    pub const fn first(page_size: u32) -> Self {
        Self {
            page_size,
            page: None,
        }
    }
}

/// Opaque URL of the next page, as returned by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCursor(String);

impl TagCursor {
    /// Wraps a `next` URL.
    #[must_use]
    pub fn new(next: impl Into<String>) -> Self {
        Self(next.into())
    }

    /// Returns the URL exactly as the registry sent it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagPage {
    /// Total number of tags in the repository, when reported.
    pub count: Option<u64>,
    /// Cursor for the following page, if there is one.
    pub next: Option<TagCursor>,
    /// Tags on this page, in registry order.
    pub tags: Vec<TagRecord>,
}

/// Number of pages needed to hold `count` items.
///
/// # Examples
///
/// ```
/// use hubprune_registry::pagination::total_pages;
///
/// assert_eq!(total_pages(250, 100), 3);
/// assert_eq!(total_pages(0, 100), 0);
/// ```
#[must_use]
pub fn total_pages(count: u64, page_size: u32) -> u64 {
    count.div_ceil(u64::from(page_size.max(1)))
}

/// Page numbers from `total` down to 1.
pub fn descending_pages(total: u64) -> impl Iterator<Item = u64> {
    (1..=total).rev()
}

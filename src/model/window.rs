//! Views handed to the presentation layer.

use super::feed::TotalCount;
use super::filter::{Mode, PageNumber, PageSize};
use serde::Serialize;
use std::fmt;

/// The slice of items for one page number at one page size.
///
/// Invariant: once `page_number * page_size` items are available (or the
/// source is exhausted with fewer), `is_loading` is false and `items` is the
/// exact window, at most `page_size` long. While loading, `items` holds the
/// previous window for the same filter (or nothing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedWindow<T> {
    /// Requested page.
    pub page_number: PageNumber,
    /// Requested page size.
    pub page_size: PageSize,
    /// Items of the window, or a stale window while loading.
    pub items: Vec<T>,
    /// The window is not final yet.
    pub is_loading: bool,
    /// The last load for this window failed; a retry is possible.
    pub has_error: bool,
    /// Category total, when known.
    pub total_count: Option<TotalCount>,
    /// Which path served the window.
    pub mode: Mode,
    /// Whether a following page can exist.
    pub has_next_page: bool,
}

impl<T> ResolvedWindow<T> {
    /// A loading window with no items.
    pub fn pending(page_number: PageNumber, page_size: PageSize, mode: Mode) -> Self {
        Self {
            page_number,
            page_size,
            items: Vec::new(),
            is_loading: true,
            has_error: false,
            total_count: None,
            mode,
            has_next_page: false,
        }
    }

    /// Total pages, when a total count is known.
    pub fn total_pages(&self) -> Option<u64> {
        self.total_count
            .map(|count| count.pages(self.page_size.get()))
    }

    /// Whether a previous page exists.
    pub fn has_previous_page(&self) -> bool {
        self.page_number.get() > 1
    }

    /// Final window shorter than the page size because the source ran out.
    ///
    /// Callers render "no more items" for this rather than an error.
    pub fn is_exhausted_short(&self) -> bool {
        !self.is_loading && !self.has_next_page && self.items.len() < self.page_size.get()
    }
}

impl<T> fmt::Display for ResolvedWindow<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = match self.total_pages() {
            Some(pages) => pages.to_string(),
            None => "?".to_string(),
        };
        let state = if self.is_loading { "loading" } else { "ready" };
        write!(
            f,
            "page {}/{} size {} items {} {}",
            self.page_number,
            total,
            self.page_size,
            self.items.len(),
            state
        )?;
        if self.has_error {
            f.write_str(" error")?;
        }
        if self.has_next_page {
            f.write_str(" next")?;
        }
        Ok(())
    }
}

/// Accumulated items of an infinite-scroll list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfiniteList<T> {
    /// Everything loaded so far, in load order.
    pub items: Vec<T>,
    /// A batch is in flight.
    pub is_loading: bool,
    /// The source has nothing more.
    pub is_exhausted: bool,
    /// The last load failed.
    pub has_error: bool,
    /// Category total, when known.
    pub total_count: Option<TotalCount>,
}

impl<T> Default for InfiniteList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            is_loading: false,
            is_exhausted: false,
            has_error: false,
            total_count: None,
        }
    }
}

impl<T> fmt::Display for InfiniteList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_loading {
            "loading"
        } else if self.is_exhausted {
            "exhausted"
        } else {
            "idle"
        };
        write!(f, "items {} {}", self.items.len(), state)?;
        if self.has_error {
            f.write_str(" error")?;
        }
        Ok(())
    }
}

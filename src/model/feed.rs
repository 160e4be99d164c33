//! Data exchanged with the collaborator store.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque continuation token handed out by a cursor-paginated source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a store-issued token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Borrow the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One batch returned by a cursor-paginated source.
///
/// `next == None` means the source is exhausted. A short batch with a
/// continuation token is not exhaustion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPage<T> {
    /// Items in the store's order.
    pub items: Vec<T>,
    /// Token to continue from, `None` when nothing follows.
    pub next: Option<Cursor>,
}

impl<T> CursorPage<T> {
    /// A batch that more items follow.
    pub fn more(items: Vec<T>, next: Cursor) -> Self {
        Self {
            items,
            next: Some(next),
        }
    }

    /// The final batch.
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }

    /// Whether this batch ends the feed.
    pub fn is_last(&self) -> bool {
        self.next.is_none()
    }
}

/// Lifecycle of a cursor feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedStatus {
    /// First batch in flight.
    Loading,
    /// Idle; more items may exist.
    CanLoadMore,
    /// A follow-up batch is in flight.
    LoadingMore,
    /// No items exist beyond those loaded. Terminal.
    Exhausted,
}

impl FeedStatus {
    /// Whether a batch is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, FeedStatus::Loading | FeedStatus::LoadingMore)
    }
}

/// Item total for a category, possibly capped by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TotalCount {
    /// Reported count. A lower bound when `approximate` is set.
    pub value: u64,
    /// The store stopped counting at a cap ("N+").
    pub approximate: bool,
}

impl TotalCount {
    /// An exact count.
    pub fn exact(value: u64) -> Self {
        Self {
            value,
            approximate: false,
        }
    }

    /// A count capped at `value`.
    pub fn at_least(value: u64) -> Self {
        Self {
            value,
            approximate: true,
        }
    }

    /// Pages needed to show `value` items at `page_size` per page.
    pub fn pages(&self, page_size: usize) -> u64 {
        if page_size == 0 {
            return 0;
        }
        self.value.div_ceil(page_size as u64)
    }
}

impl fmt::Display for TotalCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.approximate {
            write!(f, "{}+", self.value)
        } else {
            write!(f, "{}", self.value)
        }
    }
}

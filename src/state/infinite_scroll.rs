//! Infinite scroll controller.
//!
//! ```text
//! Idle --intersection, feed CanLoadMore--> Triggered --request_more(page_size)--> Loading
//! Loading --feed settled, more available--> Idle
//! Loading --feed settled, exhausted--> Exhausted (terminal for this filter key)
//! ```
//!
//! Intersection signals while `Loading` are ignored, so a rapid-fire observer
//! cannot start duplicate loads.

use super::command::CursorLoad;
use super::cursor_feed::CursorFeed;
use crate::model::{FeedStatus, PageSize};
use tracing::debug;

/// Controller phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollPhase {
    /// Waiting for the sentinel to become visible.
    #[default]
    Idle,
    /// Sentinel seen; load about to start.
    Triggered,
    /// A page is loading.
    Loading,
    /// Nothing more to load.
    Exhausted,
}

/// Drives a cursor feed from viewport-intersection signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfiniteScrollController {
    phase: ScrollPhase,
    page_size: PageSize,
}

impl InfiniteScrollController {
    /// Controller loading `page_size` items per trigger.
    pub fn new(page_size: PageSize) -> Self {
        Self {
            phase: ScrollPhase::Idle,
            page_size,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> ScrollPhase {
        self.phase
    }

    /// Items loaded per trigger.
    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Start over for a new filter key.
    pub fn reset(&mut self, page_size: PageSize) {
        self.phase = ScrollPhase::Idle;
        self.page_size = page_size;
    }

    /// Sentinel became visible.
    ///
    /// Returns the batch to start, if this signal is honoured.
    pub fn on_intersection<T>(&mut self, feed: &mut CursorFeed<T>) -> Option<CursorLoad> {
        if self.phase != ScrollPhase::Idle {
            debug!(phase = ?self.phase, "intersection ignored");
            return None;
        }
        match feed.status() {
            FeedStatus::Exhausted => {
                self.phase = ScrollPhase::Exhausted;
                None
            }
            FeedStatus::CanLoadMore => {
                self.phase = ScrollPhase::Triggered;
                self.start_load(feed)
            }
            FeedStatus::Loading | FeedStatus::LoadingMore => None,
        }
    }

    /// Load the first page of an untouched feed without waiting for a signal.
    pub fn prime<T>(&mut self, feed: &mut CursorFeed<T>) -> Option<CursorLoad> {
        if self.phase != ScrollPhase::Idle
            || feed.has_started()
            || feed.is_in_flight()
            || feed.has_error()
        {
            return None;
        }
        self.phase = ScrollPhase::Triggered;
        self.start_load(feed)
    }

    fn start_load<T>(&mut self, feed: &mut CursorFeed<T>) -> Option<CursorLoad> {
        let load = feed.request_more(self.page_size.get());
        self.phase = if load.is_some() {
            ScrollPhase::Loading
        } else {
            ScrollPhase::Idle
        };
        load
    }

    /// Re-evaluate after the feed changed.
    pub fn on_feed_settled<T>(&mut self, feed: &CursorFeed<T>) {
        if feed.is_in_flight() {
            return;
        }
        match self.phase {
            ScrollPhase::Loading | ScrollPhase::Idle if feed.is_exhausted() => {
                self.phase = ScrollPhase::Exhausted;
            }
            ScrollPhase::Loading => self.phase = ScrollPhase::Idle,
            _ => {}
        }
    }
}

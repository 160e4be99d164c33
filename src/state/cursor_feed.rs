//! Cursor feed state machine.
//!
//! Wraps a cursor-paginated source for one [`ListingQuery`]. Items are appended
//! in load order and never reordered or truncated; `Exhausted` is terminal.
//!
//! # Transitions
//!
//! ```text
//! CanLoadMore --request_more--> Loading (nothing loaded yet) | LoadingMore
//! Loading/LoadingMore --batch, below target, token--> LoadingMore (follow-up batch)
//! Loading/LoadingMore --batch, target reached, token--> CanLoadMore
//! Loading/LoadingMore --batch without token--> Exhausted
//! Loading/LoadingMore --failure--> CanLoadMore (+ has_error)
//! ```
//!
//! At most one batch is in flight. `request_more` while loading is ignored, not
//! queued; callers re-evaluate on every state change and re-issue if needed.
//! [`CursorFeed::retarget`] moves the in-flight target to the caller's current
//! setpoint.

use super::command::{CursorLoad, LoadDisposition, Ticket};
use crate::model::{Cursor, CursorPage, FeedStatus, FetchError, ListingQuery};
use tracing::{debug, warn};

/// Upper bound on items requested from the store in one batch.
pub const DEFAULT_MAX_BATCH: usize = 100;

/// Outcome of applying a completion to a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedUpdate {
    /// What happened to the completion.
    pub disposition: LoadDisposition,
    /// Next batch to start when the target is not reached yet.
    pub follow_up: Option<CursorLoad>,
}

impl FeedUpdate {
    fn settled(disposition: LoadDisposition) -> Self {
        Self {
            disposition,
            follow_up: None,
        }
    }
}

/// Accumulating view over a cursor-paginated source.
#[derive(Debug, Clone)]
pub struct CursorFeed<T> {
    query: ListingQuery,
    items: Vec<T>,
    status: FeedStatus,
    continuation: Option<Cursor>,
    started: bool,
    target_len: usize,
    in_flight: Option<Ticket>,
    has_error: bool,
    max_batch: usize,
}

impl<T> CursorFeed<T> {
    /// Fresh feed for `query`. Batches never exceed `max_batch` (min 1).
    pub fn new(query: ListingQuery, max_batch: usize) -> Self {
        Self {
            query,
            items: Vec::new(),
            status: FeedStatus::CanLoadMore,
            continuation: None,
            started: false,
            target_len: 0,
            in_flight: None,
            has_error: false,
            max_batch: max_batch.max(1),
        }
    }

    /// Query this feed accumulates.
    pub fn query(&self) -> &ListingQuery {
        &self.query
    }

    /// Items loaded so far, in load order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of items loaded so far.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing has been loaded.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Current status.
    pub fn status(&self) -> FeedStatus {
        self.status
    }

    /// Whether a batch is in flight.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether the source has nothing beyond the loaded items.
    pub fn is_exhausted(&self) -> bool {
        self.status == FeedStatus::Exhausted
    }

    /// Whether the last batch failed.
    pub fn has_error(&self) -> bool {
        self.has_error
    }

    /// Whether any batch has been applied.
    pub fn has_started(&self) -> bool {
        self.started
    }

    /// Item count the current request is converging on.
    pub fn target_len(&self) -> usize {
        self.target_len
    }

    /// Forget the last failure. The next `request_more` retries normally.
    pub fn clear_error(&mut self) {
        self.has_error = false;
    }

    /// Ask for `n` more items.
    ///
    /// Returns the batch to start, or `None` when `n == 0`, the feed is
    /// exhausted, or a batch is already in flight. Large requests are split into
    /// sequential batches of at most `max_batch`; the feed issues the follow-ups
    /// itself from [`CursorFeed::apply`].
    pub fn request_more(&mut self, n: usize) -> Option<CursorLoad> {
        if n == 0 {
            return None;
        }
        if self.status == FeedStatus::Exhausted {
            return None;
        }
        if self.in_flight.is_some() {
            debug!(
                requested = n,
                loaded = self.items.len(),
                "request_more ignored: batch already in flight"
            );
            return None;
        }

        self.target_len = self.items.len().saturating_add(n);
        self.status = if self.started {
            FeedStatus::LoadingMore
        } else {
            FeedStatus::Loading
        };
        Some(self.issue_batch())
    }

    /// Move the target of the batch in flight to `required` items.
    ///
    /// Follow-up batches stop once the feed holds `required` items, so a user
    /// who navigates back mid catch-up costs no further calls. Never drops
    /// below what is loaded. No effect when nothing is in flight.
    pub fn retarget(&mut self, required: usize) {
        if self.in_flight.is_none() {
            return;
        }
        let target = required.max(self.items.len());
        if target != self.target_len {
            debug!(from = self.target_len, to = target, "cursor target moved");
            self.target_len = target;
        }
    }

    fn issue_batch(&mut self) -> CursorLoad {
        let ticket = Ticket::issue();
        let count = self
            .target_len
            .saturating_sub(self.items.len())
            .clamp(1, self.max_batch);
        self.in_flight = Some(ticket);
        debug!(
            ticket = ticket.get(),
            count,
            loaded = self.items.len(),
            target = self.target_len,
            "cursor batch issued"
        );
        CursorLoad {
            ticket,
            query: self.query.clone(),
            cursor: self.continuation.clone(),
            count,
        }
    }

    /// Apply a finished batch.
    ///
    /// Completions for another query, or for a ticket that is not the one in
    /// flight, are discarded without touching state.
    pub fn apply(
        &mut self,
        load: &CursorLoad,
        result: Result<CursorPage<T>, FetchError>,
    ) -> FeedUpdate {
        if load.query != self.query || self.in_flight != Some(load.ticket) {
            debug!(ticket = load.ticket.get(), "stale cursor batch discarded");
            return FeedUpdate::settled(LoadDisposition::StaleDiscarded);
        }
        self.in_flight = None;

        let page = match result {
            Ok(page) => page,
            Err(err) => {
                warn!(error = %err, loaded = self.items.len(), "cursor batch failed");
                self.status = FeedStatus::CanLoadMore;
                self.target_len = self.items.len();
                self.has_error = true;
                return FeedUpdate::settled(LoadDisposition::Failed);
            }
        };

        self.started = true;
        self.has_error = false;
        self.items.extend(page.items);

        match page.next {
            None => {
                self.status = FeedStatus::Exhausted;
                self.continuation = None;
                self.target_len = self.items.len();
                debug!(loaded = self.items.len(), "cursor feed exhausted");
                FeedUpdate::settled(LoadDisposition::Applied)
            }
            Some(next) => {
                self.continuation = Some(next);
                if self.items.len() < self.target_len {
                    self.status = FeedStatus::LoadingMore;
                    FeedUpdate {
                        disposition: LoadDisposition::Applied,
                        follow_up: Some(self.issue_batch()),
                    }
                } else {
                    self.status = FeedStatus::CanLoadMore;
                    FeedUpdate::settled(LoadDisposition::Applied)
                }
            }
        }
    }

    /// Discard everything and start over for `query`.
    pub fn reset(&mut self, query: ListingQuery) {
        *self = Self::new(query, self.max_batch);
    }
}

#[cfg(test)]
#[path = "cursor_feed_tests.rs"]
mod tests;

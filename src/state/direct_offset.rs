//! Direct `limit/offset` window source.
//!
//! Used only for offset-eligible filter states. Nothing accumulates: every
//! navigation is an independent request. Only the most recent window is kept so
//! a re-render of the same page does not refetch. Completions follow
//! last-request-wins.

use super::command::{LoadDisposition, OffsetLoad, Ticket};
use crate::model::{FetchError, ListingQuery, Mode, PageNumber, PageSize, ResolvedWindow};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct LoadedWindow<T> {
    query: ListingQuery,
    page: PageNumber,
    page_size: PageSize,
    items: Vec<T>,
}

/// State of the direct offset path.
#[derive(Debug, Clone)]
pub struct DirectOffsetSource<T> {
    in_flight: Option<OffsetLoad>,
    loaded: Option<LoadedWindow<T>>,
    has_error: bool,
}

impl<T> Default for DirectOffsetSource<T> {
    fn default() -> Self {
        Self {
            in_flight: None,
            loaded: None,
            has_error: false,
        }
    }
}

impl<T: Clone> DirectOffsetSource<T> {
    /// Empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a window request is in flight.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether the last request failed.
    pub fn has_error(&self) -> bool {
        self.has_error
    }

    /// Forget the last failure.
    pub fn clear_error(&mut self) {
        self.has_error = false;
    }

    /// Drop cached and pending state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Request the window for `page`, unless it is already loaded or in flight.
    ///
    /// A request for a different window supersedes any pending one.
    pub fn fetch(
        &mut self,
        query: &ListingQuery,
        page: PageNumber,
        page_size: PageSize,
    ) -> Option<OffsetLoad> {
        if self.window_for(query, page, page_size).is_some() {
            return None;
        }
        if let Some(pending) = &self.in_flight {
            if &pending.query == query && pending.page == page && pending.page_size == page_size {
                return None;
            }
        }
        if self.has_error {
            return None;
        }

        let load = OffsetLoad {
            ticket: Ticket::issue(),
            query: query.clone(),
            page,
            page_size,
        };
        debug!(
            ticket = load.ticket.get(),
            limit = load.limit(),
            offset = load.offset(),
            "offset window issued"
        );
        self.in_flight = Some(load.clone());
        Some(load)
    }

    /// Apply a finished window request.
    pub fn apply(&mut self, load: &OffsetLoad, result: Result<Vec<T>, FetchError>) -> LoadDisposition {
        if self.in_flight.as_ref().map(|pending| pending.ticket) != Some(load.ticket) {
            debug!(ticket = load.ticket.get(), "stale offset window discarded");
            return LoadDisposition::StaleDiscarded;
        }
        self.in_flight = None;

        match result {
            Ok(items) => {
                self.has_error = false;
                self.loaded = Some(LoadedWindow {
                    query: load.query.clone(),
                    page: load.page,
                    page_size: load.page_size,
                    items,
                });
                LoadDisposition::Applied
            }
            Err(err) => {
                warn!(error = %err, offset = load.offset(), "offset window failed");
                self.has_error = true;
                LoadDisposition::Failed
            }
        }
    }

    fn window_for(&self, query: &ListingQuery, page: PageNumber, page_size: PageSize) -> Option<&[T]> {
        self.loaded
            .as_ref()
            .filter(|w| &w.query == query && w.page == page && w.page_size == page_size)
            .map(|w| w.items.as_slice())
    }

    /// Window for `page`. While the request is pending, the last loaded window
    /// for the same query stands in.
    pub fn resolve(&self, query: &ListingQuery, page: PageNumber, page_size: PageSize) -> ResolvedWindow<T> {
        if let Some(items) = self.window_for(query, page, page_size) {
            return ResolvedWindow {
                page_number: page,
                page_size,
                items: items.to_vec(),
                is_loading: false,
                has_error: false,
                total_count: None,
                mode: Mode::DirectOffset,
                has_next_page: items.len() >= page_size.get(),
            };
        }

        let stale = self
            .loaded
            .as_ref()
            .filter(|w| &w.query == query)
            .map(|w| w.items.clone())
            .unwrap_or_default();
        ResolvedWindow {
            page_number: page,
            page_size,
            items: stale,
            is_loading: true,
            has_error: self.has_error,
            total_count: None,
            mode: Mode::DirectOffset,
            has_next_page: true,
        }
    }
}

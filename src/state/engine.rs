//! Adaptive pagination engine.
//!
//! PaginationEngine is the root state type for one listing surface. It owns the
//! cursor feed, the direct offset source, the count cache and the controllers,
//! and follows the same update-loop shape as the rest of this module: every
//! operation mutates state, reconciles, and returns the [`Command`]s the caller
//! must start. No I/O happens here.

use super::command::{Command, Completion, LoadDisposition};
use super::cursor_feed::{CursorFeed, DEFAULT_MAX_BATCH};
use super::direct_offset::DirectOffsetSource;
use super::filter_tracker::{FilterChange, FilterKeyTracker, PageController};
use super::infinite_scroll::{InfiniteScrollController, ScrollPhase};
use super::mode_selector::ModeSelector;
use super::offset_resolver;
use super::total_count::TotalCountCache;
use crate::model::{
    FilterState, InfiniteList, ListingSurface, Mode, PageNumber, PageSize, PaginationType,
    ResolvedWindow,
};
use tracing::{debug, info};

/// Static engine settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Upper bound on items per collaborator batch.
    pub max_request_batch: usize,
    /// Numbered pages or infinite scroll.
    pub pagination_type: PaginationType,
    /// Which sorts are served directly.
    pub selector: ModeSelector,
}

impl EngineConfig {
    /// Defaults for `surface`.
    pub fn for_surface(surface: ListingSurface) -> Self {
        Self {
            max_request_batch: DEFAULT_MAX_BATCH,
            pagination_type: PaginationType::Paginated,
            selector: ModeSelector::for_surface(surface),
        }
    }
}

// ===== PaginationEngine =====

/// Pagination state for one listing.
///
/// # State Machine
///
/// - **Filter**: a changed query resets the feed and goes back to page 1; a
///   page-size-only change keeps the feed and goes back to page 1 unless the
///   caller preserves a page.
/// - **Mode**: re-selected on every filter change; cursor emulation and direct
///   offset share no state.
/// - **Errors**: a failed load sets an error flag and is not retried until
///   the next user operation or [`PaginationEngine::retry`].
#[derive(Debug, Clone)]
pub struct PaginationEngine<T> {
    config: EngineConfig,
    filter: FilterState,
    tracker: FilterKeyTracker,
    pages: PageController,
    mode: Mode,
    feed: CursorFeed<T>,
    direct: DirectOffsetSource<T>,
    scroll: InfiniteScrollController,
    counts: TotalCountCache,
    /// Last final window shown for the current filter key.
    last_items: Vec<T>,
    window: ResolvedWindow<T>,
}

impl<T: Clone> PaginationEngine<T> {
    /// Engine for `filter`. Call [`PaginationEngine::start`] to get the first loads.
    pub fn new(config: EngineConfig, filter: FilterState) -> Self {
        let mut tracker = FilterKeyTracker::new();
        tracker.observe(&filter);
        let mode = config.selector.select(&filter);
        let page_size = filter.page_size();
        Self {
            feed: CursorFeed::new(filter.query(), config.max_request_batch),
            direct: DirectOffsetSource::new(),
            scroll: InfiniteScrollController::new(page_size),
            counts: TotalCountCache::new(),
            pages: PageController::new(page_size),
            window: ResolvedWindow::pending(PageNumber::FIRST, page_size, mode),
            last_items: Vec::new(),
            tracker,
            mode,
            filter,
            config,
        }
    }

    // ===== Accessors =====

    /// Current filter state.
    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Mode serving page windows.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Presentation style.
    pub fn pagination_type(&self) -> PaginationType {
        self.config.pagination_type
    }

    /// Current page.
    pub fn page(&self) -> PageNumber {
        self.pages.page()
    }

    /// Current page size.
    pub fn page_size(&self) -> PageSize {
        self.pages.page_size()
    }

    /// Accumulating feed for the current query.
    pub fn feed(&self) -> &CursorFeed<T> {
        &self.feed
    }

    /// Infinite-scroll controller phase.
    pub fn scroll_phase(&self) -> ScrollPhase {
        self.scroll.phase()
    }

    /// Window for the current page, as of the last reconciliation.
    pub fn window(&self) -> &ResolvedWindow<T> {
        &self.window
    }

    /// Everything the infinite-scroll list shows.
    pub fn infinite_list(&self) -> InfiniteList<T> {
        InfiniteList {
            items: self.feed.items().to_vec(),
            is_loading: self.feed.is_in_flight(),
            is_exhausted: self.feed.is_exhausted(),
            has_error: self.feed.has_error(),
            total_count: self.counts.get(self.filter.category()),
        }
    }

    // ===== Operations =====

    /// First reconciliation after construction.
    pub fn start(&mut self) -> Vec<Command> {
        self.reconcile()
    }

    /// A new filter state was settled by the caller.
    pub fn on_filter_change(&mut self, filter: FilterState) -> Vec<Command> {
        let change = self.tracker.observe(&filter);
        if change == FilterChange::Unchanged {
            return self.reconcile();
        }
        self.clear_errors();

        if change.resets_feed() {
            self.feed.reset(filter.query());
            self.direct.clear();
        }
        self.last_items.clear();
        self.pages.on_filter_change(&filter, change);
        self.scroll.reset(filter.page_size());
        self.mode = self.config.selector.select(&filter);
        debug!(mode = ?self.mode, "mode selected");
        self.filter = filter;
        self.reconcile()
    }

    /// Navigate to `page`. Backward moves to loaded pages cost nothing.
    pub fn set_page(&mut self, page: PageNumber) -> Vec<Command> {
        self.clear_errors();
        if self.pages.go_to(page) {
            debug!(page = page.get(), "page changed");
        }
        self.reconcile()
    }

    /// Change the page size, keeping the feed.
    ///
    /// Lands on `preserve` when given, otherwise on page 1.
    pub fn set_page_size(&mut self, page_size: PageSize, preserve: Option<PageNumber>) -> Vec<Command> {
        let filter = self.filter.with_page_size(page_size);
        let change = self.tracker.observe(&filter);
        if change == FilterChange::Unchanged {
            if let Some(page) = preserve {
                return self.set_page(page);
            }
            return self.reconcile();
        }
        self.clear_errors();
        self.last_items.clear();
        self.pages.change_page_size(page_size, preserve);
        self.scroll.reset(page_size);
        self.filter = filter;
        self.reconcile()
    }

    /// Window for `page` at `page_size`, plus the loads needed to converge.
    ///
    /// Re-rendering the same window is free. A failed load waits for the next
    /// user operation or [`Self::retry`]; rendering alone never retries it.
    pub fn get_window(&mut self, page: PageNumber, page_size: PageSize) -> (ResolvedWindow<T>, Vec<Command>) {
        let commands = if page_size != self.pages.page_size() {
            self.set_page_size(page_size, Some(page))
        } else if page != self.pages.page() {
            self.set_page(page)
        } else {
            self.reconcile()
        };
        (self.window.clone(), commands)
    }

    /// Switch between numbered pages and infinite scroll.
    pub fn set_pagination_type(&mut self, pagination_type: PaginationType) -> Vec<Command> {
        if self.config.pagination_type != pagination_type {
            info!(pagination_type = %pagination_type, "pagination type changed");
            self.config.pagination_type = pagination_type;
            self.scroll.reset(self.pages.page_size());
        }
        self.reconcile()
    }

    /// The infinite-scroll sentinel became visible.
    pub fn on_sentinel_visible(&mut self) -> Vec<Command> {
        if self.config.pagination_type != PaginationType::InfiniteScroll {
            debug!("sentinel ignored outside infinite scroll");
            return Vec::new();
        }
        self.feed.clear_error();
        let mut commands: Vec<Command> = self
            .scroll
            .on_intersection(&mut self.feed)
            .map(Command::LoadCursorBatch)
            .into_iter()
            .collect();
        commands.extend(self.reconcile());
        commands
    }

    /// Clear every error flag and try again.
    pub fn retry(&mut self) -> Vec<Command> {
        info!("retry requested");
        let feed_failed = self.feed.has_error();
        self.clear_errors();
        if feed_failed && self.config.pagination_type == PaginationType::InfiniteScroll {
            if let Some(load) = self.scroll.on_intersection(&mut self.feed) {
                let mut commands = vec![Command::LoadCursorBatch(load)];
                commands.extend(self.reconcile());
                return commands;
            }
        }
        self.reconcile()
    }

    /// Feed a finished collaborator call back in.
    ///
    /// Stale completions are dropped. Successful ones reconcile; failed ones
    /// only refresh the window so nothing retries on its own.
    pub fn apply(&mut self, completion: Completion<T>) -> Vec<Command> {
        let mut commands = Vec::new();
        let disposition = match completion {
            Completion::CursorBatch { load, result } => {
                let update = self.feed.apply(&load, result);
                commands.extend(update.follow_up.map(Command::LoadCursorBatch));
                self.scroll.on_feed_settled(&self.feed);
                update.disposition
            }
            Completion::OffsetWindow { load, result } => self.direct.apply(&load, result),
            Completion::TotalCount { load, result } => self.counts.apply(&load, result),
        };

        match disposition {
            LoadDisposition::Applied => commands.extend(self.reconcile()),
            LoadDisposition::Failed => self.refresh_window(),
            LoadDisposition::StaleDiscarded => {}
        }
        commands
    }

    // ===== Reconciliation =====

    fn clear_errors(&mut self) {
        self.feed.clear_error();
        self.direct.clear_error();
        self.counts.clear_errors();
    }

    /// Level-triggered step: bring loads in line with the current state.
    fn reconcile(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        let page = self.pages.page();
        let page_size = self.pages.page_size();

        match self.config.pagination_type {
            PaginationType::Paginated => {
                let window = match self.mode {
                    Mode::CursorEmulated => {
                        let resolution =
                            offset_resolver::resolve(page, page_size, &mut self.feed, &self.last_items);
                        commands.extend(resolution.load.map(Command::LoadCursorBatch));
                        resolution.window
                    }
                    Mode::DirectOffset => {
                        let query = self.filter.query();
                        commands.extend(
                            self.direct
                                .fetch(&query, page, page_size)
                                .map(Command::FetchOffsetWindow),
                        );
                        self.direct.resolve(&query, page, page_size)
                    }
                };
                self.publish(window);
            }
            PaginationType::InfiniteScroll => {
                commands.extend(self.scroll.prime(&mut self.feed).map(Command::LoadCursorBatch));
            }
        }

        commands.extend(
            self.counts
                .ensure(self.filter.category())
                .map(Command::FetchTotalCount),
        );
        if !commands.is_empty() {
            debug!(count = commands.len(), "reconcile issued loads");
        }
        commands
    }

    /// Recompute the window without starting anything.
    fn refresh_window(&mut self) {
        if self.config.pagination_type != PaginationType::Paginated {
            return;
        }
        let page = self.pages.page();
        let page_size = self.pages.page_size();
        let window = match self.mode {
            Mode::CursorEmulated => {
                offset_resolver::window_of(page, page_size, &self.feed, &self.last_items)
            }
            Mode::DirectOffset => self.direct.resolve(&self.filter.query(), page, page_size),
        };
        self.publish(window);
    }

    fn publish(&mut self, mut window: ResolvedWindow<T>) {
        window.total_count = self.counts.get(self.filter.category());
        // Category count: narrows an open end only, never while searching.
        if window.has_next_page && self.filter.search_term().is_empty() {
            if let Some(total) = window.total_count.filter(|total| !total.approximate) {
                window.has_next_page =
                    (window.page_number.get() as u64) < total.pages(window.page_size.get());
            }
        }
        if !window.is_loading {
            self.last_items = window.items.clone();
        }
        self.window = window;
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;

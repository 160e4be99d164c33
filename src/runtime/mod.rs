//! Async driver (impure shell).
//!
//! [`EngineDriver`] owns a [`PaginationEngine`] and the collaborator ports. It
//! runs every [`Command`] the engine emits on its own tokio task and feeds the
//! [`Completion`]s back through an mpsc channel, one at a time, so the engine
//! itself stays single-threaded. It also owns the infinite-scroll sentinel
//! channel and the search debounce timer.

use crate::model::{
    FetchError, FetchOperation, FilterState, InfiniteList, PageNumber, PageSize, PaginationType,
    ResolvedWindow,
};
use crate::source::{CountSource, CursorSource, OffsetSource};
use crate::state::{Command, Completion, PaginationEngine, SearchDebouncer, Ticket};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, warn};

/// The store queries the driver calls.
pub struct Collaborators<T> {
    /// Cursor-paginated query.
    pub cursor: Arc<dyn CursorSource<T>>,
    /// Direct offset query.
    pub offset: Arc<dyn OffsetSource<T>>,
    /// Count query.
    pub count: Arc<dyn CountSource>,
}

impl<T> Clone for Collaborators<T> {
    fn clone(&self) -> Self {
        Self {
            cursor: Arc::clone(&self.cursor),
            offset: Arc::clone(&self.offset),
            count: Arc::clone(&self.count),
        }
    }
}

impl<T: Send + 'static> Collaborators<T> {
    /// All three ports served by one store.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: CursorSource<T> + OffsetSource<T> + CountSource + 'static,
    {
        Self {
            cursor: store.clone(),
            offset: store.clone(),
            count: store,
        }
    }
}

/// Handle the presentation layer fires when the sentinel scrolls into view.
#[derive(Debug, Clone)]
pub struct Sentinel {
    tx: mpsc::UnboundedSender<()>,
}

impl Sentinel {
    /// Signal that the sentinel is visible. Returns false once the driver is gone.
    pub fn intersected(&self) -> bool {
        self.tx.send(()).is_ok()
    }
}

/// What a call to [`EngineDriver::next_event`] handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverEvent {
    /// A collaborator call finished and was handed to the engine.
    Completed(Ticket),
    /// The sentinel fired.
    SentinelVisible,
    /// A search term settled and became the new filter.
    SearchSettled(String),
    /// The quiet period passed but the term did not change.
    SearchUnchanged,
}

/// Runs a [`PaginationEngine`] against real collaborators.
pub struct EngineDriver<T> {
    engine: PaginationEngine<T>,
    collaborators: Collaborators<T>,
    completions_tx: mpsc::UnboundedSender<Completion<T>>,
    completions_rx: mpsc::UnboundedReceiver<Completion<T>>,
    sentinel_tx: mpsc::UnboundedSender<()>,
    sentinel_rx: mpsc::UnboundedReceiver<()>,
    debouncer: SearchDebouncer,
    pending: usize,
}

impl<T: Clone + Send + 'static> EngineDriver<T> {
    /// Driver for `engine`. Nothing starts until [`EngineDriver::start`].
    pub fn new(engine: PaginationEngine<T>, collaborators: Collaborators<T>, debounce: Duration) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (sentinel_tx, sentinel_rx) = mpsc::unbounded_channel();
        let mut debouncer = SearchDebouncer::new(debounce);
        debouncer.reset(engine.filter().search_term());
        Self {
            engine,
            collaborators,
            completions_tx,
            completions_rx,
            sentinel_tx,
            sentinel_rx,
            debouncer,
            pending: 0,
        }
    }

    // ===== Accessors =====

    /// The engine being driven.
    pub fn engine(&self) -> &PaginationEngine<T> {
        &self.engine
    }

    /// Current page window.
    pub fn window(&self) -> &ResolvedWindow<T> {
        self.engine.window()
    }

    /// Current infinite-scroll list.
    pub fn infinite_list(&self) -> InfiniteList<T> {
        self.engine.infinite_list()
    }

    /// Collaborator calls started but not yet handed back.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Nothing in flight and no search waiting to settle.
    pub fn is_idle(&self) -> bool {
        self.pending == 0 && self.debouncer.deadline().is_none()
    }

    // ===== Operations =====

    /// Issue the first loads.
    pub fn start(&mut self) {
        let commands = self.engine.start();
        self.dispatch(commands);
    }

    /// Apply a settled filter state.
    pub fn on_filter_change(&mut self, filter: FilterState) {
        self.debouncer.reset(filter.search_term());
        let commands = self.engine.on_filter_change(filter);
        self.dispatch(commands);
    }

    /// Record a search keystroke. The filter changes once the term settles.
    pub fn on_search_input(&mut self, term: impl Into<String>) {
        self.debouncer.input(term, Instant::now().into_std());
    }

    /// Navigate to `page`.
    pub fn set_page(&mut self, page: PageNumber) {
        let commands = self.engine.set_page(page);
        self.dispatch(commands);
    }

    /// Change the page size, optionally keeping a page.
    pub fn set_page_size(&mut self, page_size: PageSize, preserve: Option<PageNumber>) {
        let commands = self.engine.set_page_size(page_size, preserve);
        self.dispatch(commands);
    }

    /// Window for `page` at `page_size` as it stands; loads start in the background.
    pub fn get_window(&mut self, page: PageNumber, page_size: PageSize) -> ResolvedWindow<T> {
        let (window, commands) = self.engine.get_window(page, page_size);
        self.dispatch(commands);
        window
    }

    /// Switch between numbered pages and infinite scroll.
    pub fn set_pagination_type(&mut self, pagination_type: PaginationType) {
        let commands = self.engine.set_pagination_type(pagination_type);
        self.dispatch(commands);
    }

    /// Clear errors and try again.
    pub fn retry(&mut self) {
        let commands = self.engine.retry();
        self.dispatch(commands);
    }

    /// Handle for the infinite-scroll sentinel.
    pub fn attach_infinite_scroll_sentinel(&self) -> Sentinel {
        Sentinel {
            tx: self.sentinel_tx.clone(),
        }
    }

    /// Wait for the next completion, sentinel signal or settled search term
    /// and hand it to the engine.
    pub async fn next_event(&mut self) -> DriverEvent {
        let deadline = self.debouncer.deadline();
        let wake_at = deadline.map(Instant::from_std).unwrap_or_else(Instant::now);

        tokio::select! {
            Some(completion) = self.completions_rx.recv() => {
                self.pending = self.pending.saturating_sub(1);
                let ticket = completion.ticket();
                let commands = self.engine.apply(completion);
                self.dispatch(commands);
                DriverEvent::Completed(ticket)
            }
            Some(()) = self.sentinel_rx.recv() => {
                self.sentinel_visible();
                DriverEvent::SentinelVisible
            }
            _ = tokio::time::sleep_until(wake_at), if deadline.is_some() => {
                match self.debouncer.poll(Instant::now().into_std()) {
                    Some(term) => {
                        let filter = self.engine.filter().with_search(term.clone());
                        let commands = self.engine.on_filter_change(filter);
                        self.dispatch(commands);
                        DriverEvent::SearchSettled(term)
                    }
                    None => DriverEvent::SearchUnchanged,
                }
            }
        }
    }

    /// Handle events until nothing is in flight and no search is pending.
    pub async fn settle(&mut self) {
        loop {
            while self.sentinel_rx.try_recv().is_ok() {
                self.sentinel_visible();
            }
            if self.is_idle() {
                return;
            }
            self.next_event().await;
        }
    }

    fn sentinel_visible(&mut self) {
        let commands = self.engine.on_sentinel_visible();
        self.dispatch(commands);
    }

    fn dispatch(&mut self, commands: Vec<Command>) {
        for command in commands {
            self.pending += 1;
            debug!(ticket = command.ticket().get(), pending = self.pending, "dispatching load");
            let collaborators = self.collaborators.clone();
            let tx = self.completions_tx.clone();
            tokio::spawn(async move {
                let completion = execute(collaborators, command).await;
                if tx.send(completion).is_err() {
                    debug!("driver dropped; completion discarded");
                }
            });
        }
    }
}

/// Run one command against the collaborators.
async fn execute<T: Send + 'static>(collaborators: Collaborators<T>, command: Command) -> Completion<T> {
    match command {
        Command::LoadCursorBatch(load) => {
            let source = Arc::clone(&collaborators.cursor);
            let (query, cursor, count) = (load.query.clone(), load.cursor.clone(), load.count);
            let result = guarded(FetchOperation::CursorPage, async move {
                source.load_page(&query, cursor.as_ref(), count).await
            })
            .await;
            Completion::CursorBatch { load, result }
        }
        Command::FetchOffsetWindow(load) => {
            let source = Arc::clone(&collaborators.offset);
            let (query, limit, offset) = (load.query.clone(), load.limit(), load.offset());
            let result = guarded(FetchOperation::OffsetWindow, async move {
                source.fetch_window(&query, limit, offset).await
            })
            .await;
            Completion::OffsetWindow { load, result }
        }
        Command::FetchTotalCount(load) => {
            let source = Arc::clone(&collaborators.count);
            let category = load.category.clone();
            let result = guarded(FetchOperation::TotalCount, async move {
                source.count(category.as_ref()).await
            })
            .await;
            Completion::TotalCount { load, result }
        }
    }
}

/// Run `call` on its own task so a panicking collaborator becomes a failed
/// load instead of a completion that never arrives.
async fn guarded<R, F>(operation: FetchOperation, call: F) -> Result<R, FetchError>
where
    R: Send + 'static,
    F: Future<Output = Result<R, FetchError>> + Send + 'static,
{
    match tokio::spawn(call).await {
        Ok(result) => result,
        Err(err) => {
            warn!(error = %err, %operation, "collaborator task ended abnormally");
            Err(FetchError::Abandoned { operation })
        }
    }
}

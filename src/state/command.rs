//! Load commands emitted by the engine and the completions fed back to it.
//!
//! The engine never performs I/O. Every operation returns the [`Command`]s the
//! caller must start; when a collaborator call finishes, the caller hands the
//! matching [`Completion`] back. Each command carries a [`Ticket`] and the
//! query it was issued for, so late completions can be recognised as stale.

use crate::model::{
    CategoryId, Cursor, CursorPage, FetchError, ListingQuery, PageNumber, PageSize, TotalCount,
};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// Process-unique, monotonically increasing load identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    /// Issue a fresh ticket.
    pub fn issue() -> Self {
        Self(NEXT_TICKET.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value, for logging.
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Fetch the next batch of a cursor feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorLoad {
    /// Load identity.
    pub ticket: Ticket,
    /// Feed the batch belongs to.
    pub query: ListingQuery,
    /// Continuation token, `None` for the first batch.
    pub cursor: Option<Cursor>,
    /// Maximum items wanted in this batch.
    pub count: usize,
}

/// Fetch one window directly with `limit/offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetLoad {
    /// Load identity.
    pub ticket: Ticket,
    /// Filters and sort.
    pub query: ListingQuery,
    /// Page the window is for.
    pub page: PageNumber,
    /// Page size the window is for.
    pub page_size: PageSize,
}

impl OffsetLoad {
    /// `limit` sent to the store.
    pub fn limit(&self) -> usize {
        self.page_size.get()
    }

    /// `offset` sent to the store.
    pub fn offset(&self) -> usize {
        self.page_size.offset_of(self.page)
    }
}

/// Fetch the total item count for a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountLoad {
    /// Load identity.
    pub ticket: Ticket,
    /// Category counted, `None` for everything.
    pub category: Option<CategoryId>,
}

/// A collaborator call the caller must start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Cursor-paginated query.
    LoadCursorBatch(CursorLoad),
    /// Direct offset query.
    FetchOffsetWindow(OffsetLoad),
    /// Count query.
    FetchTotalCount(CountLoad),
}

impl Command {
    /// Ticket of the wrapped load.
    pub fn ticket(&self) -> Ticket {
        match self {
            Command::LoadCursorBatch(load) => load.ticket,
            Command::FetchOffsetWindow(load) => load.ticket,
            Command::FetchTotalCount(load) => load.ticket,
        }
    }
}

/// Result of a collaborator call, paired with the command that started it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion<T> {
    /// A cursor batch finished.
    CursorBatch {
        /// The originating load.
        load: CursorLoad,
        /// Batch or failure.
        result: Result<CursorPage<T>, FetchError>,
    },
    /// An offset window finished.
    OffsetWindow {
        /// The originating load.
        load: OffsetLoad,
        /// Window items or failure.
        result: Result<Vec<T>, FetchError>,
    },
    /// A count finished.
    TotalCount {
        /// The originating load.
        load: CountLoad,
        /// Count or failure.
        result: Result<TotalCount, FetchError>,
    },
}

impl<T> Completion<T> {
    /// Ticket of the originating load.
    pub fn ticket(&self) -> Ticket {
        match self {
            Completion::CursorBatch { load, .. } => load.ticket,
            Completion::OffsetWindow { load, .. } => load.ticket,
            Completion::TotalCount { load, .. } => load.ticket,
        }
    }
}

/// What happened to a completion handed to a state component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadDisposition {
    /// Results were applied.
    Applied,
    /// The load failed; in-flight state was cleared and the error flag set.
    Failed,
    /// The load belonged to an abandoned key or was superseded. Dropped.
    StaleDiscarded,
}

//! Pagination state machines (pure).
//!
//! All state transitions are pure functions testable without a runtime. Loads
//! leave this module as [`Command`]s and come back as [`Completion`]s.

pub mod command;
pub mod cursor_feed;
pub mod debounce;
pub mod direct_offset;
pub mod engine;
pub mod filter_tracker;
pub mod infinite_scroll;
pub mod mode_selector;
pub mod offset_resolver;
pub mod total_count;

// Re-export for convenience
pub use command::{Command, Completion, CountLoad, CursorLoad, LoadDisposition, OffsetLoad, Ticket};
pub use cursor_feed::{CursorFeed, FeedUpdate, DEFAULT_MAX_BATCH};
pub use debounce::{SearchDebouncer, DEFAULT_SEARCH_DEBOUNCE};
pub use direct_offset::DirectOffsetSource;
pub use engine::{EngineConfig, PaginationEngine};
pub use filter_tracker::{FilterChange, FilterKeyTracker, PageController};
pub use infinite_scroll::{InfiniteScrollController, ScrollPhase};
pub use mode_selector::ModeSelector;
pub use offset_resolver::{resolve, window_of, Resolution};
pub use total_count::TotalCountCache;

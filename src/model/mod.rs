//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod error;
pub mod feed;
pub mod filter;
pub mod identifiers;
pub mod item;
pub mod surface;
pub mod window;

// Re-export for convenience
pub use error::{AppError, FetchError, FetchOperation};
pub use feed::{Cursor, CursorPage, FeedStatus, TotalCount};
pub use filter::{
    FilterKey, FilterState, InvalidPageNumber, InvalidPageSize, ListingQuery, Mode, PageNumber,
    PageSize,
};
pub use identifiers::{CategoryId, InvalidCategoryId, InvalidItemId, ItemId};
pub use item::CatalogItem;
pub use surface::{ListingSurface, PaginationType, SortKey, UnknownSortKey, UnknownSurface};
pub use window::{InfiniteList, ResolvedWindow};

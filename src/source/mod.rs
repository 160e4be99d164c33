//! Collaborator ports.
//!
//! The engine consumes three store queries:
//! - [`CursorSource`]: forward-only cursor pagination
//! - [`OffsetSource`]: direct `limit/offset` windows
//! - [`CountSource`]: category totals, possibly capped
//!
//! The traits are async and object safe so the driver can hold them as
//! `Arc<dyn ...>`. [`memory::InMemoryCatalog`] implements all three.

use crate::model::{CategoryId, Cursor, CursorPage, FetchError, ListingQuery, TotalCount};
use async_trait::async_trait;

pub mod memory;

pub use memory::InMemoryCatalog;

/// Cursor-paginated query behind the cursor feed.
#[async_trait]
pub trait CursorSource<T>: Send + Sync {
    /// Load up to `count` items after `cursor` (`None` for the start).
    ///
    /// The store may return fewer than `count` items; only a missing `next`
    /// token means the feed is exhausted.
    async fn load_page(
        &self,
        query: &ListingQuery,
        cursor: Option<&Cursor>,
        count: usize,
    ) -> Result<CursorPage<T>, FetchError>;
}

/// Direct offset query, used for offset-eligible filter states only.
#[async_trait]
pub trait OffsetSource<T>: Send + Sync {
    /// Items `offset..offset + limit` of the filtered, sorted listing.
    async fn fetch_window(
        &self,
        query: &ListingQuery,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<T>, FetchError>;
}

/// Count query keyed by category only.
#[async_trait]
pub trait CountSource: Send + Sync {
    /// Items in `category` (`None` for all). May be approximate above a cap.
    async fn count(&self, category: Option<&CategoryId>) -> Result<TotalCount, FetchError>;
}

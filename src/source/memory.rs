//! Seeded in-memory catalog.
//!
//! Backs the CLI demo and the driver tests. Answers all three collaborator
//! queries over one item list, with knobs for the behaviours real stores show:
//! capped batches, capped counts, latency and transient failures.

use super::{CountSource, CursorSource, OffsetSource};
use crate::model::{
    CatalogItem, CategoryId, Cursor, CursorPage, FetchError, FetchOperation, ItemId,
    ListingQuery, ListingSurface, TotalCount,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const CATEGORIES: [&str; 4] = ["mugs", "lamps", "shoes", "desks"];
const ADJECTIVES: [&str; 6] = ["Brass", "Oak", "Linen", "Stoneware", "Copper", "Walnut"];
const NOUNS: [&str; 5] = ["Mug", "Lamp", "Sneaker", "Desk", "Tray"];

/// 2024-01-01T00:00:00Z
const SEED_EPOCH: i64 = 1_704_067_200;

/// In-memory store implementing every collaborator port.
#[derive(Debug)]
pub struct InMemoryCatalog {
    items: Vec<CatalogItem>,
    batch_cap: usize,
    count_cap: Option<u64>,
    latency: Option<Duration>,
    fail_next: AtomicUsize,
    cursor_calls: AtomicUsize,
    offset_calls: AtomicUsize,
    count_calls: AtomicUsize,
}

impl InMemoryCatalog {
    /// Catalog over `items` with no caps, latency or failures.
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self {
            items,
            batch_cap: usize::MAX,
            count_cap: None,
            latency: None,
            fail_next: AtomicUsize::new(0),
            cursor_calls: AtomicUsize::new(0),
            offset_calls: AtomicUsize::new(0),
            count_calls: AtomicUsize::new(0),
        }
    }

    /// Deterministic demo catalog of `n` items for `surface`.
    pub fn seeded(surface: ListingSurface, n: usize) -> Self {
        let items = (0..n).filter_map(|i| seed_item(surface, i, n)).collect();
        Self::new(items)
    }

    /// Return at most `cap` items per cursor batch.
    pub fn with_batch_cap(mut self, cap: usize) -> Self {
        self.batch_cap = cap.max(1);
        self
    }

    /// Report counts above `cap` as approximate.
    pub fn with_count_cap(mut self, cap: u64) -> Self {
        self.count_cap = Some(cap);
        self
    }

    /// Delay every answer by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Fail the next `n` calls, whatever they are.
    pub fn fail_next(&self, n: usize) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// All items, unfiltered.
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Cursor batches served so far.
    pub fn cursor_calls(&self) -> usize {
        self.cursor_calls.load(Ordering::SeqCst)
    }

    /// Offset windows served so far.
    pub fn offset_calls(&self) -> usize {
        self.offset_calls.load(Ordering::SeqCst)
    }

    /// Counts served so far.
    pub fn count_calls(&self) -> usize {
        self.count_calls.load(Ordering::SeqCst)
    }

    /// Matching items in query order.
    fn listing(&self, query: &ListingQuery) -> Vec<&CatalogItem> {
        let mut matching: Vec<&CatalogItem> = self
            .items
            .iter()
            .filter(|item| item.in_category(query.category.as_ref()))
            .filter(|item| item.matches_search(&query.search_term))
            .collect();
        matching.sort_by(|a, b| a.compare(b, query.sort));
        matching
    }

    async fn answer(&self, operation: FetchOperation) -> Result<(), FetchError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let failed = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failed {
            return Err(FetchError::transient(operation, "injected failure"));
        }
        Ok(())
    }
}

fn seed_item(surface: ListingSurface, i: usize, n: usize) -> Option<CatalogItem> {
    let id = ItemId::new(format!("{}-{:05}", surface.as_str(), i)).ok()?;
    let category = CategoryId::new(CATEGORIES[i % CATEGORIES.len()]).ok();
    let title = format!(
        "{} {} {}",
        ADJECTIVES[(i / NOUNS.len()) % ADJECTIVES.len()],
        NOUNS[i % NOUNS.len()],
        i
    );
    let created_at = DateTime::<Utc>::from_timestamp(SEED_EPOCH + (i as i64) * 3_600, 0)
        .unwrap_or_default();
    Some(CatalogItem {
        id,
        surface,
        title,
        category,
        price_cents: ((i as u64 * 7_919) % 10_000) + 100,
        featured_rank: ((i * 37) % n.max(1)) as u32,
        created_at,
    })
}

fn encode_cursor(offset: usize) -> Cursor {
    Cursor::new(format!("c{offset}"))
}

fn decode_cursor(cursor: &Cursor, len: usize) -> Result<usize, FetchError> {
    cursor
        .as_str()
        .strip_prefix('c')
        .and_then(|raw| raw.parse::<usize>().ok())
        .filter(|offset| *offset <= len)
        .ok_or_else(|| FetchError::InvalidCursor {
            operation: FetchOperation::CursorPage,
            token: cursor.as_str().to_string(),
        })
}

#[async_trait]
impl CursorSource<CatalogItem> for InMemoryCatalog {
    async fn load_page(
        &self,
        query: &ListingQuery,
        cursor: Option<&Cursor>,
        count: usize,
    ) -> Result<CursorPage<CatalogItem>, FetchError> {
        self.cursor_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(FetchOperation::CursorPage).await?;

        let listing = self.listing(query);
        let start = match cursor {
            Some(cursor) => decode_cursor(cursor, listing.len())?,
            None => 0,
        };
        let end = start
            .saturating_add(count.min(self.batch_cap))
            .min(listing.len());
        let items = listing[start..end].iter().map(|item| (*item).clone()).collect();
        let next = (end < listing.len()).then(|| encode_cursor(end));
        Ok(CursorPage { items, next })
    }
}

#[async_trait]
impl OffsetSource<CatalogItem> for InMemoryCatalog {
    async fn fetch_window(
        &self,
        query: &ListingQuery,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CatalogItem>, FetchError> {
        self.offset_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(FetchOperation::OffsetWindow).await?;

        Ok(self
            .listing(query)
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CountSource for InMemoryCatalog {
    async fn count(&self, category: Option<&CategoryId>) -> Result<TotalCount, FetchError> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(FetchOperation::TotalCount).await?;

        let total = self
            .items
            .iter()
            .filter(|item| item.in_category(category))
            .count() as u64;
        Ok(match self.count_cap {
            Some(cap) if total > cap => TotalCount::at_least(cap),
            _ => TotalCount::exact(total),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SortKey;

    fn query(sort: SortKey) -> ListingQuery {
        ListingQuery {
            category: None,
            search_term: String::new(),
            sort,
        }
    }

    #[test]
    fn seeded_catalog_is_deterministic() {
        let a = InMemoryCatalog::seeded(ListingSurface::Products, 40);
        let b = InMemoryCatalog::seeded(ListingSurface::Products, 40);
        assert_eq!(a.items(), b.items());
        assert_eq!(a.items().len(), 40);
    }

    #[tokio::test]
    async fn cursor_pages_walk_the_listing_in_order() {
        let catalog = InMemoryCatalog::seeded(ListingSurface::Products, 25).with_batch_cap(10);
        let q = query(SortKey::PriceAsc);

        let first = catalog.load_page(&q, None, 100).await.unwrap();
        assert_eq!(first.items.len(), 10, "capped batch");
        let second = catalog
            .load_page(&q, first.next.as_ref(), 100)
            .await
            .unwrap();
        let third = catalog
            .load_page(&q, second.next.as_ref(), 100)
            .await
            .unwrap();

        assert_eq!(third.items.len(), 5);
        assert!(third.is_last());

        let walked: Vec<_> = [first.items, second.items, third.items].concat();
        let direct = catalog.fetch_window(&q, 25, 0).await.unwrap();
        assert_eq!(walked, direct);
        assert_eq!(catalog.cursor_calls(), 3);
    }

    #[tokio::test]
    async fn unknown_cursor_is_rejected() {
        let catalog = InMemoryCatalog::seeded(ListingSurface::Posts, 5);
        let result = catalog
            .load_page(&query(SortKey::Newest), Some(&Cursor::new("bogus")), 5)
            .await;
        assert!(matches!(result, Err(FetchError::InvalidCursor { .. })));
    }

    #[tokio::test]
    async fn search_and_category_filter_the_listing() {
        let catalog = InMemoryCatalog::seeded(ListingSurface::Products, 40);
        let mugs = ListingQuery {
            category: Some(CategoryId::new("mugs").unwrap()),
            search_term: String::new(),
            sort: SortKey::Newest,
        };
        let window = catalog.fetch_window(&mugs, 100, 0).await.unwrap();
        assert_eq!(window.len(), 10);
        assert!(window.iter().all(|item| item.category == mugs.category));

        let search = ListingQuery {
            search_term: "lamp".to_string(),
            ..query(SortKey::Newest)
        };
        let window = catalog.fetch_window(&search, 100, 0).await.unwrap();
        assert!(!window.is_empty());
        assert!(window.iter().all(|item| item.title.contains("Lamp")));
    }

    #[tokio::test]
    async fn counts_are_capped() {
        let catalog = InMemoryCatalog::seeded(ListingSurface::Products, 120).with_count_cap(100);
        assert_eq!(catalog.count(None).await.unwrap(), TotalCount::at_least(100));

        let mugs = CategoryId::new("mugs").unwrap();
        assert_eq!(catalog.count(Some(&mugs)).await.unwrap(), TotalCount::exact(30));
    }

    #[tokio::test(start_paused = true)]
    async fn latency_delays_every_answer() {
        let catalog = InMemoryCatalog::seeded(ListingSurface::Services, 5)
            .with_latency(Duration::from_millis(250));
        let started = tokio::time::Instant::now();

        let page = catalog.load_page(&query(SortKey::NameAsc), None, 5).await.unwrap();
        assert_eq!(page.items.len(), 5);
        assert!(started.elapsed() >= Duration::from_millis(250));
    }

    #[tokio::test]
    async fn injected_failures_are_transient_and_run_out() {
        let catalog = InMemoryCatalog::seeded(ListingSurface::Orders, 5);
        catalog.fail_next(1);

        let err = catalog.count(None).await.unwrap_err();
        assert_eq!(err.operation(), FetchOperation::TotalCount);
        assert!(catalog.count(None).await.is_ok());
    }
}

//! Filter key tracking and page navigation.
//!
//! - A filter key change resets the page number to 1.
//! - A query change (category, search, sort) also resets the cursor feed.
//! - A page-size-only change keeps the feed; the window is recomputed against it.
//! - Page-number changes never reset anything.

use crate::model::{FilterKey, FilterState, PageNumber, PageSize};
use tracing::info;

/// How a new filter state relates to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterChange {
    /// First filter state seen.
    Initial,
    /// Same filter key.
    Unchanged,
    /// Only the page size differs.
    PageSizeOnly,
    /// Category, search or sort differs.
    QueryChanged,
}

impl FilterChange {
    /// Whether the page number goes back to 1.
    pub fn resets_page(&self) -> bool {
        !matches!(self, FilterChange::Unchanged)
    }

    /// Whether accumulated feed state must be discarded.
    pub fn resets_feed(&self) -> bool {
        matches!(self, FilterChange::Initial | FilterChange::QueryChanged)
    }
}

/// Remembers the current filter key and classifies changes.
#[derive(Debug, Clone, Default)]
pub struct FilterKeyTracker {
    current: Option<FilterKey>,
}

impl FilterKeyTracker {
    /// Tracker that has seen nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current key, if any filter state was observed.
    pub fn current(&self) -> Option<&FilterKey> {
        self.current.as_ref()
    }

    /// Record `filter` as current and classify the change.
    pub fn observe(&mut self, filter: &FilterState) -> FilterChange {
        let key = filter.filter_key();
        let change = match &self.current {
            None => FilterChange::Initial,
            Some(previous) if previous == &key => FilterChange::Unchanged,
            Some(previous) if previous.query() == key.query() => FilterChange::PageSizeOnly,
            Some(_) => FilterChange::QueryChanged,
        };
        if change != FilterChange::Unchanged {
            info!(filter_key = %key, change = ?change, "filter key changed");
        }
        self.current = Some(key);
        change
    }
}

/// Page number and page size the user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageController {
    page: PageNumber,
    page_size: PageSize,
}

impl PageController {
    /// Start on page 1.
    pub fn new(page_size: PageSize) -> Self {
        Self {
            page: PageNumber::FIRST,
            page_size,
        }
    }

    /// Current page.
    pub fn page(&self) -> PageNumber {
        self.page
    }

    /// Current page size.
    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Follow a filter change.
    pub fn on_filter_change(&mut self, filter: &FilterState, change: FilterChange) {
        if change.resets_page() {
            self.page = PageNumber::FIRST;
        }
        self.page_size = filter.page_size();
    }

    /// Jump to `page`. Returns whether anything changed.
    pub fn go_to(&mut self, page: PageNumber) -> bool {
        let changed = self.page != page;
        self.page = page;
        changed
    }

    /// Switch page size. Lands on `preserve` when given, otherwise page 1.
    pub fn change_page_size(&mut self, page_size: PageSize, preserve: Option<PageNumber>) {
        self.page_size = page_size;
        self.page = preserve.unwrap_or(PageNumber::FIRST);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CategoryId, SortKey};

    fn base() -> FilterState {
        FilterState::unfiltered(SortKey::Newest, PageSize::new(12).unwrap())
    }

    #[test]
    fn first_observation_is_initial() {
        let mut tracker = FilterKeyTracker::new();
        assert_eq!(tracker.observe(&base()), FilterChange::Initial);
        assert!(tracker.current().is_some());
    }

    #[test]
    fn same_state_is_unchanged() {
        let mut tracker = FilterKeyTracker::new();
        tracker.observe(&base());
        assert_eq!(tracker.observe(&base()), FilterChange::Unchanged);
    }

    #[test]
    fn page_size_only_keeps_feed_but_resets_page() {
        let mut tracker = FilterKeyTracker::new();
        tracker.observe(&base());
        let change = tracker.observe(&base().with_page_size(PageSize::new(20).unwrap()));

        assert_eq!(change, FilterChange::PageSizeOnly);
        assert!(change.resets_page());
        assert!(!change.resets_feed());
    }

    #[test]
    fn search_change_resets_feed() {
        let mut tracker = FilterKeyTracker::new();
        tracker.observe(&base());
        let change = tracker.observe(&base().with_search("mug"));

        assert_eq!(change, FilterChange::QueryChanged);
        assert!(change.resets_feed());
    }

    #[test]
    fn category_and_sort_changes_reset_feed() {
        let mut tracker = FilterKeyTracker::new();
        tracker.observe(&base());
        assert_eq!(
            tracker.observe(&base().with_category(Some(CategoryId::new("mugs").unwrap()))),
            FilterChange::QueryChanged
        );
        assert_eq!(
            tracker.observe(&base().with_sort(SortKey::PriceAsc)),
            FilterChange::QueryChanged
        );
    }

    #[test]
    fn filter_change_resets_page_to_one() {
        let mut pages = PageController::new(PageSize::new(12).unwrap());
        pages.go_to(PageNumber::new(4).unwrap());

        pages.on_filter_change(&base().with_search("mug"), FilterChange::QueryChanged);
        assert_eq!(pages.page(), PageNumber::FIRST);
    }

    #[test]
    fn unchanged_filter_keeps_page() {
        let mut pages = PageController::new(PageSize::new(12).unwrap());
        pages.go_to(PageNumber::new(4).unwrap());

        pages.on_filter_change(&base(), FilterChange::Unchanged);
        assert_eq!(pages.page().get(), 4);
    }

    #[test]
    fn page_size_change_can_preserve_target_page() {
        let mut pages = PageController::new(PageSize::new(12).unwrap());
        pages.change_page_size(PageSize::new(20).unwrap(), Some(PageNumber::new(2).unwrap()));
        assert_eq!(pages.page().get(), 2);
        assert_eq!(pages.page_size().get(), 20);

        pages.change_page_size(PageSize::new(40).unwrap(), None);
        assert_eq!(pages.page(), PageNumber::FIRST);
    }

    #[test]
    fn go_to_reports_change() {
        let mut pages = PageController::new(PageSize::new(12).unwrap());
        assert!(!pages.go_to(PageNumber::FIRST));
        assert!(pages.go_to(PageNumber::new(2).unwrap()));
    }
}

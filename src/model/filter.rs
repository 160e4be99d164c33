//! Filter state, page newtypes and the keys derived from them.
//!
//! Two identities come out of a [`FilterState`]:
//! - [`ListingQuery`]: category, search and sort. Identifies a cursor feed.
//! - [`FilterKey`]: the query plus page size. A change resets the page number.
//!
//! A page-size-only change therefore keeps the accumulated feed while still
//! moving the user back to page 1.

use super::identifiers::CategoryId;
use super::surface::SortKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};

/// 1-based page number. Always >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct PageNumber(usize);

/// Error returned for a page number of zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Page number must be >= 1 (got {0})")]
pub struct InvalidPageNumber(pub usize);

impl PageNumber {
    /// The first page.
    pub const FIRST: Self = Self(1);

    /// Smart constructor that validates the page number is >= 1.
    pub fn new(page: usize) -> Result<Self, InvalidPageNumber> {
        if page == 0 {
            Err(InvalidPageNumber(page))
        } else {
            Ok(Self(page))
        }
    }

    /// Get the raw 1-based value.
    pub fn get(&self) -> usize {
        self.0
    }

    /// Next page.
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Previous page, saturating at the first page.
    pub fn prev(&self) -> Self {
        Self(self.0.saturating_sub(1).max(1))
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

impl TryFrom<usize> for PageNumber {
    type Error = InvalidPageNumber;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PageNumber> for usize {
    fn from(page: PageNumber) -> Self {
        page.0
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Items per page. Always > 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct PageSize(usize);

/// Error returned for a page size of zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Page size must be > 0 (got {0})")]
pub struct InvalidPageSize(pub usize);

impl PageSize {
    /// Smallest valid page size.
    pub const MIN: Self = Self(1);

    /// Smart constructor that validates the page size is > 0.
    pub fn new(size: usize) -> Result<Self, InvalidPageSize> {
        if size == 0 {
            Err(InvalidPageSize(size))
        } else {
            Ok(Self(size))
        }
    }

    /// Get the raw value.
    pub fn get(&self) -> usize {
        self.0
    }

    /// Number of accumulated items needed before `page` can be shown.
    pub fn required_for(&self, page: PageNumber) -> usize {
        page.get().saturating_mul(self.0)
    }

    /// Offset of the first item of `page`.
    pub fn offset_of(&self, page: PageNumber) -> usize {
        (page.get() - 1).saturating_mul(self.0)
    }
}

impl TryFrom<usize> for PageSize {
    type Error = InvalidPageSize;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PageSize> for usize {
    fn from(size: PageSize) -> Self {
        size.0
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Filters and sort sent to the store. Identifies one cursor feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingQuery {
    /// Category filter, `None` for all categories.
    pub category: Option<CategoryId>,
    /// Trimmed free-text search, empty when not searching.
    pub search_term: String,
    /// Requested ordering.
    pub sort: SortKey,
}

impl ListingQuery {
    /// Whether a free-text search is active.
    pub fn has_search(&self) -> bool {
        !self.search_term.is_empty()
    }
}

/// Composite identity of the current filter/sort/page-size selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterKey {
    query: ListingQuery,
    page_size: PageSize,
}

impl FilterKey {
    /// The feed identity part of the key.
    pub fn query(&self) -> &ListingQuery {
        &self.query
    }

    /// The page size part of the key.
    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// 64-bit digest, used for log correlation within one process.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.fingerprint())
    }
}

/// User-selected filter state. Immutable value: a change is a new state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    category: Option<CategoryId>,
    search_term: String,
    sort: SortKey,
    page_size: PageSize,
}

impl FilterState {
    /// Create a filter state. The search term is trimmed.
    pub fn new(
        category: Option<CategoryId>,
        search_term: impl Into<String>,
        sort: SortKey,
        page_size: PageSize,
    ) -> Self {
        Self {
            category,
            search_term: search_term.into().trim().to_string(),
            sort,
            page_size,
        }
    }

    /// Unfiltered state with the given sort and page size.
    pub fn unfiltered(sort: SortKey, page_size: PageSize) -> Self {
        Self::new(None, "", sort, page_size)
    }

    /// Copy with a different category.
    pub fn with_category(&self, category: Option<CategoryId>) -> Self {
        Self {
            category,
            ..self.clone()
        }
    }

    /// Copy with a different search term (trimmed).
    pub fn with_search(&self, search_term: impl Into<String>) -> Self {
        Self::new(
            self.category.clone(),
            search_term,
            self.sort,
            self.page_size,
        )
    }

    /// Copy with a different sort.
    pub fn with_sort(&self, sort: SortKey) -> Self {
        Self {
            sort,
            ..self.clone()
        }
    }

    /// Copy with a different page size.
    pub fn with_page_size(&self, page_size: PageSize) -> Self {
        Self {
            page_size,
            ..self.clone()
        }
    }

    /// Category filter.
    pub fn category(&self) -> Option<&CategoryId> {
        self.category.as_ref()
    }

    /// Trimmed search term.
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Sort key.
    pub fn sort(&self) -> SortKey {
        self.sort
    }

    /// Page size.
    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// The query the store is asked for.
    pub fn query(&self) -> ListingQuery {
        ListingQuery {
            category: self.category.clone(),
            search_term: self.search_term.clone(),
            sort: self.sort,
        }
    }

    /// Composite key; page number resets whenever it changes.
    pub fn filter_key(&self) -> FilterKey {
        FilterKey {
            query: self.query(),
            page_size: self.page_size,
        }
    }
}

/// How windows for a filter state are served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// The store answers `limit/offset` directly.
    DirectOffset,
    /// Offsets are emulated by accumulating a cursor feed.
    CursorEmulated,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> PageSize {
        PageSize::new(n).unwrap()
    }

    fn page(n: usize) -> PageNumber {
        PageNumber::new(n).unwrap()
    }

    #[test]
    fn page_number_rejects_zero() {
        assert_eq!(PageNumber::new(0), Err(InvalidPageNumber(0)));
    }

    #[test]
    fn page_number_prev_saturates_at_first() {
        assert_eq!(PageNumber::FIRST.prev(), PageNumber::FIRST);
        assert_eq!(page(3).prev(), page(2));
    }

    #[test]
    fn page_size_rejects_zero() {
        assert_eq!(PageSize::new(0), Err(InvalidPageSize(0)));
    }

    #[test]
    fn required_and_offset_for_page_three_of_twelve() {
        assert_eq!(size(12).required_for(page(3)), 36);
        assert_eq!(size(12).offset_of(page(3)), 24);
        assert_eq!(size(12).offset_of(PageNumber::FIRST), 0);
    }

    #[test]
    fn search_term_is_trimmed() {
        let filter = FilterState::new(None, "  boots  ", SortKey::Newest, size(12));
        assert_eq!(filter.search_term(), "boots");
        assert!(filter.query().has_search());
    }

    #[test]
    fn whitespace_search_counts_as_no_search() {
        let filter = FilterState::new(None, "   ", SortKey::Newest, size(12));
        assert!(!filter.query().has_search());
    }

    #[test]
    fn page_size_change_keeps_query_but_changes_filter_key() {
        let a = FilterState::unfiltered(SortKey::Newest, size(12));
        let b = a.with_page_size(size(20));

        assert_eq!(a.query(), b.query());
        assert_ne!(a.filter_key(), b.filter_key());
    }

    #[test]
    fn search_change_changes_query_and_filter_key() {
        let a = FilterState::unfiltered(SortKey::Newest, size(12));
        let b = a.with_search("lamp");

        assert_ne!(a.query(), b.query());
        assert_ne!(a.filter_key(), b.filter_key());
    }

    #[test]
    fn equal_states_share_fingerprint() {
        let a = FilterState::unfiltered(SortKey::PriceAsc, size(20));
        let b = FilterState::unfiltered(SortKey::PriceAsc, size(20));
        assert_eq!(a.filter_key().fingerprint(), b.filter_key().fingerprint());
    }

    #[test]
    fn page_number_deserialize_rejects_zero() {
        let parsed: Result<PageNumber, _> = serde_json::from_str("0");
        assert!(parsed.is_err());
    }
}

//! Chooses between direct offset queries and cursor emulation.

use crate::model::{FilterState, ListingSurface, Mode, SortKey};
use std::collections::BTreeSet;

/// Pure mode decision for a surface.
///
/// A filter state is offset-eligible iff it carries no search term and its sort
/// key is one the store can serve with `limit/offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeSelector {
    offset_eligible: BTreeSet<SortKey>,
}

impl ModeSelector {
    /// Selector with an explicit eligible sort set.
    pub fn new(offset_eligible: impl IntoIterator<Item = SortKey>) -> Self {
        Self {
            offset_eligible: offset_eligible.into_iter().collect(),
        }
    }

    /// Selector using the surface's default eligible sorts.
    pub fn for_surface(surface: ListingSurface) -> Self {
        Self::new(surface.offset_eligible_sorts())
    }

    /// Selector that always emulates offsets over cursors.
    pub fn cursor_only() -> Self {
        Self::new([])
    }

    /// Whether `sort` can be served directly.
    pub fn is_offset_eligible(&self, sort: SortKey) -> bool {
        self.offset_eligible.contains(&sort)
    }

    /// Mode for `filter`. No side effects.
    pub fn select(&self, filter: &FilterState) -> Mode {
        if filter.search_term().is_empty() && self.is_offset_eligible(filter.sort()) {
            Mode::DirectOffset
        } else {
            Mode::CursorEmulated
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CategoryId, PageSize};

    fn filter(search: &str, sort: SortKey) -> FilterState {
        FilterState::new(None, search, sort, PageSize::new(12).unwrap())
    }

    #[test]
    fn eligible_sort_without_search_is_direct() {
        let selector = ModeSelector::for_surface(ListingSurface::Products);
        assert_eq!(
            selector.select(&filter("", SortKey::PriceAsc)),
            Mode::DirectOffset
        );
    }

    #[test]
    fn search_term_forces_cursor_emulation() {
        let selector = ModeSelector::for_surface(ListingSurface::Products);
        assert_eq!(
            selector.select(&filter("lamp", SortKey::PriceAsc)),
            Mode::CursorEmulated
        );
    }

    #[test]
    fn ineligible_sort_forces_cursor_emulation() {
        let selector = ModeSelector::for_surface(ListingSurface::Products);
        assert_eq!(
            selector.select(&filter("", SortKey::Featured)),
            Mode::CursorEmulated
        );
    }

    #[test]
    fn category_does_not_affect_mode() {
        let selector = ModeSelector::for_surface(ListingSurface::Orders);
        let with_category = filter("", SortKey::Newest)
            .with_category(Some(CategoryId::new("pending").unwrap()));
        assert_eq!(selector.select(&with_category), Mode::DirectOffset);
    }

    #[test]
    fn cursor_only_selector_never_goes_direct() {
        let selector = ModeSelector::cursor_only();
        for sort in SortKey::ALL {
            assert_eq!(selector.select(&filter("", sort)), Mode::CursorEmulated);
        }
    }
}

//! Per-category total count cache.
//!
//! Counts are keyed by category only (not search or sort), shared by every
//! window of that category, and read-only once loaded. A failed count is not
//! retried until [`TotalCountCache::clear_errors`] runs.

use super::command::{CountLoad, LoadDisposition, Ticket};
use crate::model::{CategoryId, FetchError, TotalCount};
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
struct CountEntry {
    value: Option<TotalCount>,
    in_flight: Option<Ticket>,
    failed: bool,
}

/// Cache of category totals.
#[derive(Debug, Clone, Default)]
pub struct TotalCountCache {
    entries: HashMap<Option<CategoryId>, CountEntry>,
}

impl TotalCountCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached total for `category`.
    pub fn get(&self, category: Option<&CategoryId>) -> Option<TotalCount> {
        self.entries
            .get(&category.cloned())
            .and_then(|entry| entry.value)
    }

    /// Whether the last count for `category` failed.
    pub fn has_error(&self, category: Option<&CategoryId>) -> bool {
        self.entries
            .get(&category.cloned())
            .is_some_and(|entry| entry.failed)
    }

    /// Count load to start for `category`, unless cached, pending or failed.
    pub fn ensure(&mut self, category: Option<&CategoryId>) -> Option<CountLoad> {
        let entry = self.entries.entry(category.cloned()).or_default();
        if entry.value.is_some() || entry.in_flight.is_some() || entry.failed {
            return None;
        }
        let ticket = Ticket::issue();
        entry.in_flight = Some(ticket);
        debug!(ticket = ticket.get(), category = ?category, "count issued");
        Some(CountLoad {
            ticket,
            category: category.cloned(),
        })
    }

    /// Apply a finished count.
    pub fn apply(&mut self, load: &CountLoad, result: Result<TotalCount, FetchError>) -> LoadDisposition {
        let Some(entry) = self.entries.get_mut(&load.category) else {
            return LoadDisposition::StaleDiscarded;
        };
        if entry.in_flight != Some(load.ticket) {
            return LoadDisposition::StaleDiscarded;
        }
        entry.in_flight = None;
        match result {
            Ok(count) => {
                entry.value = Some(count);
                entry.failed = false;
                LoadDisposition::Applied
            }
            Err(err) => {
                warn!(error = %err, category = ?load.category, "count failed");
                entry.failed = true;
                LoadDisposition::Failed
            }
        }
    }

    /// Allow failed counts to be requested again.
    pub fn clear_errors(&mut self) {
        for entry in self.entries.values_mut() {
            entry.failed = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FetchOperation;

    fn shoes() -> CategoryId {
        CategoryId::new("shoes").unwrap()
    }

    #[test]
    fn ensure_issues_once_per_category() {
        let mut cache = TotalCountCache::new();
        assert!(cache.ensure(Some(&shoes())).is_some());
        assert!(cache.ensure(Some(&shoes())).is_none(), "pending");
        assert!(cache.ensure(None).is_some(), "other key");
    }

    #[test]
    fn applied_count_is_cached() {
        let mut cache = TotalCountCache::new();
        let load = cache.ensure(Some(&shoes())).unwrap();
        assert_eq!(cache.apply(&load, Ok(TotalCount::exact(42))), LoadDisposition::Applied);

        assert_eq!(cache.get(Some(&shoes())), Some(TotalCount::exact(42)));
        assert!(cache.ensure(Some(&shoes())).is_none());
    }

    #[test]
    fn failure_is_not_retried_until_cleared() {
        let mut cache = TotalCountCache::new();
        let load = cache.ensure(None).unwrap();
        cache.apply(
            &load,
            Err(FetchError::transient(FetchOperation::TotalCount, "slow")),
        );

        assert!(cache.has_error(None));
        assert!(cache.ensure(None).is_none());
        cache.clear_errors();
        assert!(cache.ensure(None).is_some());
    }

    #[test]
    fn unknown_ticket_is_stale() {
        let mut cache = TotalCountCache::new();
        let load = cache.ensure(None).unwrap();
        let mut other = load.clone();
        other.ticket = Ticket::issue();
        assert_eq!(
            cache.apply(&other, Ok(TotalCount::exact(1))),
            LoadDisposition::StaleDiscarded
        );
        assert_eq!(cache.get(None), None);
    }
}

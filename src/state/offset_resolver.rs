//! Offset emulation over a cursor feed.
//!
//! [`resolve`] is a level-triggered reconciliation step, not a one-shot action:
//! the engine re-runs it whenever the feed length, status, page number or page
//! size changes, until the window stops loading. The setpoint is
//! `required = page_number * page_size` accumulated items.

use super::command::CursorLoad;
use super::cursor_feed::CursorFeed;
use crate::model::{Mode, PageNumber, PageSize, ResolvedWindow};

/// Window for the current state plus the batch to start, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<T> {
    /// Window to show now.
    pub window: ResolvedWindow<T>,
    /// Batch the caller must start to converge.
    pub load: Option<CursorLoad>,
}

/// Resolve one page window against an accumulating feed.
///
/// - Enough items, or the feed is exhausted: pure slice, no load.
/// - Otherwise: one `request_more` for the whole deficit and a loading window
///   carrying `previous` (the last window shown for this filter).
/// - A batch already in flight is retargeted to `required`, so follow-ups
///   stop at the current page and not at an abandoned one.
///
/// A feed whose last batch failed is not re-requested here; the caller clears
/// the error on the next user action so failures never retry in a loop.
pub fn resolve<T: Clone>(
    page: PageNumber,
    page_size: PageSize,
    feed: &mut CursorFeed<T>,
    previous: &[T],
) -> Resolution<T> {
    let required = page_size.required_for(page);
    let available = feed.len();
    let satisfied = available >= required || feed.is_exhausted();
    feed.retarget(required);

    let load = if satisfied || feed.has_error() {
        None
    } else {
        feed.request_more(required - available)
    };

    Resolution {
        window: window_of(page, page_size, feed, previous),
        load,
    }
}

/// Window for the feed as it stands, without starting any load.
pub fn window_of<T: Clone>(
    page: PageNumber,
    page_size: PageSize,
    feed: &CursorFeed<T>,
    previous: &[T],
) -> ResolvedWindow<T> {
    let required = page_size.required_for(page);
    let start = page_size.offset_of(page);
    let available = feed.len();

    if available >= required || feed.is_exhausted() {
        let end = required.min(available);
        return ResolvedWindow {
            page_number: page,
            page_size,
            items: feed.items()[start.min(end)..end].to_vec(),
            is_loading: false,
            has_error: feed.has_error(),
            total_count: None,
            mode: Mode::CursorEmulated,
            has_next_page: available > required || !feed.is_exhausted(),
        };
    }

    ResolvedWindow {
        page_number: page,
        page_size,
        items: previous.to_vec(),
        is_loading: true,
        has_error: feed.has_error(),
        total_count: None,
        mode: Mode::CursorEmulated,
        has_next_page: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cursor, CursorPage, FetchError, FetchOperation, ListingQuery, SortKey};
    use crate::state::cursor_feed::DEFAULT_MAX_BATCH;

    fn feed() -> CursorFeed<u32> {
        CursorFeed::new(
            ListingQuery {
                category: None,
                search_term: String::new(),
                sort: SortKey::Featured,
            },
            DEFAULT_MAX_BATCH,
        )
    }

    fn page(n: usize) -> PageNumber {
        PageNumber::new(n).unwrap()
    }

    fn size(n: usize) -> PageSize {
        PageSize::new(n).unwrap()
    }

    /// Feed holding `0..n` with more available.
    fn loaded(n: u32) -> CursorFeed<u32> {
        let mut feed = feed();
        let load = feed.request_more(n as usize).unwrap();
        feed.apply(&load, Ok(CursorPage::more((0..n).collect(), Cursor::new("c"))));
        feed
    }

    #[test]
    fn page_three_of_twelve_on_empty_feed_requests_thirty_six() {
        let mut feed = feed();
        let resolution = resolve(page(3), size(12), &mut feed, &[]);

        let load = resolution.load.expect("should request the deficit");
        assert_eq!(load.count, 36);
        assert!(resolution.window.is_loading);
        assert!(resolution.window.items.is_empty());
    }

    #[test]
    fn page_three_resolves_to_slice_once_loaded() {
        let mut feed = feed();
        let load = resolve(page(3), size(12), &mut feed, &[]).load.unwrap();
        let update = feed.apply(&load, Ok(CursorPage::more((0..20).collect(), Cursor::new("c20"))));
        let follow_up = update.follow_up.unwrap();
        feed.apply(&follow_up, Ok(CursorPage::more((20..36).collect(), Cursor::new("c36"))));

        let resolution = resolve(page(3), size(12), &mut feed, &[]);
        assert_eq!(resolution.load, None);
        assert!(!resolution.window.is_loading);
        assert_eq!(resolution.window.items, (24..36).collect::<Vec<u32>>());
    }

    #[test]
    fn exhausted_short_feed_yields_partial_final_window() {
        let mut feed = feed();
        let load = feed.request_more(12).unwrap();
        feed.apply(&load, Ok(CursorPage::last((0..10).collect())));

        let resolution = resolve(page(1), size(12), &mut feed, &[]);
        assert_eq!(resolution.window.items.len(), 10);
        assert!(!resolution.window.is_loading);
        assert!(!resolution.window.has_next_page);
        assert!(resolution.window.is_exhausted_short());
    }

    #[test]
    fn page_beyond_exhausted_feed_is_empty_and_final() {
        let mut feed = feed();
        let load = feed.request_more(12).unwrap();
        feed.apply(&load, Ok(CursorPage::last((0..10).collect())));

        let resolution = resolve(page(4), size(12), &mut feed, &[]);
        assert!(resolution.window.items.is_empty());
        assert!(!resolution.window.is_loading);
        assert_eq!(resolution.load, None);
    }

    #[test]
    fn page_size_growth_requests_only_the_delta() {
        let mut feed = loaded(12);
        let resolution = resolve(page(1), size(20), &mut feed, &[]);

        assert_eq!(resolution.load.map(|l| l.count), Some(8));
    }

    #[test]
    fn backward_navigation_is_a_pure_slice() {
        let mut feed = loaded(36);
        let resolution = resolve(page(2), size(12), &mut feed, &[]);

        assert_eq!(resolution.load, None);
        assert_eq!(resolution.window.items, (12..24).collect::<Vec<u32>>());
        assert!(resolution.window.has_next_page);
    }

    #[test]
    fn loading_window_keeps_previous_items() {
        let mut feed = loaded(12);
        let previous: Vec<u32> = (0..12).collect();
        let resolution = resolve(page(2), size(12), &mut feed, &previous);

        assert!(resolution.window.is_loading);
        assert_eq!(resolution.window.items, previous);
    }

    #[test]
    fn in_flight_feed_is_not_asked_again() {
        let mut feed = feed();
        let first = resolve(page(1), size(12), &mut feed, &[]);
        let second = resolve(page(2), size(12), &mut feed, &[]);

        assert!(first.load.is_some());
        assert_eq!(second.load, None, "a pending load blocks new requests");
        assert!(second.window.is_loading);
    }

    #[test]
    fn going_back_mid_catch_up_drops_remaining_batches() {
        let mut feed = loaded(12);
        let load = resolve(page(25), size(12), &mut feed, &[]).load.unwrap();
        assert_eq!(feed.target_len(), 300);

        let resolution = resolve(page(1), size(12), &mut feed, &[]);
        assert_eq!(resolution.load, None);
        assert!(!resolution.window.is_loading);
        assert_eq!(feed.target_len(), 12);

        let update = feed.apply(&load, Ok(CursorPage::more((12..112).collect(), Cursor::new("c112"))));
        assert_eq!(update.follow_up, None);
    }

    #[test]
    fn failed_feed_is_not_re_requested_until_error_cleared() {
        let mut feed = feed();
        let load = resolve(page(1), size(12), &mut feed, &[]).load.unwrap();
        feed.apply(
            &load,
            Err(FetchError::transient(FetchOperation::CursorPage, "down")),
        );

        let resolution = resolve(page(1), size(12), &mut feed, &[]);
        assert_eq!(resolution.load, None);
        assert!(resolution.window.has_error);
        assert!(
            resolution.window.is_loading,
            "an unsatisfied window stays loading until a retry converges"
        );

        feed.clear_error();
        let resolution = resolve(page(1), size(12), &mut feed, &[]);
        assert_eq!(resolution.load.map(|l| l.count), Some(12));
    }

    #[test]
    fn window_of_never_starts_a_load() {
        let feed = loaded(12);
        let window = window_of(page(3), size(12), &feed, &[]);

        assert!(window.is_loading);
        assert!(!feed.is_in_flight());
    }

    #[test]
    fn far_jump_issues_one_request_for_whole_deficit() {
        let mut feed = loaded(12);
        let resolution = resolve(page(5), size(12), &mut feed, &[]);

        let load = resolution.load.unwrap();
        assert_eq!(feed.target_len(), 60);
        assert_eq!(load.count, 48);
    }
}

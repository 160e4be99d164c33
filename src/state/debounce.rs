//! Search input debouncing.
//!
//! Keystrokes are coalesced so only a term that stayed unchanged for the quiet
//! period becomes a new filter state. Time is passed in, so the debouncer is
//! a plain value and tests need no clock.

use std::time::{Duration, Instant};

/// Default quiet period before a search term settles.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Coalesces search input into at most one settled term per quiet period.
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    quiet: Duration,
    pending: Option<(String, Instant)>,
    settled: String,
}

impl SearchDebouncer {
    /// Debouncer with the given quiet period and nothing typed yet.
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
            settled: String::new(),
        }
    }

    /// Quiet period.
    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Last term that settled.
    pub fn settled(&self) -> &str {
        &self.settled
    }

    /// Record a keystroke. Restarts the quiet period.
    pub fn input(&mut self, term: impl Into<String>, now: Instant) {
        let term = term.into().trim().to_string();
        self.pending = Some((term, now + self.quiet));
    }

    /// When the pending term settles, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at)
    }

    /// Settled term, once the quiet period has passed.
    ///
    /// Returns `None` while still typing or when the term equals the last
    /// settled one.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let due = self.pending.as_ref().is_some_and(|(_, at)| now >= *at);
        if !due {
            return None;
        }
        let (term, _) = self.pending.take()?;
        if term == self.settled {
            return None;
        }
        self.settled = term.clone();
        Some(term)
    }

    /// Forget pending input and set the settled term directly.
    pub fn reset(&mut self, settled: impl Into<String>) {
        self.pending = None;
        self.settled = settled.into();
    }
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEBOUNCE)
    }
}

use std::time::{Duration, Instant};

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);
pub const MIN_QUERY_CHARS: usize = 2;

/// A trimmed search string that is long enough to send to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.chars().count() < MIN_QUERY_CHARS {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
struct PendingLookup {
    query: SearchQuery,
    due: Instant,
}

/// Cancellable single-slot scheduler for suggestion lookups.
///
/// Each keystroke replaces whatever was pending, so at most one lookup can ever
/// fire per quiet period. The handle holds no timer of its own; the UI loop calls
/// [`SearchDebouncer::poll`] on every tick.
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    quiet: Duration,
    pending: Option<PendingLookup>,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchDebouncer {
    pub fn new() -> Self {
        Self::with_quiet_period(SEARCH_DEBOUNCE)
    }

    pub fn with_quiet_period(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// Cancels the pending lookup and, when `text` is a valid query, schedules a
    /// new one `quiet` after `now`. Returns whether a lookup is now scheduled.
    pub fn on_input(&mut self, text: &str, now: Instant) -> bool {
        self.pending = SearchQuery::parse(text).map(|query| PendingLookup {
            query,
            due: now + self.quiet,
        });
        self.pending.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Hands out the pending query once its deadline has passed. Fires at most
    /// once per schedule.
    pub fn poll(&mut self, now: Instant) -> Option<SearchQuery> {
        let due = self.pending.as_ref()?.due;
        if now < due {
            return None;
        }
        self.pending.take().map(|p| p.query)
    }

    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|p| p.due.saturating_duration_since(now))
    }
}

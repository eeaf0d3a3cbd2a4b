//! Query trigger gating
//!
//! A query fires at most once per user trigger: the click counter must move
//! past the last handled value, or a page change must arrive for a query that
//! already ran. Re-renders and unrelated input edits never pass the gate.

use serde::Serialize;

/// Explicit "do nothing" outcome, distinct from success and failure.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Update<T> {
    NoUpdate,
    Changed(T),
}

impl<T> Update<T> {
    pub fn is_no_update(&self) -> bool {
        matches!(self, Update::NoUpdate)
    }

    pub fn changed(self) -> Option<T> {
        match self {
            Update::Changed(value) => Some(value),
            Update::NoUpdate => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Update<U> {
        match self {
            Update::Changed(value) => Update::Changed(f(value)),
            Update::NoUpdate => Update::NoUpdate,
        }
    }
}

/// Lifecycle of one adapter instance's query cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryState {
    #[default]
    Idle,
    AwaitingTrigger,
    Executing,
    Errored,
}

/// Page coordinates of a query: (0-indexed page, page size).
pub type PageKey = (u32, u32);

/// Last handled trigger token and the page it was handled for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerGate {
    last_handled: u64,
    last_page: Option<PageKey>,
}

impl TriggerGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_handled(&self) -> u64 {
        self.last_handled
    }

    /// Whether `token` at `page` is a genuine new request.
    pub fn admits(&self, token: u64, page: PageKey) -> bool {
        if token > self.last_handled {
            return true;
        }
        // Same click, new page of an already executed query.
        match self.last_page {
            Some(last) => token == self.last_handled && last != page,
            None => false,
        }
    }

    /// Record a dispatched query, whether it succeeded or failed.
    pub fn mark_handled(&mut self, token: u64, page: PageKey) {
        self.last_handled = self.last_handled.max(token);
        self.last_page = Some(page);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_requires_advancing_token() {
        let mut gate = TriggerGate::new();
        assert!(!gate.admits(0, (0, 20)));
        assert!(gate.admits(1, (0, 20)));

        gate.mark_handled(1, (0, 20));
        assert!(!gate.admits(1, (0, 20)));
        assert!(!gate.admits(0, (0, 20)));
        assert!(gate.admits(2, (0, 20)));
    }

    #[test]
    fn test_page_change_reuses_token() {
        let mut gate = TriggerGate::new();
        // no query has run yet: paging alone does nothing
        assert!(!gate.admits(0, (1, 20)));

        gate.mark_handled(3, (0, 20));
        assert!(gate.admits(3, (1, 20)));
        assert!(gate.admits(3, (0, 50)));
        // stale token with a new page is still rejected
        assert!(!gate.admits(2, (1, 20)));
    }

    #[test]
    fn test_mark_handled_never_moves_backwards() {
        let mut gate = TriggerGate::new();
        gate.mark_handled(5, (0, 20));
        gate.mark_handled(4, (1, 20));
        assert_eq!(gate.last_handled(), 5);
    }

    #[test]
    fn test_update_helpers() {
        let update: Update<u32> = Update::Changed(2);
        assert_eq!(update.clone().map(|v| v * 2), Update::Changed(4));
        assert_eq!(update.changed(), Some(2));
        assert!(Update::<u32>::NoUpdate.is_no_update());
    }
}

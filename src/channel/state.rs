//! State shared by the two ends of one pipe.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// Invalidation flag plus the last written value.
///
/// `last == None` means nothing was written yet; `Some(None)` means the last
/// write carried an absent value.
pub(crate) struct SharedState<T> {
    invalidated: AtomicBool,
    last: Mutex<Option<Option<T>>>,
}

impl<T> SharedState<T> {
    pub(crate) fn new() -> Self {
        Self {
            invalidated: AtomicBool::new(false),
            last: Mutex::new(None),
        }
    }

    #[inline]
    pub(crate) fn is_invalidated(&self) -> bool {
        self.invalidated.load(Ordering::Acquire)
    }

    /// One-way transition. Returns `true` on the call that flipped the flag.
    pub(crate) fn invalidate(&self) -> bool {
        !self.invalidated.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn has_written(&self) -> bool {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Overwrites the single value slot.
    pub(crate) fn record(&self, value: Option<T>) {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(value);
    }
}

impl<T: Clone> SharedState<T> {
    /// Last written value, or `None` if nothing was written.
    pub(crate) fn last(&self) -> Option<Option<T>> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unwritten_and_valid() {
        let s: SharedState<i32> = SharedState::new();
        assert!(!s.is_invalidated());
        assert!(!s.has_written());
        assert_eq!(s.last(), None);
    }

    #[test]
    fn absent_write_counts_as_written() {
        let s: SharedState<i32> = SharedState::new();
        s.record(None);
        assert!(s.has_written());
        assert_eq!(s.last(), Some(None));
        s.record(Some(4));
        assert_eq!(s.last(), Some(Some(4)));
    }

    #[test]
    fn invalidate_flips_once() {
        let s: SharedState<()> = SharedState::new();
        assert!(s.invalidate());
        assert!(!s.invalidate());
        assert!(s.is_invalidated());
    }
}

//! Total game count held behind an injectable counter.

use std::sync::atomic::{AtomicU64, Ordering};

/// Running total of live catalog games.
///
/// An unset counter reports `None`; the owner recomputes the value from the
/// repository and stores it with [`GameCounter::set`].
pub trait GameCounter: Send + Sync {
    fn get(&self) -> Option<u64>;

    fn set(&self, value: u64);

    /// No-op while unset.
    fn increment(&self);

    /// No-op while unset; never goes below zero.
    fn decrement(&self);

    /// Forget the value so the next read recomputes it.
    fn reset(&self);
}

const UNSET: u64 = u64::MAX;

/// Lock-free [`GameCounter`].
#[derive(Debug)]
pub struct AtomicGameCounter {
    value: AtomicU64,
}

impl AtomicGameCounter {
    pub fn new() -> Self {
        Self {
            value: AtomicU64::new(UNSET),
        }
    }
}

impl Default for AtomicGameCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl GameCounter for AtomicGameCounter {
    fn get(&self) -> Option<u64> {
        match self.value.load(Ordering::Acquire) {
            UNSET => None,
            value => Some(value),
        }
    }

    fn set(&self, value: u64) {
        self.value.store(value.min(UNSET - 1), Ordering::Release);
    }

    fn increment(&self) {
        let _ = self
            .value
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| {
                (v < UNSET - 1).then(|| v + 1)
            });
    }

    fn decrement(&self) {
        let _ = self
            .value
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| {
                (v != UNSET && v > 0).then(|| v - 1)
            });
    }

    fn reset(&self) {
        self.value.store(UNSET, Ordering::Release);
    }
}

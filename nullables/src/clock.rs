//! Nullable clock: deterministic time for testing.

use gate_types::Timestamp;
use std::sync::atomic::{AtomicU64, Ordering};

/// A deterministic clock for testing.
///
/// Time only advances when you tell it to.
pub struct NullClock {
    current: AtomicU64,
}

impl NullClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            current: AtomicU64::new(initial_secs),
        }
    }

    /// Get the current time.
    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.current.load(Ordering::SeqCst))
    }

    /// Advance time by a number of seconds.
    pub fn advance(&self, secs: u64) {
        self.current.fetch_add(secs, Ordering::SeqCst);
    }

    /// Set the time to a specific value.
    pub fn set(&self, secs: u64) {
        self.current.store(secs, Ordering::SeqCst);
    }

    /// A timestamp `secs` seconds from now.
    pub fn in_secs(&self, secs: u64) -> Timestamp {
        Timestamp::new(self.current.load(Ordering::SeqCst) + secs)
    }

    /// A timestamp `secs` seconds ago, saturating at the epoch.
    pub fn secs_ago(&self, secs: u64) -> Timestamp {
        Timestamp::new(self.current.load(Ordering::SeqCst).saturating_sub(secs))
    }
}

impl Default for NullClock {
    fn default() -> Self {
        Self::new(1_700_000_000)
    }
}

//! Monotonic time adapter.
//!
//! Implements [`TimePort`] on top of `std::time::Instant`, anchored at the
//! moment the adapter is created.  Wall-clock adjustments (NTP sync after
//! the Pi joins a network) never move it.

use core::time::Duration;
use std::time::Instant;

use crate::app::ports::TimePort;

/// Time source for the rig's [`Timer`](crate::timer::Timer).
#[derive(Debug, Clone, Copy)]
pub struct MonotonicTime {
    origin: Instant,
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicTime {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Whole seconds since the adapter was created.
    pub fn uptime_secs(&self) -> u64 {
        self.origin.elapsed().as_secs()
    }
}

impl TimePort for MonotonicTime {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

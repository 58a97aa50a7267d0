//! Pausable stopwatch with marks and drift-corrected named intervals.
//!
//! ```text
//!             start                pause
//!  Stopped ──────────▶ Running ◀──────────▶ Paused
//!     ▲                   │       resume       │
//!     └────── stop ───────┴────────────────────┘
//! ```
//!
//! Every other transition is rejected as a logged no-op.  The control loop
//! polls [`Timer::interval_elapsed`] once per tick for each scheduled
//! action; with catch-up enabled the next boundary advances by exactly one
//! interval, so irregular polling never makes the schedule drift.

use core::time::Duration;
use std::collections::HashMap;

use log::{debug, warn};

use crate::adapters::time::MonotonicTime;
use crate::app::ports::TimePort;

/// Lifecycle state of a [`Timer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Stopped,
    Running,
    Paused,
}

/// Stopwatch driven by a [`TimePort`].
pub struct Timer<T: TimePort = MonotonicTime> {
    clock: T,
    state: TimerState,
    /// Start of the current running segment (`None` unless Running).
    start_time: Option<Duration>,
    /// Elapsed time folded in from previous running segments.
    accumulated: Duration,
    marks: HashMap<String, Duration>,
    /// Last boundary at which each named interval fired.
    named_intervals: HashMap<String, Duration>,
}

impl Timer<MonotonicTime> {
    pub fn new() -> Self {
        Self::with_clock(MonotonicTime::new())
    }
}

impl Default for Timer<MonotonicTime> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TimePort> Timer<T> {
    pub fn with_clock(clock: T) -> Self {
        Self {
            clock,
            state: TimerState::Stopped,
            start_time: None,
            accumulated: Duration::ZERO,
            marks: HashMap::new(),
            named_intervals: HashMap::new(),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn is_paused(&self) -> bool {
        self.state == TimerState::Paused
    }

    pub fn is_stopped(&self) -> bool {
        self.state == TimerState::Stopped
    }

    /// The boundary currently recorded for a named interval.
    pub fn named_interval(&self, name: &str) -> Option<Duration> {
        self.named_intervals.get(name).copied()
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start from zero.  Returns `false` (and logs) unless Stopped.
    pub fn start(&mut self) -> bool {
        if !self.is_stopped() {
            warn!("Timer is already started");
            return false;
        }
        self.accumulated = Duration::ZERO;
        self.marks.clear();
        self.named_intervals.clear();
        self.start_time = Some(self.clock.now());
        self.state = TimerState::Running;
        true
    }

    /// Freeze elapsed time.  Returns `false` (and logs) unless Running.
    pub fn pause(&mut self) -> bool {
        match self.state {
            TimerState::Running => {
                let now = self.clock.now();
                if let Some(start) = self.start_time.take() {
                    self.accumulated += now.saturating_sub(start);
                }
                self.state = TimerState::Paused;
                true
            }
            TimerState::Paused => {
                warn!("Timer is already paused");
                false
            }
            TimerState::Stopped => {
                warn!("Timer is not running");
                false
            }
        }
    }

    /// Continue after a pause.  Returns `false` (and logs) unless Paused.
    pub fn resume(&mut self) -> bool {
        match self.state {
            TimerState::Paused => {
                self.start_time = Some(self.clock.now());
                self.state = TimerState::Running;
                true
            }
            TimerState::Running => {
                warn!("Timer is already running");
                false
            }
            TimerState::Stopped => {
                warn!("Timer is not paused");
                false
            }
        }
    }

    /// Stop and clear everything, returning the final elapsed time.
    /// Returns `None` (and logs) when already Stopped.
    pub fn stop(&mut self) -> Option<Duration> {
        if self.is_stopped() {
            warn!("Timer is not running");
            return None;
        }
        let elapsed = self.elapsed();
        self.start_time = None;
        self.accumulated = Duration::ZERO;
        self.marks.clear();
        self.named_intervals.clear();
        self.state = TimerState::Stopped;
        elapsed
    }

    /// Move the zero point to now without stopping.  A paused timer comes
    /// back running.  With `clear_intervals == false` every named interval
    /// is re-baselined to the new zero instead of being dropped.
    pub fn reset(&mut self, clear_intervals: bool) -> bool {
        if self.is_stopped() {
            warn!("Timer is not running or paused, nothing to reset");
            return false;
        }
        self.start_time = Some(self.clock.now());
        self.accumulated = Duration::ZERO;
        self.marks.clear();
        self.state = TimerState::Running;

        if clear_intervals {
            self.named_intervals.clear();
        } else {
            for boundary in self.named_intervals.values_mut() {
                *boundary = Duration::ZERO;
            }
        }
        true
    }

    // ── Measurement ───────────────────────────────────────────

    /// Total running time, excluding paused stretches.  `None` when Stopped.
    pub fn elapsed(&self) -> Option<Duration> {
        match self.state {
            TimerState::Running => {
                let start = self.start_time.unwrap_or_else(|| self.clock.now());
                Some(self.accumulated + self.clock.now().saturating_sub(start))
            }
            TimerState::Paused => Some(self.accumulated),
            TimerState::Stopped => {
                warn!("Timer is not running or paused, cannot calculate elapsed time");
                None
            }
        }
    }

    /// Record the current elapsed time under `name`.
    pub fn mark(&mut self, name: &str) -> bool {
        if self.is_stopped() {
            warn!("Timer is not running or paused, cannot set mark '{}'", name);
            return false;
        }
        let Some(now) = self.elapsed() else {
            return false;
        };
        self.marks.insert(name.to_string(), now);
        true
    }

    /// Elapsed time since `mark(name)`.  `None` if the mark is missing or
    /// the timer is stopped.
    pub fn since_mark(&self, name: &str) -> Option<Duration> {
        if self.is_stopped() {
            warn!("Timer is not running or paused, cannot measure since mark '{}'", name);
            return None;
        }
        let Some(mark) = self.marks.get(name) else {
            warn!("Mark '{}' does not exist", name);
            return None;
        };
        self.elapsed().map(|now| now.saturating_sub(*mark))
    }

    /// Set the boundary of a named interval to the current elapsed time.
    pub fn set_named_interval(&mut self, name: &str) -> bool {
        if self.is_stopped() {
            warn!("Timer is not running or paused, cannot create interval '{}'", name);
            return false;
        }
        let Some(now) = self.elapsed() else {
            return false;
        };
        self.named_intervals.insert(name.to_string(), now);
        true
    }

    /// `true` once per `interval` for the named schedule.
    ///
    /// Always `false` while Stopped or Paused.  The first call for a name
    /// only records the boundary.  When due, the boundary advances by
    /// exactly `interval` if `catch_up` is set (missed periods fire on
    /// subsequent calls), otherwise it snaps to the current elapsed time
    /// and missed periods are skipped.
    pub fn interval_elapsed(&mut self, interval: Duration, name: &str, catch_up: bool) -> bool {
        if !self.is_running() {
            return false;
        }

        let Some(last) = self.named_intervals.get(name).copied() else {
            debug!("Interval '{}' does not exist, creating it", name);
            self.set_named_interval(name);
            return false;
        };

        let Some(now) = self.elapsed() else {
            return false;
        };

        if now.saturating_sub(last) >= interval {
            let next = if catch_up { last + interval } else { now };
            self.named_intervals.insert(name.to_string(), next);
            true
        } else {
            false
        }
    }
}

//! Tick and flush cadence.
//!
//! The driver decides, given the current wall-clock instant, whether the
//! engine owes a slow step, a fast burst, or an update flush. It holds no
//! reference to the engine; the engine polls it and performs the work, so
//! the whole arrangement stays single-threaded and testable with synthetic
//! instants.

use std::time::{Duration, Instant};

use crate::config::EngineParams;

/// The installed stepping mode. Normal and fast are mutually exclusive;
/// installing one replaces the other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DriverMode {
    /// No stepping; flushing continues.
    #[default]
    Stopped,
    /// One slow step (`updateGates`) per interval.
    Normal,
    /// Event steps (`updateGatesNext`) in bounded bursts while work is
    /// pending; idle ticks are not inserted.
    Fast,
}

/// Cadence state for the two periodic activities sharing the engine.
#[derive(Debug)]
pub struct Driver {
    mode: DriverMode,
    interval: Duration,
    flush_interval: Duration,
    fast_burst: Duration,
    next_step: Option<Instant>,
    next_flush: Option<Instant>,
}

impl Driver {
    /// Creates a stopped driver with the configured cadences.
    pub fn new(params: &EngineParams) -> Self {
        Self {
            mode: DriverMode::Stopped,
            interval: Duration::from_millis(params.tick_interval_ms),
            flush_interval: Duration::from_millis(params.flush_interval_ms),
            fast_burst: Duration::from_millis(params.fast_burst_ms),
            next_step: None,
            next_flush: None,
        }
    }

    /// Returns the installed mode.
    pub fn mode(&self) -> DriverMode {
        self.mode
    }

    /// Returns the fast-mode burst budget.
    pub fn fast_burst(&self) -> Duration {
        self.fast_burst
    }

    /// Sets the normal-mode interval. Takes effect from the next step.
    pub fn set_interval(&mut self, ms: u64) {
        self.interval = Duration::from_millis(ms);
    }

    /// Installs the normal driver, replacing any current mode.
    pub fn start(&mut self, now: Instant) {
        self.mode = DriverMode::Normal;
        self.next_step = Some(now + self.interval);
        self.ensure_flush_deadline(now);
    }

    /// Installs the fast driver, replacing any current mode.
    pub fn start_fast(&mut self, now: Instant) {
        self.mode = DriverMode::Fast;
        self.next_step = Some(now + self.fast_burst);
        self.ensure_flush_deadline(now);
    }

    /// Uninstalls the driver. In-flight work is unaffected; pending
    /// updates still flush.
    pub fn stop(&mut self) {
        self.mode = DriverMode::Stopped;
        self.next_step = None;
    }

    /// True when the installed mode owes a step (or burst) at `now`.
    pub fn step_due(&self, now: Instant) -> bool {
        match (self.mode, self.next_step) {
            (DriverMode::Stopped, _) | (_, None) => false,
            (_, Some(deadline)) => now >= deadline,
        }
    }

    /// Records a completed step and schedules the next one.
    pub fn step_done(&mut self, now: Instant) {
        let period = match self.mode {
            DriverMode::Normal => self.interval,
            DriverMode::Fast => self.fast_burst,
            DriverMode::Stopped => return,
        };
        self.next_step = Some(now + period);
    }

    /// True when an update flush is owed at `now`.
    pub fn flush_due(&mut self, now: Instant) -> bool {
        self.ensure_flush_deadline(now);
        self.next_flush.map_or(false, |deadline| now >= deadline)
    }

    /// Records a completed flush and schedules the next one.
    pub fn flush_done(&mut self, now: Instant) {
        self.next_flush = Some(now + self.flush_interval);
    }

    fn ensure_flush_deadline(&mut self, now: Instant) {
        if self.next_flush.is_none() {
            self.next_flush = Some(now + self.flush_interval);
        }
    }
}

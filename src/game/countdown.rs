//! Countdown controller
//!
//! A single monotonic timer that gates the end of the discussion phase.
//! Completion is edge-triggered: [`TimerSignal::Complete`] is reported
//! exactly once per start, whether the timer ran out or was skipped.
//!
//! The countdown owns the scheduled tick task for as long as it runs. The
//! task is torn down when the timer completes, is skipped or stopped, or
//! when the countdown itself is dropped.

use tracing::{debug, trace};

use super::ticker::{TICK_PERIOD, Tick, TickScheduler, TickTask};

/// Signal raised by a countdown operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSignal {
    /// Nothing to report
    Pending,
    /// The timer has just completed
    Complete,
}

/// Countdown state: remaining whole seconds and whether it is running.
#[derive(Debug, Default)]
pub struct Countdown {
    remaining: u64,
    running: bool,
    completed: bool,
    epoch: u64,
    task: Option<TickTask>,
}

impl Countdown {
    /// Creates an idle countdown.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds left on the clock.
    #[must_use]
    pub const fn remaining_seconds(&self) -> u64 {
        self.remaining
    }

    /// Whether the clock is counting down.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Epoch of the current (or last) run.
    #[cfg(test)]
    const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether a tick task is currently scheduled.
    #[cfg(test)]
    const fn has_task(&self) -> bool {
        self.task.is_some()
    }

    /// Starts the countdown and schedules its tick task.
    ///
    /// Calling this while the countdown is running is a no-op. A zero
    /// duration completes immediately without scheduling anything.
    pub fn start(&mut self, seconds: u64, epoch: u64, scheduler: &dyn TickScheduler) -> TimerSignal {
        if self.running {
            debug!(epoch = self.epoch, "countdown already running");
            return TimerSignal::Pending;
        }

        self.remaining = seconds;
        self.epoch = epoch;
        self.completed = false;

        if seconds == 0 {
            self.completed = true;
            return TimerSignal::Complete;
        }

        self.running = true;
        self.task = Some(scheduler.schedule(epoch, TICK_PERIOD));
        debug!(seconds, epoch, "countdown started");
        TimerSignal::Pending
    }

    /// Returns `true` if `tick` belongs to the running countdown.
    #[must_use]
    pub const fn accepts(&self, tick: Tick) -> bool {
        self.running && tick.epoch == self.epoch
    }

    /// Counts down one second.
    pub fn tick(&mut self) -> TimerSignal {
        if !self.running || self.remaining == 0 {
            return TimerSignal::Pending;
        }

        self.remaining -= 1;
        trace!(remaining = self.remaining, "countdown tick");
        if self.remaining > 0 {
            return TimerSignal::Pending;
        }

        self.finish()
    }

    /// Forces the clock to zero and completes immediately.
    pub fn skip(&mut self) -> TimerSignal {
        self.remaining = 0;
        if self.completed {
            self.running = false;
            self.task = None;
            return TimerSignal::Pending;
        }
        self.finish()
    }

    /// Stops the clock without signaling completion.
    pub fn stop(&mut self) {
        if self.running {
            debug!(epoch = self.epoch, remaining = self.remaining, "countdown stopped");
        }
        self.running = false;
        self.task = None;
    }

    fn finish(&mut self) -> TimerSignal {
        self.running = false;
        self.completed = true;
        self.task = None;
        TimerSignal::Complete
    }
}

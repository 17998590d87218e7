//! Countdown tick scheduling
//!
//! The countdown is driven by a recurring one-second tick. The recurring
//! task is represented by a [`TickTask`] guard: dropping the guard cancels
//! the task, so whoever owns the guard owns the task's lifetime.
//!
//! Every tick carries the epoch it was scheduled for. Ticks already queued
//! when their task is cancelled still arrive, and are discarded by epoch.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Real-time period of one countdown step.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// One elapsed second, tagged with the countdown it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Epoch of the countdown that scheduled this tick
    pub epoch: u64,
}

/// Guard for a scheduled recurring tick. Cancels the task on drop.
#[derive(Debug)]
pub struct TickTask {
    cancel: CancellationToken,
    epoch: u64,
}

impl TickTask {
    /// Wraps a cancellation token for the task scheduled at `epoch`.
    #[must_use]
    pub const fn new(cancel: CancellationToken, epoch: u64) -> Self {
        Self { cancel, epoch }
    }

    /// Epoch of the countdown this task ticks for.
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Returns a clone of the task's cancellation token.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Drop for TickTask {
    fn drop(&mut self) {
        debug!(epoch = self.epoch, "cancelling countdown tick task");
        self.cancel.cancel();
    }
}

/// Source of recurring countdown ticks.
pub trait TickScheduler: Send + Sync + std::fmt::Debug {
    /// Starts delivering [`Tick`]s for `epoch` every `period` until the
    /// returned guard is dropped.
    fn schedule(&self, epoch: u64, period: Duration) -> TickTask;
}

/// Scheduler that never fires; the caller drives the countdown by hand.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManualTicks;

impl TickScheduler for ManualTicks {
    fn schedule(&self, epoch: u64, _period: Duration) -> TickTask {
        TickTask::new(CancellationToken::new(), epoch)
    }
}

/// Tokio-backed scheduler that sends ticks into a channel.
#[derive(Debug, Clone)]
pub struct IntervalTicks {
    tx: mpsc::UnboundedSender<Tick>,
    runtime: tokio::runtime::Handle,
}

impl IntervalTicks {
    /// Creates a scheduler bound to the current runtime, returning the
    /// receiving end of the tick channel.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Tick>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            tx,
            runtime: tokio::runtime::Handle::current(),
        };
        (scheduler, rx)
    }
}

impl TickScheduler for IntervalTicks {
    fn schedule(&self, epoch: u64, period: Duration) -> TickTask {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let tx = self.tx.clone();

        self.runtime.spawn(async move {
            // First tick one full period after scheduling.
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    () = token.cancelled() => {
                        debug!(epoch, "tick task cancelled");
                        break;
                    }
                    _ = interval.tick() => {
                        if tx.send(Tick { epoch }).is_err() {
                            debug!(epoch, "tick receiver dropped");
                            break;
                        }
                    }
                }
            }
        });

        TickTask::new(cancel, epoch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_task_cancels_token() {
        let task = ManualTicks.schedule(3, TICK_PERIOD);
        let token = task.token();
        assert_eq!(task.epoch(), 3);
        assert!(!token.is_cancelled());
        drop(task);
        assert!(token.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn interval_ticks_until_dropped() {
        let (scheduler, mut rx) = IntervalTicks::new();
        let task = scheduler.schedule(7, TICK_PERIOD);

        for _ in 0..3 {
            let tick = rx.recv().await.unwrap();
            assert_eq!(tick, Tick { epoch: 7 });
        }

        let token = task.token();
        drop(task);
        assert!(token.is_cancelled());

        // Let the task observe cancellation, then make sure nothing else arrives.
        tokio::time::sleep(TICK_PERIOD * 3).await;
        while let Ok(tick) = rx.try_recv() {
            assert_eq!(tick.epoch, 7);
        }
        tokio::time::sleep(TICK_PERIOD * 3).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_waits_one_period() {
        let (scheduler, mut rx) = IntervalTicks::new();
        let _task = scheduler.schedule(1, TICK_PERIOD);

        tokio::time::sleep(TICK_PERIOD / 2).await;
        assert!(rx.try_recv().is_err());
        let start = Instant::now();
        rx.recv().await.unwrap();
        assert!(Instant::now() - start <= TICK_PERIOD);
    }
}

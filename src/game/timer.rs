//! Periodic tick scheduling for the engine
//!
//! The engine owns exactly one scheduler and at most one armed periodic task.
//! Every arm or disarm starts a new generation; a tick carries the generation
//! of the task that produced it, so ticks already in flight from a cancelled
//! task are recognised as stale and never drive a step.

use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// One firing of the periodic task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
}

/// A cancellable periodic task driving `GameEngine::step`
pub trait TickScheduler {
    /// Start firing every `period`, cancelling any task already armed
    fn arm(&mut self, period: Duration);

    /// Cancel the armed task, if any
    fn disarm(&mut self);

    fn is_armed(&self) -> bool;

    /// Whether `tick` came from the currently armed task
    fn is_current(&self, tick: Tick) -> bool;
}

/// Scheduler backed by a tokio task per armed period
///
/// Ticks are delivered through the receiver returned by [`TokioTicker::new`].
/// Must be armed from within a tokio runtime.
pub struct TokioTicker {
    tx: UnboundedSender<Tick>,
    task: Option<JoinHandle<()>>,
    generation: u64,
}

impl TokioTicker {
    pub fn new() -> (Self, UnboundedReceiver<Tick>) {
        let (tx, rx) = unbounded_channel();
        let ticker = Self {
            tx,
            task: None,
            generation: 0,
        };
        (ticker, rx)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.generation += 1;
    }
}

impl TickScheduler for TokioTicker {
    fn arm(&mut self, period: Duration) {
        self.cancel();

        let tx = self.tx.clone();
        let tick = Tick {
            generation: self.generation,
        };

        self.task = Some(tokio::spawn(async move {
            let mut timer = interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; a step is due one full period after arming.
            timer.tick().await;

            loop {
                timer.tick().await;
                if tx.send(tick).is_err() {
                    break;
                }
            }
        }));

        tracing::trace!(generation = self.generation, ?period, "ticker armed");
    }

    fn disarm(&mut self) {
        if self.task.is_some() {
            tracing::trace!(generation = self.generation, "ticker disarmed");
        }
        self.cancel();
    }

    fn is_armed(&self) -> bool {
        self.task.is_some()
    }

    fn is_current(&self, tick: Tick) -> bool {
        self.task.is_some() && tick.generation == self.generation
    }
}

impl Drop for TokioTicker {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_full_period() {
        let (mut ticker, mut rx) = TokioTicker::new();
        ticker.arm(Duration::from_millis(200));
        tokio::task::yield_now().await;

        advance(Duration::from_millis(150)).await;
        assert!(rx.try_recv().is_err());

        advance(Duration::from_millis(60)).await;
        let tick = rx.recv().await.unwrap();
        assert!(ticker.is_current(tick));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_makes_old_ticks_stale() {
        let (mut ticker, mut rx) = TokioTicker::new();
        ticker.arm(Duration::from_millis(100));
        tokio::task::yield_now().await;

        advance(Duration::from_millis(110)).await;
        let old_tick = rx.recv().await.unwrap();

        ticker.arm(Duration::from_millis(60));
        assert!(!ticker.is_current(old_tick));
        assert!(ticker.is_armed());

        let new_tick = rx.recv().await.unwrap();
        assert!(ticker.is_current(new_tick));
        assert_eq!(new_tick.generation, ticker.generation());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_stops_ticks() {
        let (mut ticker, mut rx) = TokioTicker::new();
        ticker.arm(Duration::from_millis(100));
        tokio::task::yield_now().await;
        ticker.disarm();
        assert!(!ticker.is_armed());

        advance(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
    }
}

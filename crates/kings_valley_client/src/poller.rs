//! Periodic refresh timer.
//!
//! A [`PollScheduler`] owns one background timer task that posts a tick
//! message every period. The timer is tied to the value: dropping the
//! scheduler aborts the task, so a session's polling ends exactly when its
//! scheduler is dropped.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument};

/// Handle to a running poll timer.
#[derive(Debug)]
pub struct PollScheduler {
    handle: JoinHandle<()>,
}

impl PollScheduler {
    /// Starts posting `tick` to `events` every `period`, first after one
    /// full period.
    #[instrument(skip(events, tick))]
    pub fn start<E>(period: Duration, events: mpsc::UnboundedSender<E>, tick: E) -> Self
    where
        E: Clone + Send + 'static,
    {
        info!("Starting poll timer");
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                debug!("Poll tick");
                if events.send(tick.clone()).is_err() {
                    debug!("Event receiver gone, poll timer exiting");
                    break;
                }
            }
        });
        Self { handle }
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        info!("Stopping poll timer");
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_every_period_until_dropped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = PollScheduler::start(Duration::from_secs(2), tx, 7u8);

        tokio::time::sleep(Duration::from_millis(1_900)).await;
        assert!(rx.try_recv().is_err(), "no tick before one period");

        tokio::time::sleep(Duration::from_millis(4_200)).await;
        let mut ticks = 0;
        while rx.try_recv().is_ok() {
            ticks += 1;
        }
        assert_eq!(ticks, 3);

        drop(scheduler);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err(), "no ticks after drop");
    }
}

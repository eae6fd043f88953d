//! # Statistics Reporter
//!
//! Owned, cancellable periodic task driving statistics emission.
//!
//! The first tick fires one full period after arming; ticks that fall behind
//! are delayed rather than bursted. Cancelling (or dropping) the handle stops
//! the task before its next tick. Each reporter carries a generation number
//! so its owner can recognise ticks from a reporter it has already replaced.

use std::fmt;
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub struct StatisticsReporter {
    generation: u64,
    period: Duration,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl StatisticsReporter {
    /// Spawn the periodic task on `handle`. `on_tick` returning
    /// `ControlFlow::Break` ends the task from the inside.
    pub fn arm<F>(handle: &Handle, period: Duration, generation: u64, mut on_tick: F) -> Self
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let task = handle.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        if on_tick().is_break() {
                            break;
                        }
                    }
                }
            }
        });

        Self {
            generation,
            period,
            token,
            task,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the task. Equivalent to dropping the handle.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for StatisticsReporter {
    fn drop(&mut self) {
        self.token.cancel();
        self.task.abort();
    }
}

impl fmt::Debug for StatisticsReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatisticsReporter")
            .field("generation", &self.generation)
            .field("period", &self.period)
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting(ticks: &Arc<AtomicUsize>) -> impl FnMut() -> ControlFlow<()> + Send + 'static {
        let ticks = Arc::clone(ticks);
        move || {
            ticks.fetch_add(1, Ordering::SeqCst);
            ControlFlow::Continue(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_after_one_period() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let reporter = StatisticsReporter::arm(
            &Handle::current(),
            Duration::from_millis(600),
            1,
            counting(&ticks),
        );

        tokio::time::sleep(Duration::from_millis(599)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(1200)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);

        assert_eq!(reporter.generation(), 1);
        assert_eq!(reporter.period(), Duration::from_millis(600));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_ticks() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let reporter = StatisticsReporter::arm(
            &Handle::current(),
            Duration::from_millis(100),
            1,
            counting(&ticks),
        );

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);

        reporter.cancel();
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn break_ends_task() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let t = Arc::clone(&ticks);
        let reporter = StatisticsReporter::arm(
            &Handle::current(),
            Duration::from_millis(100),
            7,
            move || {
                t.fetch_add(1, Ordering::SeqCst);
                ControlFlow::Break(())
            },
        );

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
        assert!(reporter.is_finished());
    }
}

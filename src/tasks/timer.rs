//! Repeating Timer
//!
//! A callback scheduled once per period, bound to a handle that cancels it.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

/// Cancellation handle for a repeating timer.
///
/// Dropping the handle cancels the timer as well, so a timer can never
/// outlive whoever armed it.
#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Stops the timer. The callback will not be invoked again once the
    /// running task reaches its next sleep.
    pub fn cancel(&self) {
        self.task.abort();
    }

    /// Returns true once the timer task has stopped.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawns a task that invokes `tick` after every `period`.
///
/// The first invocation happens one full period after spawning; callers
/// wanting an immediate run do it themselves before arming the timer.
/// Ticks are scheduled on a fixed cadence, so the time `tick` takes does
/// not push later ticks back.
///
/// # Panics
/// Panics if `period` is zero.
///
/// # Example
/// ```ignore
/// let handle = spawn_repeating(Duration::from_secs(60), || refresh());
/// // Later:
/// handle.cancel();
/// ```
pub fn spawn_repeating<F>(period: Duration, mut tick: F) -> TimerHandle
where
    F: FnMut() + Send + 'static,
{
    assert!(!period.is_zero(), "repeating timer period must be non-zero");

    let task = tokio::spawn(async move {
        debug!(period_ms = period.as_millis() as u64, "repeating timer armed");

        let mut ticks = time::interval_at(Instant::now() + period, period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticks.tick().await;
            tick();
        }
    });

    TimerHandle { task }
}

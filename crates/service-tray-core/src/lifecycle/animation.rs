use crate::ServiceState;

use std::time::Duration;

use tokio::{
    runtime::Handle,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::trace;

/// Periodic frame advance for a transitional state.
///
/// The tick callback runs under the controller lock and checks that this
/// ticker's `id` is still the registered one before touching anything. The
/// controller clears the registration under the same lock when it stops the
/// ticker, so once `stop` returns no further tick can take effect. Aborting
/// the task only reclaims it sooner.
pub(crate) struct AnimationTicker {
    id: u64,
    state: ServiceState,
    task: JoinHandle<()>,
}

impl AnimationTicker {
    /// Spawn a ticker calling `tick` every `period` until it returns `false`.
    pub(crate) fn start<F>(
        runtime: &Handle,
        id: u64,
        state: ServiceState,
        period: Duration,
        mut tick: F,
    ) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let task = runtime.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                if !tick() {
                    break;
                }
            }
        });

        trace!(ticker_id = id, %state, "Animation started");

        Self { id, state, task }
    }

    /// Cancellation token checked by every tick.
    pub(crate) const fn id(&self) -> u64 {
        self.id
    }

    /// State the ticker animates.
    pub(crate) const fn state(&self) -> ServiceState {
        self.state
    }

    /// Cancel the ticker. Must be called while holding the controller lock.
    pub(crate) fn stop(self) {
        trace!(ticker_id = self.id, state = %self.state, "Animation stopped");
    }
}

impl Drop for AnimationTicker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

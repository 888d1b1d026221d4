use std::{future::Future, time::Duration};

use tokio::sync::watch;
use tracing::debug;

/// Passive polling loop.
///
/// Calls `tick` immediately, then again `interval` after each tick completes,
/// until `tick` returns `false` or `shutdown` flips to `true`.
pub(crate) async fn run<F, Fut>(interval: Duration, mut shutdown: watch::Receiver<bool>, mut tick: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    debug!(interval_ms = interval.as_millis(), "Monitor loop started");

    loop {
        if *shutdown.borrow_and_update() {
            break;
        }

        if !tick().await {
            break;
        }

        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }

    debug!("Monitor loop stopped");
}

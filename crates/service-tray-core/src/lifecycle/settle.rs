//! Bounded polling that confirms an action took effect.

use crate::{ProcessController, ServiceState, StatusProbe};

use std::time::Duration;

use tracing::{debug, instrument};

/// How a settle-polling window ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettleOutcome {
    /// A probe reported the target state on the given attempt (1-based).
    Reached {
        /// Attempt that observed the target.
        attempt: u32,
    },
    /// A probe reported `Error`; polling stopped early.
    Faulted {
        /// Diagnostic from the failing probe.
        diagnostic: Option<String>,
        /// Attempt that observed the error.
        attempt: u32,
    },
    /// Every attempt saw something other than the target or an error.
    Exhausted,
}

/// Poll `probe` every `interval` until it reports `target` or `Error`, for at
/// most `max_attempts` probes. The interval elapses before each probe.
#[instrument(skip(probe))]
pub async fn settle<P: ProcessController>(
    probe: &StatusProbe<P>,
    target: ServiceState,
    max_attempts: u32,
    interval: Duration,
) -> SettleOutcome {
    for attempt in 1..=max_attempts {
        tokio::time::sleep(interval).await;

        let report = probe.probe().await;
        debug!(attempt, state = %report.state, "Settle poll");

        if report.state == target {
            return SettleOutcome::Reached { attempt };
        }
        if report.state == ServiceState::Error {
            return SettleOutcome::Faulted {
                diagnostic: report.diagnostic,
                attempt,
            };
        }
    }

    SettleOutcome::Exhausted
}

mod animation;
mod config;
mod controller;
mod executor;
mod monitor;
mod probe;
mod service_state;
mod settle;
mod snapshot;

pub(crate) use config::{ERROR_NOTIFICATION_LIMIT, FAILURE_NOTIFICATION_LIMIT};

#[cfg(test)]
pub(crate) use probe::{TokenClass, classify_token};

pub use {
    config::{
        DEFAULT_ACTION_TIMEOUT, DEFAULT_ANIMATION_FRAMES, DEFAULT_ANIMATION_PERIOD,
        DEFAULT_DIAGNOSTIC_LIMIT, DEFAULT_MONITOR_INTERVAL, DEFAULT_PROBE_TIMEOUT,
        DEFAULT_SETTLE_INTERVAL, DEFAULT_START_ATTEMPTS, DEFAULT_STOP_ATTEMPTS,
        LifecycleConfig, MAX_DURATION,
    },
    controller::{ActionHandle, LifecycleController},
    executor::ActionExecutor,
    probe::{ProbeReport, StatusProbe},
    service_state::ServiceState,
    settle::{SettleOutcome, settle},
    snapshot::LifecycleSnapshot,
};

use service_tray_core::{
    DEFAULT_ACTION_TIMEOUT, DEFAULT_ANIMATION_PERIOD, DEFAULT_MONITOR_INTERVAL,
    DEFAULT_PROBE_TIMEOUT, DEFAULT_SETTLE_INTERVAL, DEFAULT_START_ATTEMPTS, DEFAULT_STOP_ATTEMPTS,
};

use serde::{Deserialize, Serialize};

/// Probe, action, polling and animation timing. Durations are milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Upper bound on one status query.
    pub probe_timeout_ms: u64,
    /// Upper bound on one start/stop/restart command.
    pub action_timeout_ms: u64,
    /// Delay before each settle-polling probe.
    pub settle_interval_ms: u64,
    /// Settle-polling budget after stop.
    pub stop_attempts: u32,
    /// Settle-polling budget after start or restart.
    pub start_attempts: u32,
    /// Passive monitor cadence.
    pub monitor_interval_ms: u64,
    /// Animation frame period.
    pub animation_period_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: millis(DEFAULT_PROBE_TIMEOUT),
            action_timeout_ms: millis(DEFAULT_ACTION_TIMEOUT),
            settle_interval_ms: millis(DEFAULT_SETTLE_INTERVAL),
            stop_attempts: DEFAULT_STOP_ATTEMPTS,
            start_attempts: DEFAULT_START_ATTEMPTS,
            monitor_interval_ms: millis(DEFAULT_MONITOR_INTERVAL),
            animation_period_ms: millis(DEFAULT_ANIMATION_PERIOD),
        }
    }
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

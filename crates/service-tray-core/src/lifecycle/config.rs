use crate::{CoreError, CoreResult, MenuLabels, ServiceAction};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;

/// Upper bound on a single status query.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
/// Upper bound on a single start/stop/restart command.
pub const DEFAULT_ACTION_TIMEOUT: Duration = Duration::from_secs(30);
/// Delay before each settle-polling probe.
pub const DEFAULT_SETTLE_INTERVAL: Duration = Duration::from_millis(500);
/// Settle-polling budget after a stop.
pub const DEFAULT_STOP_ATTEMPTS: u32 = 10;
/// Settle-polling budget after a start or restart.
pub const DEFAULT_START_ATTEMPTS: u32 = 20;
/// Passive monitor cadence.
pub const DEFAULT_MONITOR_INTERVAL: Duration = Duration::from_secs(3);
/// Animation frame period.
pub const DEFAULT_ANIMATION_PERIOD: Duration = Duration::from_millis(150);
/// Animation frames per cycle.
pub const DEFAULT_ANIMATION_FRAMES: u8 = 8;
/// Diagnostic text kept for display, in characters.
pub const DEFAULT_DIAGNOSTIC_LIMIT: usize = 500;
/// Characters of the last error shown in the "show last error" notification.
pub const ERROR_NOTIFICATION_LIMIT: usize = 200;
/// Longest accepted timeout, interval or period. Keeps deadline arithmetic
/// on the runtime clock from overflowing.
pub const MAX_DURATION: Duration = Duration::from_secs(24 * 60 * 60);
/// Characters of an action failure shown in the failure notification.
pub const FAILURE_NOTIFICATION_LIMIT: usize = 50;

/// Tunables for the lifecycle controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleConfig {
    /// Name passed to the process controller (e.g. the systemd unit).
    pub service_name: String,
    /// Menu and notification naming.
    pub labels: MenuLabels,
    /// Status query bound.
    pub probe_timeout: Duration,
    /// Action command bound.
    pub action_timeout: Duration,
    /// Settle-polling cadence.
    pub settle_interval: Duration,
    /// Settle-polling attempts after stop.
    pub stop_attempts: u32,
    /// Settle-polling attempts after start/restart.
    pub start_attempts: u32,
    /// Monitor cadence.
    pub monitor_interval: Duration,
    /// Animation cadence.
    pub animation_period: Duration,
    /// Animation modulus.
    pub animation_frames: u8,
    /// Diagnostic cap in characters.
    pub diagnostic_limit: usize,
}

impl LifecycleConfig {
    /// Default tunables for `service_name`.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            labels: MenuLabels::default(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            action_timeout: DEFAULT_ACTION_TIMEOUT,
            settle_interval: DEFAULT_SETTLE_INTERVAL,
            stop_attempts: DEFAULT_STOP_ATTEMPTS,
            start_attempts: DEFAULT_START_ATTEMPTS,
            monitor_interval: DEFAULT_MONITOR_INTERVAL,
            animation_period: DEFAULT_ANIMATION_PERIOD,
            animation_frames: DEFAULT_ANIMATION_FRAMES,
            diagnostic_limit: DEFAULT_DIAGNOSTIC_LIMIT,
        }
    }

    /// Reject settings that would make a loop spin or never terminate.
    #[track_caller]
    pub fn validate(&self) -> CoreResult<()> {
        if self.service_name.trim().is_empty() {
            return Err(invalid_config("service name must not be empty"));
        }

        let durations = [
            ("probe timeout", self.probe_timeout),
            ("action timeout", self.action_timeout),
            ("settle interval", self.settle_interval),
            ("monitor interval", self.monitor_interval),
            ("animation period", self.animation_period),
        ];
        if let Some((name, _)) = durations.iter().find(|(_, d)| d.is_zero()) {
            return Err(invalid_config(format!("{name} must be non-zero")));
        }
        if let Some((name, _)) = durations.iter().find(|(_, d)| *d > MAX_DURATION) {
            return Err(invalid_config(format!(
                "{name} must not exceed {}s",
                MAX_DURATION.as_secs()
            )));
        }

        if self.stop_attempts == 0 || self.start_attempts == 0 {
            return Err(invalid_config("settle attempts must be at least 1"));
        }

        if self.animation_frames == 0 {
            return Err(invalid_config("animation needs at least one frame"));
        }

        Ok(())
    }

    /// Settle-polling budget for `action`.
    pub const fn attempts_for(&self, action: ServiceAction) -> u32 {
        match action {
            ServiceAction::Stop => self.stop_attempts,
            ServiceAction::Start | ServiceAction::Restart => self.start_attempts,
        }
    }
}

#[track_caller]
fn invalid_config(reason: impl Into<String>) -> CoreError {
    CoreError::InvalidConfig {
        reason: reason.into(),
        location: ErrorLocation::from(Location::caller()),
    }
}

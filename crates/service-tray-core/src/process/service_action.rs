use crate::ServiceState;

use std::fmt;

/// A command that changes the supervised service's operational status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceAction {
    /// Start a stopped service.
    Start,
    /// Stop a running service.
    Stop,
    /// Restart a running service.
    Restart,
}

impl ServiceAction {
    /// Verb passed to the process controller.
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
        }
    }

    /// State displayed while the action is in flight.
    pub const fn transitional_state(self) -> ServiceState {
        match self {
            Self::Start | Self::Restart => ServiceState::Starting,
            Self::Stop => ServiceState::Stopping,
        }
    }

    /// Stable state that confirms the action took effect.
    pub const fn target_state(self) -> ServiceState {
        match self {
            Self::Start | Self::Restart => ServiceState::Running,
            Self::Stop => ServiceState::Stopped,
        }
    }

    /// Progress text for the "command issued" notification.
    pub const fn progress_label(self) -> &'static str {
        match self {
            Self::Start => "Starting",
            Self::Stop => "Stopping",
            Self::Restart => "Restarting",
        }
    }
}

impl fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

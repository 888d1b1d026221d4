use std::fmt;

/// Operational state of the supervised service as displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceState {
    /// Service is up.
    Running,
    /// Service is down.
    Stopped,
    /// Service is coming up.
    Starting,
    /// Service is going down.
    Stopping,
    /// Service failed or its status could not be verified.
    Error,
}

impl ServiceState {
    /// `Starting` or `Stopping`: temporary and animated.
    pub const fn is_transitional(self) -> bool {
        matches!(self, Self::Starting | Self::Stopping)
    }

    /// Toggle is only meaningful between the two settled on/off states.
    pub const fn accepts_toggle(self) -> bool {
        matches!(self, Self::Running | Self::Stopped)
    }

    /// Restart is only meaningful for a running service.
    pub const fn accepts_restart(self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Stopping => "stopping",
            Self::Error => "error",
        })
    }
}

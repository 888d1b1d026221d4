use crate::ServiceState;

/// Point-in-time copy of everything the controller displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleSnapshot {
    /// Current state.
    pub state: ServiceState,
    /// Most recent diagnostic. Sticky across non-error transitions.
    pub last_error: Option<String>,
    /// Animation frame, meaningful only while transitional.
    pub animation_frame: u8,
    /// Supplementary listing captured while running, if any was fetched.
    pub details: Option<Vec<String>>,
}

impl Default for LifecycleSnapshot {
    /// `Stopped` is a placeholder until the first probe completes.
    fn default() -> Self {
        Self {
            state: ServiceState::Stopped,
            last_error: None,
            animation_frame: 0,
            details: None,
        }
    }
}

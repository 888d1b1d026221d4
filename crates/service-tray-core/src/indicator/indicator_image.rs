use crate::ServiceState;

/// Logical description of the indicator image.
///
/// The core never renders pixels; the indicator implementation maps these to
/// bitmaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorImage {
    /// Non-animated badge for a stable state.
    Static(ServiceState),
    /// One frame of the transition animation.
    Animated {
        /// Transitional state being animated.
        state: ServiceState,
        /// Frame index, always below the configured frame count.
        frame: u8,
    },
}

impl IndicatorImage {
    /// State this image represents.
    pub const fn state(self) -> ServiceState {
        match self {
            Self::Static(state) | Self::Animated { state, .. } => state,
        }
    }
}

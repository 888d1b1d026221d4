mod service_fault;

pub use service_fault::ServiceFault;

use error_location::ErrorLocation;
use thiserror::Error;

/// Core library errors with source location tracking.
#[derive(Error, Debug)]
pub enum CoreError {
    /// No tokio runtime was available when the controller was created.
    #[error("No async runtime available: {reason} {location}")]
    RuntimeUnavailable {
        /// Description of the runtime lookup failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Lifecycle configuration was rejected.
    #[error("Invalid lifecycle configuration: {reason} {location}")]
    InvalidConfig {
        /// Which setting was rejected and why.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Errors reported by [`crate::ProcessController`] implementations.
#[derive(Error, Debug)]
pub enum ControllerError {
    /// The controller did not answer within the caller-supplied timeout.
    #[error("Timed out after {timeout_ms}ms running {operation} {location}")]
    Timeout {
        /// Human-readable name of the operation.
        operation: String,
        /// The timeout that elapsed.
        timeout_ms: u128,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The controller executable could not be launched.
    #[error("Failed to launch {program}: {source} {location}")]
    Spawn {
        /// Program that failed to launch.
        program: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The controller produced output that could not be read.
    #[error("Controller IO error: {reason} {location}")]
    Io {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl ControllerError {
    /// Short description without the location suffix, suitable for display.
    pub fn reason(&self) -> String {
        match self {
            Self::Timeout {
                operation,
                timeout_ms,
                ..
            } => format!("{operation} timed out after {timeout_ms}ms"),
            Self::Spawn {
                program, source, ..
            } => format!("failed to launch {program}: {source}"),
            Self::Io { reason, .. } => reason.clone(),
        }
    }
}

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;

/// Result type alias using [`ControllerError`].
pub type ControllerResult<T> = std::result::Result<T, ControllerError>;

use crate::{ServiceAction, text};

use thiserror::Error;

/// Failures that put the supervised service into `ServiceState::Error`.
///
/// These never propagate out of the controller. They are rendered into the
/// diagnostic text stored as `last_error` and shown to the user, so they carry
/// no source location.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceFault {
    /// Status query did not answer in time.
    #[error("Timeout checking service status")]
    ProbeTimeout,

    /// Status query returned a token we do not recognise.
    #[error("Unknown service state: {token}")]
    ProbeMalformed {
        /// The raw, trimmed token.
        token: String,
    },

    /// Status query could not be run at all.
    #[error("Error checking status: {reason}")]
    ProbeInvocationFailure {
        /// Why the query failed.
        reason: String,
    },

    /// The process controller reports the service as failed.
    #[error("Service failed:\n{detail}")]
    ServiceFailed {
        /// Tail of the extended status output.
        detail: String,
    },

    /// Extended status for a failed service could not be fetched.
    #[error("Service failed (couldn't get details: {reason})")]
    ServiceFailedWithoutDetail {
        /// Why the extended status query failed.
        reason: String,
    },

    /// Start/stop/restart did not finish in time.
    #[error("Timeout running {action} command")]
    ActionTimeout {
        /// The action that timed out.
        action: ServiceAction,
    },

    /// Start/stop/restart exited with a non-zero status.
    #[error("{action} command failed: {output}")]
    ActionNonZeroExit {
        /// The action that failed.
        action: ServiceAction,
        /// Exit code, if the process exited normally.
        exit_code: Option<i32>,
        /// Captured stderr, or stdout when stderr was empty.
        output: String,
    },

    /// Start/stop/restart could not be invoked.
    #[error("Error running {action} command: {reason}")]
    ActionInvocationFailure {
        /// The action that could not be invoked.
        action: ServiceAction,
        /// Why the invocation failed.
        reason: String,
    },
}

impl ServiceFault {
    /// Render the fault as display text capped at `limit` characters.
    ///
    /// `ServiceFailed` keeps its whole text: its detail is already the bounded
    /// tail of the status output, and the end is the part worth reading.
    pub fn diagnostic(&self, limit: usize) -> String {
        match self {
            Self::ServiceFailed { .. } => self.to_string(),
            _ => text::head_chars(&self.to_string(), limit).to_string(),
        }
    }
}

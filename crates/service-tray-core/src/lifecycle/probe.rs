//! Read-only status queries and their classification.

use crate::{
    ControllerError, LifecycleConfig, ProcessController, ServiceFault, ServiceState, text,
};

use std::{sync::Arc, time::Duration};

use tracing::{debug, instrument, warn};

/// Outcome of one status probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    /// Classified state.
    pub state: ServiceState,
    /// Diagnostic text, present only for `Error`.
    pub diagnostic: Option<String>,
}

impl ProbeReport {
    fn settled(state: ServiceState) -> Self {
        Self {
            state,
            diagnostic: None,
        }
    }

    fn fault(fault: &ServiceFault, limit: usize) -> Self {
        Self {
            state: ServiceState::Error,
            diagnostic: Some(fault.diagnostic(limit)),
        }
    }
}

/// How a raw status token maps onto [`ServiceState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenClass {
    Known(ServiceState),
    Failed,
    Unknown,
}

/// Classify a raw status token. Anything unrecognised is `Unknown`, never a
/// healthier guess.
pub(crate) fn classify_token(token: &str) -> TokenClass {
    match token.trim() {
        "active" => TokenClass::Known(ServiceState::Running),
        "inactive" | "dead" => TokenClass::Known(ServiceState::Stopped),
        "activating" => TokenClass::Known(ServiceState::Starting),
        "deactivating" => TokenClass::Known(ServiceState::Stopping),
        "failed" => TokenClass::Failed,
        _ => TokenClass::Unknown,
    }
}

/// Queries the process controller for ground truth.
pub struct StatusProbe<P> {
    controller: Arc<P>,
    service: String,
    timeout: Duration,
    diagnostic_limit: usize,
}

impl<P> Clone for StatusProbe<P> {
    fn clone(&self) -> Self {
        Self {
            controller: Arc::clone(&self.controller),
            service: self.service.clone(),
            timeout: self.timeout,
            diagnostic_limit: self.diagnostic_limit,
        }
    }
}

impl<P: ProcessController> StatusProbe<P> {
    /// Create a probe for the service named in `config`.
    pub fn new(controller: Arc<P>, config: &LifecycleConfig) -> Self {
        Self {
            controller,
            service: config.service_name.clone(),
            timeout: config.probe_timeout,
            diagnostic_limit: config.diagnostic_limit,
        }
    }

    /// Query and classify the current state. Never fails: anything that cannot
    /// be verified is reported as `Error`.
    #[instrument(skip(self), fields(service = %self.service))]
    pub async fn probe(&self) -> ProbeReport {
        let query = self.controller.query(&self.service, self.timeout);

        let token = match tokio::time::timeout(self.timeout, query).await {
            Ok(Ok(token)) => token,
            Ok(Err(ControllerError::Timeout { .. })) | Err(_) => {
                warn!("Status query timed out");
                return ProbeReport::fault(&ServiceFault::ProbeTimeout, self.diagnostic_limit);
            }
            Ok(Err(e)) => {
                warn!(error = ?e, "Status query failed");
                let fault = ServiceFault::ProbeInvocationFailure { reason: e.reason() };
                return ProbeReport::fault(&fault, self.diagnostic_limit);
            }
        };

        let report = match classify_token(&token) {
            TokenClass::Known(state) => ProbeReport::settled(state),
            TokenClass::Failed => self.failed_report().await,
            TokenClass::Unknown => {
                let fault = ServiceFault::ProbeMalformed {
                    token: token.trim().to_string(),
                };
                ProbeReport::fault(&fault, self.diagnostic_limit)
            }
        };

        debug!(token = token.trim(), state = %report.state, "Probe classified");

        report
    }

    /// Best-effort extended status for a failed service.
    async fn failed_report(&self) -> ProbeReport {
        let detail = self.controller.status_detail(&self.service, self.timeout);

        let fault = match tokio::time::timeout(self.timeout, detail).await {
            Ok(Ok(detail)) => ServiceFault::ServiceFailed {
                detail: text::tail_chars(&detail, self.diagnostic_limit).to_string(),
            },
            Ok(Err(e)) => ServiceFault::ServiceFailedWithoutDetail { reason: e.reason() },
            Err(_) => ServiceFault::ServiceFailedWithoutDetail {
                reason: "timed out".to_string(),
            },
        };

        ProbeReport::fault(&fault, self.diagnostic_limit)
    }

    /// Fetch the supplementary listing. Failures yield `None`.
    #[instrument(skip(self), fields(service = %self.service))]
    pub async fn details(&self) -> Option<Vec<String>> {
        let listing = self.controller.list_details(&self.service, self.timeout);

        match tokio::time::timeout(self.timeout, listing).await {
            Ok(Ok(entries)) => Some(entries),
            Ok(Err(e)) => {
                debug!(error = ?e, "Detail listing failed");
                None
            }
            Err(_) => {
                debug!("Detail listing timed out");
                None
            }
        }
    }
}

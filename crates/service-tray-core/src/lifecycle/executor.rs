//! Start/stop/restart invocation.

use crate::{ControllerError, LifecycleConfig, ProcessController, ServiceAction, ServiceFault};

use std::{sync::Arc, time::Duration};

use tracing::{info, instrument, warn};

/// Issues state-changing commands to the process controller.
///
/// A call blocks for as long as the command runs (up to the action timeout),
/// so it is only ever awaited from a dedicated action task.
pub struct ActionExecutor<P> {
    controller: Arc<P>,
    service: String,
    timeout: Duration,
}

impl<P: ProcessController> ActionExecutor<P> {
    /// Create an executor for the service named in `config`.
    pub fn new(controller: Arc<P>, config: &LifecycleConfig) -> Self {
        Self {
            controller,
            service: config.service_name.clone(),
            timeout: config.action_timeout,
        }
    }

    /// Run `action` and report whether the controller accepted it.
    #[instrument(skip(self), fields(service = %self.service))]
    pub async fn execute(&self, action: ServiceAction) -> Result<(), ServiceFault> {
        let command = self.controller.command(action, &self.service, self.timeout);

        let output = match tokio::time::timeout(self.timeout, command).await {
            Ok(Ok(output)) => output,
            Ok(Err(ControllerError::Timeout { .. })) | Err(_) => {
                warn!(%action, "Action timed out");
                return Err(ServiceFault::ActionTimeout { action });
            }
            Ok(Err(e)) => {
                warn!(%action, error = ?e, "Action could not be invoked");
                return Err(ServiceFault::ActionInvocationFailure {
                    action,
                    reason: e.reason(),
                });
            }
        };

        if !output.success() {
            warn!(%action, exit_code = ?output.exit_code, "Action exited non-zero");
            return Err(ServiceFault::ActionNonZeroExit {
                action,
                exit_code: output.exit_code,
                output: output.failure_text().to_string(),
            });
        }

        info!(%action, "Action accepted by process controller");

        Ok(())
    }
}

//! Boundary to the external process manager that owns the real service.

mod command_output;
mod service_action;

pub use {command_output::CommandOutput, service_action::ServiceAction};

use crate::ControllerResult;

use std::{future::Future, sync::Arc, time::Duration};

/// Queries and drives the supervised service.
///
/// Implementations honour the supplied timeouts, but the core also enforces
/// them around every call, so a misbehaving implementation cannot stall a
/// probe or an action forever.
pub trait ProcessController: Send + Sync + 'static {
    /// Return the raw status token for `service` (e.g. `"active"`).
    fn query(
        &self,
        service: &str,
        timeout: Duration,
    ) -> impl Future<Output = ControllerResult<String>> + Send;

    /// Return extended human-readable status, used when the service has failed.
    fn status_detail(
        &self,
        service: &str,
        timeout: Duration,
    ) -> impl Future<Output = ControllerResult<String>> + Send;

    /// Run `action` against `service`.
    fn command(
        &self,
        action: ServiceAction,
        service: &str,
        timeout: Duration,
    ) -> impl Future<Output = ControllerResult<CommandOutput>> + Send;

    /// Supplementary listing shown while the service runs (e.g. loaded models).
    fn list_details(
        &self,
        _service: &str,
        _timeout: Duration,
    ) -> impl Future<Output = ControllerResult<Vec<String>>> + Send {
        async { Ok(Vec::new()) }
    }
}

impl<T> ProcessController for Arc<T>
where
    T: ProcessController,
{
    fn query(
        &self,
        service: &str,
        timeout: Duration,
    ) -> impl Future<Output = ControllerResult<String>> + Send {
        (**self).query(service, timeout)
    }

    fn status_detail(
        &self,
        service: &str,
        timeout: Duration,
    ) -> impl Future<Output = ControllerResult<String>> + Send {
        (**self).status_detail(service, timeout)
    }

    fn command(
        &self,
        action: ServiceAction,
        service: &str,
        timeout: Duration,
    ) -> impl Future<Output = ControllerResult<CommandOutput>> + Send {
        (**self).command(action, service, timeout)
    }

    fn list_details(
        &self,
        service: &str,
        timeout: Duration,
    ) -> impl Future<Output = ControllerResult<Vec<String>>> + Send {
        (**self).list_details(service, timeout)
    }
}

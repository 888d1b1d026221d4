//! [`ProcessController`] backed by systemd's `systemctl`.

use crate::config::{DetailsConfig, ServiceConfig};

use service_tray_core::{
    CommandOutput, ControllerError, ControllerResult, ProcessController, ServiceAction,
};

use std::{panic::Location, process::Stdio, time::Duration};

use error_location::ErrorLocation;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Drives one systemd unit through `systemctl`.
///
/// Every child is spawned with `kill_on_drop`, so a command abandoned at its
/// timeout does not outlive the call.
#[derive(Debug, Clone)]
pub struct SystemctlController {
    systemctl: String,
    use_sudo: bool,
    details_command: Option<Vec<String>>,
}

impl SystemctlController {
    /// Create a controller from the service and details sections.
    pub fn new(service: &ServiceConfig, details: &DetailsConfig) -> Self {
        Self {
            systemctl: service.systemctl.clone(),
            use_sudo: service.use_sudo,
            details_command: details.command.clone().filter(|argv| !argv.is_empty()),
        }
    }

    /// `systemctl is-active <unit>`. Never elevated.
    pub(crate) fn status_argv(&self, unit: &str) -> Vec<String> {
        vec![self.systemctl.clone(), "is-active".to_string(), unit.to_string()]
    }

    /// `systemctl status <unit> --no-pager -l`. Never elevated.
    pub(crate) fn detail_argv(&self, unit: &str) -> Vec<String> {
        vec![
            self.systemctl.clone(),
            "status".to_string(),
            unit.to_string(),
            "--no-pager".to_string(),
            "-l".to_string(),
        ]
    }

    /// `[sudo] systemctl <verb> <unit>`.
    pub(crate) fn action_argv(&self, action: ServiceAction, unit: &str) -> Vec<String> {
        let mut argv = Vec::with_capacity(4);
        if self.use_sudo {
            argv.push("sudo".to_string());
        }
        argv.push(self.systemctl.clone());
        argv.push(action.verb().to_string());
        argv.push(unit.to_string());
        argv
    }
}

impl ProcessController for SystemctlController {
    async fn query(&self, service: &str, timeout: Duration) -> ControllerResult<String> {
        let output = run(&self.status_argv(service), timeout).await?;

        // is-active exits non-zero for inactive and failed units but still
        // prints the token.
        let token = output.stdout.trim();
        if token.is_empty() {
            return Err(io_error(format!(
                "no status output: {}",
                output.failure_text()
            )));
        }

        Ok(token.to_string())
    }

    async fn status_detail(&self, service: &str, timeout: Duration) -> ControllerResult<String> {
        let output = run(&self.detail_argv(service), timeout).await?;

        if output.stdout.trim().is_empty() {
            Ok(output.stderr)
        } else {
            Ok(output.stdout)
        }
    }

    async fn command(
        &self,
        action: ServiceAction,
        service: &str,
        timeout: Duration,
    ) -> ControllerResult<CommandOutput> {
        run(&self.action_argv(action, service), timeout).await
    }

    async fn list_details(&self, _service: &str, timeout: Duration) -> ControllerResult<Vec<String>> {
        let Some(argv) = &self.details_command else {
            return Ok(Vec::new());
        };

        let output = run(argv, timeout).await?;
        if !output.success() {
            return Err(io_error(output.failure_text().to_string()));
        }

        Ok(parse_listing(&output.stdout))
    }
}

/// First column of every non-blank line after the header.
pub(crate) fn parse_listing(stdout: &str) -> Vec<String> {
    stdout
        .trim()
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

#[instrument(skip(timeout), fields(timeout_ms = timeout.as_millis()))]
async fn run(argv: &[String], timeout: Duration) -> ControllerResult<CommandOutput> {
    let Some((program, args)) = argv.split_first() else {
        return Err(io_error("empty command line".to_string()));
    };

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| spawn_error(program, source))?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => return Err(io_error(format!("failed to collect {program} output: {e}"))),
        Err(_) => return Err(timeout_error(argv.join(" "), timeout)),
    };

    let output = CommandOutput {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    debug!(exit_code = ?output.exit_code, "Command finished");

    Ok(output)
}

#[track_caller]
fn io_error(reason: String) -> ControllerError {
    ControllerError::Io {
        reason,
        location: ErrorLocation::from(Location::caller()),
    }
}

#[track_caller]
fn spawn_error(program: &str, source: std::io::Error) -> ControllerError {
    ControllerError::Spawn {
        program: program.to_string(),
        source,
        location: ErrorLocation::from(Location::caller()),
    }
}

#[track_caller]
fn timeout_error(operation: String, timeout: Duration) -> ControllerError {
    ControllerError::Timeout {
        operation,
        timeout_ms: timeout.as_millis(),
        location: ErrorLocation::from(Location::caller()),
    }
}

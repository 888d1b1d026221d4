//! Service Tray Core Library
//!
//! Keeps a tray indicator in step with the true state of one supervised
//! background service, while letting the user start, stop and restart it.
//!
//! The [`LifecycleController`] owns the displayed state. It is fed by a
//! passive monitor loop and by user-triggered actions, animates transitions,
//! and pushes every change to an [`IndicatorSink`]. The service itself is
//! reached only through a [`ProcessController`].
//!
//! # Example
//!
//! ```no_run
//! use service_tray_core::{
//!     CommandOutput, ControllerResult, CoreResult, IndicatorImage, IndicatorSink,
//!     LifecycleConfig, LifecycleController, MenuItemId, ProcessController, ServiceAction,
//! };
//!
//! use std::time::Duration;
//!
//! struct AlwaysActive;
//!
//! impl ProcessController for AlwaysActive {
//!     async fn query(&self, _service: &str, _timeout: Duration) -> ControllerResult<String> {
//!         Ok("active".to_string())
//!     }
//!
//!     async fn status_detail(&self, _service: &str, _timeout: Duration) -> ControllerResult<String> {
//!         Ok(String::new())
//!     }
//!
//!     async fn command(
//!         &self,
//!         _action: ServiceAction,
//!         _service: &str,
//!         _timeout: Duration,
//!     ) -> ControllerResult<CommandOutput> {
//!         Ok(CommandOutput { exit_code: Some(0), ..CommandOutput::default() })
//!     }
//! }
//!
//! struct Logger;
//!
//! impl IndicatorSink for Logger {
//!     fn set_image(&self, image: IndicatorImage) { println!("image: {image:?}"); }
//!     fn set_title(&self, title: &str) { println!("title: {title}"); }
//!     fn set_menu_enabled(&self, _item: MenuItemId, _enabled: bool) {}
//!     fn notify(&self, title: &str, body: &str) { println!("{title}: {body}"); }
//! }
//!
//! #[tokio::main]
//! async fn main() -> CoreResult<()> {
//!     let controller = LifecycleController::new(LifecycleConfig::new("ollama"), AlwaysActive, Logger)?;
//!     controller.start();
//!     controller.refresh().await;
//!
//!     if let Some(action) = controller.toggle() {
//!         let _ = action.await;
//!     }
//!
//!     controller.shutdown();
//!     Ok(())
//! }
//! ```

mod error;
mod indicator;
mod lifecycle;
mod process;
mod text;

pub use {
    error::{ControllerError, ControllerResult, CoreError, Result as CoreResult, ServiceFault},
    indicator::{IndicatorImage, IndicatorSink, MenuItemId, MenuLabels, MenuModel, title_for},
    lifecycle::{
        ActionExecutor, ActionHandle, DEFAULT_ACTION_TIMEOUT, DEFAULT_ANIMATION_FRAMES,
        DEFAULT_ANIMATION_PERIOD, DEFAULT_DIAGNOSTIC_LIMIT, DEFAULT_MONITOR_INTERVAL,
        DEFAULT_PROBE_TIMEOUT, DEFAULT_SETTLE_INTERVAL, DEFAULT_START_ATTEMPTS,
        DEFAULT_STOP_ATTEMPTS, LifecycleConfig, LifecycleController, LifecycleSnapshot,
        MAX_DURATION, ProbeReport, ServiceState, SettleOutcome, StatusProbe, settle,
    },
    process::{CommandOutput, ProcessController, ServiceAction},
};

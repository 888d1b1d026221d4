//! [`IndicatorSink`] that forwards updates to the UI thread.

use crate::TrayCommand;

use service_tray_core::{IndicatorImage, IndicatorSink, MenuItemId};

use std::sync::{Mutex, PoisonError};

use notify_rust::Notification;
use tao::event_loop::EventLoopProxy;
use tokio::runtime::Handle;
use tracing::{debug, warn};

/// Posts tray updates to the event loop and shows desktop notifications.
///
/// Every method only enqueues: tray updates go through the event loop proxy,
/// notifications run on the blocking pool.
pub struct TraySink {
    proxy: Mutex<EventLoopProxy<TrayCommand>>,
    runtime: Handle,
    app_name: String,
}

impl TraySink {
    /// Create a sink posting to `proxy`, with notifications on `runtime`.
    pub fn new(proxy: EventLoopProxy<TrayCommand>, runtime: Handle, app_name: &str) -> Self {
        Self {
            proxy: Mutex::new(proxy),
            runtime,
            app_name: app_name.to_string(),
        }
    }

    /// Ask the event loop to exit.
    pub fn request_exit(&self) {
        self.send(TrayCommand::Shutdown);
    }

    fn send(&self, command: TrayCommand) {
        let proxy = self.proxy.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = proxy.send_event(command) {
            debug!(error = ?e, "Event loop closed, tray update dropped");
        }
    }
}

impl IndicatorSink for TraySink {
    fn set_image(&self, image: IndicatorImage) {
        self.send(TrayCommand::SetImage(image));
    }

    fn set_title(&self, title: &str) {
        self.send(TrayCommand::SetTitle(title.to_string()));
    }

    fn set_menu_enabled(&self, item: MenuItemId, enabled: bool) {
        self.send(TrayCommand::SetMenuEnabled(item, enabled));
    }

    fn set_menu_label(&self, item: MenuItemId, label: &str) {
        self.send(TrayCommand::SetMenuLabel(item, label.to_string()));
    }

    fn notify(&self, title: &str, body: &str) {
        let app_name = self.app_name.clone();
        let summary = title.to_string();
        let body = body.to_string();

        // Some backends block on a D-Bus round trip.
        self.runtime.spawn_blocking(move || {
            if let Err(e) = Notification::new()
                .appname(&app_name)
                .summary(&summary)
                .body(&body)
                .show()
            {
                warn!(error = ?e, summary = %summary, "Failed to show notification");
            }
        });
    }
}

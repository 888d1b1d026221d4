use crate::{AppCommand, AppResult, SystemctlController, TraySink};

use service_tray_core::{LifecycleController, MenuItemId};

use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};
use tray_icon::menu::{MenuEvent, MenuId};

/// Lifecycle controller wired to systemctl and the tray.
pub(crate) type Controller = LifecycleController<SystemctlController, Arc<TraySink>>;

/// Main application state.
///
/// Runs on the async runtime thread. Tray updates reach the main thread
/// through the sink's event loop proxy because `TrayIcon` is `!Send` and
/// must remain on the UI thread.
pub struct App {
    pub(crate) controller: Controller,
    pub(crate) sink: Arc<TraySink>,
    pub(crate) menu_ids: HashMap<MenuId, MenuItemId>,
    pub(crate) command_tx: mpsc::Sender<AppCommand>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
}

impl App {
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Service tray starting");

        self.controller.start();

        // Menu event forwarding via single persistent blocking task.
        //
        // MenuEvent::receiver() has a blocking recv(), so one thread waits
        // with no polling. When command_rx is dropped the next blocking_send
        // fails and the loop ends.
        let menu_ids = self.menu_ids.clone();
        let command_tx = self.command_tx.clone();
        let tray_handle = tokio::task::spawn_blocking(move || {
            let receiver = MenuEvent::receiver();
            while let Ok(event) = receiver.recv() {
                let Some(command) = menu_ids
                    .get(&event.id)
                    .copied()
                    .and_then(AppCommand::from_menu_item)
                else {
                    continue;
                };
                if command_tx.blocking_send(command).is_err() {
                    break;
                }
            }
        });

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                Some(command) = self.command_rx.recv() => {
                    if command == AppCommand::Shutdown {
                        info!("Exit requested from tray menu");
                        break;
                    }
                    self.handle_command(command);
                }

                () = &mut shutdown => {
                    info!("Termination signal received");
                    break;
                }

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        self.controller.shutdown();
        self.sink.request_exit();
        drop(self.command_rx);

        match tokio::time::timeout(Duration::from_secs(1), tray_handle).await {
            Ok(Ok(())) => info!("Menu event forwarder stopped cleanly"),
            Ok(Err(e)) => error!(error = ?e, "Menu event forwarder task panicked"),
            Err(_) => info!(
                "Menu event forwarder did not stop within timeout, \
                     will be cleaned up on exit"
            ),
        }

        info!("Service tray shut down successfully");

        Ok(())
    }

    #[instrument(skip(self))]
    fn handle_command(&self, command: AppCommand) {
        match command {
            AppCommand::Toggle => {
                if self.controller.toggle().is_none() {
                    debug!(state = %self.controller.state(), "Toggle ignored");
                }
            }
            AppCommand::Restart => {
                if self.controller.restart().is_none() {
                    debug!(state = %self.controller.state(), "Restart ignored");
                }
            }
            AppCommand::ShowLastError => {
                if !self.controller.show_last_error() {
                    debug!("No error recorded");
                }
            }
            AppCommand::Shutdown => {}
        }
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                let ctrl_c = tokio::select! {
                    result = tokio::signal::ctrl_c() => result,
                    _ = terminate.recv() => return,
                };
                if let Err(e) = ctrl_c {
                    warn!(error = ?e, "Ctrl-C handler failed");
                    terminate.recv().await;
                }
                return;
            }
            Err(e) => warn!(error = ?e, "Failed to install SIGTERM handler"),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = ?e, "Ctrl-C handler failed");
        std::future::pending::<()>().await;
    }
}

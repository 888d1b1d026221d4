//! Service-Tray: keeps a tray icon in step with one systemd service and lets
//! the user start, stop and restart it.

mod app;
mod app_command;
mod badge;
mod config;
mod error;
mod systemctl;
mod tray_command;
mod tray_manager;
mod tray_sink;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    error::{AppError, Result as AppResult},
    systemctl::SystemctlController,
    tray_command::TrayCommand,
    tray_manager::TrayManager,
    tray_sink::TraySink,
};

use crate::config::Config;

use service_tray_core::{LifecycleController, LifecycleSnapshot, MenuModel};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tao::{
    event::Event,
    event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy},
};
use tokio::{runtime::Handle, sync::mpsc};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "service_tray=info,service_tray_core=info";

/// Application entry point.
fn main() {
    let log_guard = init_tracing();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    let lifecycle_config = match config.to_lifecycle_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid config: {:?}", e);
            std::process::exit(1);
        }
    };

    let event_loop = EventLoopBuilder::<TrayCommand>::with_user_event().build();
    let tray_proxy = event_loop.create_proxy();

    // TrayManager lives on the main thread - TrayIcon is !Send on all platforms.
    let placeholder = MenuModel::from_snapshot(&LifecycleSnapshot::default(), &lifecycle_config.labels);
    let mut tray_manager = match TrayManager::new(&placeholder) {
        Ok(tm) => tm,
        Err(e) => {
            error!("Failed to create TrayManager: {:?}", e);
            std::process::exit(1);
        }
    };

    // Taken on Init so the runtime thread is spawned exactly once.
    let mut startup = Some((config, lifecycle_config));

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(TrayCommand::Shutdown) => {
                info!("Exiting event loop");
                *control_flow = ControlFlow::ExitWithCode(0);
            }
            Event::UserEvent(command) => {
                if let Err(e) = tray_manager.apply(command) {
                    error!(error = ?e, "Failed to update tray");
                }
            }
            Event::NewEvents(tao::event::StartCause::Init) => {
                let Some((config, lifecycle_config)) = startup.take() else {
                    return;
                };

                #[cfg(target_os = "macos")]
                unsafe {
                    use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};
                    CFRunLoopWakeUp(CFRunLoopGetMain());
                }

                let tray_proxy = tray_proxy.clone();
                let menu_ids = tray_manager.menu_ids();

                // Spawn tokio runtime on separate thread.
                // TrayManager stays on the main thread.
                std::thread::spawn(move || {
                    let rt = match tokio::runtime::Runtime::new() {
                        Ok(rt) => rt,
                        Err(e) => {
                            error!("Failed to create tokio runtime: {:?}", e);
                            std::process::exit(1);
                        }
                    };

                    rt.block_on(async {
                        let sink = Arc::new(TraySink::new(
                            tray_proxy.clone(),
                            Handle::current(),
                            &config.service.display_name,
                        ));

                        let controller = match LifecycleController::new(
                            lifecycle_config,
                            SystemctlController::new(&config.service, &config.details),
                            Arc::clone(&sink),
                        ) {
                            Ok(c) => c,
                            Err(e) => {
                                error!(error = ?e, "Failed to create lifecycle controller");
                                if let Err(e) = request_exit(&tray_proxy) {
                                    warn!(error = ?e, "Event loop already closed");
                                }
                                return;
                            }
                        };

                        let (command_tx, command_rx) = mpsc::channel(32);

                        let app = App {
                            controller,
                            sink,
                            menu_ids,
                            command_tx,
                            command_rx,
                        };

                        if let Err(e) = app.run().await {
                            error!(error = ?e, "App error");
                            if let Err(e) = request_exit(&tray_proxy) {
                                warn!(error = ?e, "Event loop already closed");
                            }
                        }
                    });
                });
            }
            _ => {}
        }

        // Keep the log writer alive for the app's lifetime.
        let _ = &log_guard;
    });
}

/// Stderr logging plus a daily JSON log file in the data directory.
fn init_tracing() -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let log_dir = Config::log_dir();
    let (file_layer, guard) = match &log_dir {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "service-tray.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().json().with_writer(writer)), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    if let Err(e) = log_dir {
        warn!(error = ?e, "File logging disabled");
    }

    guard
}

#[track_caller]
fn request_exit(proxy: &EventLoopProxy<TrayCommand>) -> AppResult<()> {
    proxy
        .send_event(TrayCommand::Shutdown)
        .map_err(|e| AppError::ChannelSendFailed {
            message: format!("Failed to post shutdown to event loop: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
}

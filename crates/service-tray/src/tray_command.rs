use service_tray_core::{IndicatorImage, MenuItemId};

/// Commands sent from the async runtime to the main UI thread.
///
/// The main thread owns `TrayManager` (because `TrayIcon` is `!Send`),
/// so all tray mutations flow through this enum.
#[derive(Debug, Clone)]
pub enum TrayCommand {
    /// Replace the tray icon.
    SetImage(IndicatorImage),
    /// Replace the tooltip/title.
    SetTitle(String),
    /// Enable or disable a menu item.
    SetMenuEnabled(MenuItemId, bool),
    /// Replace the text of a menu item.
    SetMenuLabel(MenuItemId, String),
    /// Shut down the application. The main thread will exit the event loop.
    Shutdown,
}

use service_tray_core::MenuItemId;

/// User requests handled by the application loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Start when stopped, stop when running.
    Toggle,
    /// Restart a running service.
    Restart,
    /// Show the last recorded error as a notification.
    ShowLastError,
    /// Request application shutdown.
    Shutdown,
}

impl AppCommand {
    /// Command for a clicked menu item. Read-only items have none.
    pub fn from_menu_item(item: MenuItemId) -> Option<Self> {
        match item {
            MenuItemId::Toggle => Some(Self::Toggle),
            MenuItemId::Restart => Some(Self::Restart),
            MenuItemId::ShowLastError => Some(Self::ShowLastError),
            MenuItemId::Quit => Some(Self::Shutdown),
            MenuItemId::Status | MenuItemId::Details => None,
        }
    }
}

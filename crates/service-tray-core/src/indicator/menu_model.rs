use crate::{LifecycleSnapshot, ServiceState};

/// Menu entries the indicator exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuItemId {
    /// Read-only status line.
    Status,
    /// Read-only supplementary listing (e.g. installed models).
    Details,
    /// Start when stopped, stop when running.
    Toggle,
    /// Restart a running service.
    Restart,
    /// Show the sticky last error.
    ShowLastError,
    /// Exit the tray.
    Quit,
}

impl MenuItemId {
    /// All items in display order.
    pub const ALL: [Self; 6] = [
        Self::Status,
        Self::Details,
        Self::Toggle,
        Self::Restart,
        Self::ShowLastError,
        Self::Quit,
    ];
}

/// Naming used when rendering menu text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuLabels {
    /// Human-readable service name, e.g. "Ollama".
    pub display_name: String,
    /// Prefix of the details line, e.g. "Models".
    pub detail_label: String,
    /// How many detail entries to list before eliding.
    pub max_details: usize,
}

impl Default for MenuLabels {
    fn default() -> Self {
        Self {
            display_name: "Service".to_string(),
            detail_label: "Details".to_string(),
            max_details: 3,
        }
    }
}

/// Everything the indicator shows, derived from one snapshot.
///
/// Recomputed on every change instead of cached, so labels can never lag
/// behind the state they describe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuModel {
    /// Tooltip/title text.
    pub title: String,
    /// Status line text.
    pub status: String,
    /// Details line text.
    pub details: String,
    /// Toggle item text.
    pub toggle: String,
    /// Whether toggle is accepted.
    pub toggle_enabled: bool,
    /// Restart item text.
    pub restart: String,
    /// Whether restart is accepted.
    pub restart_enabled: bool,
    /// Show-last-error item text.
    pub show_error: String,
    /// Whether show-last-error is accepted.
    pub show_error_enabled: bool,
}

impl MenuModel {
    /// Build the menu for `snapshot`.
    pub fn from_snapshot(snapshot: &LifecycleSnapshot, labels: &MenuLabels) -> Self {
        let name = &labels.display_name;
        let state = snapshot.state;

        Self {
            title: title_for(state, name),
            status: status_line_for(state, name),
            details: details_line(snapshot, labels),
            toggle: if state == ServiceState::Running {
                format!("Stop {name}")
            } else {
                format!("Start {name}")
            },
            toggle_enabled: state.accepts_toggle(),
            restart: format!("Restart {name}"),
            restart_enabled: state.accepts_restart(),
            show_error: if snapshot.last_error.is_some() {
                "Show Last Error".to_string()
            } else {
                "(No errors)".to_string()
            },
            show_error_enabled: snapshot.last_error.is_some(),
        }
    }

    /// Text for `item`.
    pub fn label(&self, item: MenuItemId) -> &str {
        match item {
            MenuItemId::Status => &self.status,
            MenuItemId::Details => &self.details,
            MenuItemId::Toggle => &self.toggle,
            MenuItemId::Restart => &self.restart,
            MenuItemId::ShowLastError => &self.show_error,
            MenuItemId::Quit => "Quit Tray",
        }
    }

    /// Whether `item` is currently clickable.
    pub fn enabled(&self, item: MenuItemId) -> bool {
        match item {
            MenuItemId::Status | MenuItemId::Details => false,
            MenuItemId::Toggle => self.toggle_enabled,
            MenuItemId::Restart => self.restart_enabled,
            MenuItemId::ShowLastError => self.show_error_enabled,
            MenuItemId::Quit => true,
        }
    }
}

/// Tooltip text for `state`.
pub fn title_for(state: ServiceState, name: &str) -> String {
    match state {
        ServiceState::Running => format!("{name} - Running"),
        ServiceState::Stopped => format!("{name} - Stopped"),
        ServiceState::Starting => format!("{name} - Starting..."),
        ServiceState::Stopping => format!("{name} - Stopping..."),
        ServiceState::Error => format!("{name} - Error"),
    }
}

fn status_line_for(state: ServiceState, name: &str) -> String {
    match state {
        ServiceState::Running => format!("● {name}: Running"),
        ServiceState::Starting => format!("◐ {name}: Starting..."),
        ServiceState::Stopping => format!("◐ {name}: Stopping..."),
        ServiceState::Error => format!("✕ {name}: Error"),
        ServiceState::Stopped => format!("○ {name}: Stopped"),
    }
}

fn details_line(snapshot: &LifecycleSnapshot, labels: &MenuLabels) -> String {
    let label = &labels.detail_label;

    if snapshot.state != ServiceState::Running {
        return format!("{label}: (offline)");
    }

    match snapshot.details.as_deref() {
        Some(entries) if !entries.is_empty() => {
            let shown = entries
                .iter()
                .take(labels.max_details)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            let ellipsis = if entries.len() > labels.max_details {
                "..."
            } else {
                ""
            };
            format!("{label}: {shown}{ellipsis}")
        }
        _ => format!("{label}: (none)"),
    }
}

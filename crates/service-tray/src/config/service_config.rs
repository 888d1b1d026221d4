use crate::config::{default_display_name, default_service_name, default_systemctl, default_use_sudo};

use serde::{Deserialize, Serialize};

/// Supervised service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// systemd unit name.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Name shown in the menu, tooltip and notifications.
    #[serde(default = "default_display_name")]
    pub display_name: String,

    /// Prefix start/stop/restart with `sudo`. Status queries never use it.
    #[serde(default = "default_use_sudo")]
    pub use_sudo: bool,

    /// Path or name of the systemctl executable.
    #[serde(default = "default_systemctl")]
    pub systemctl: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            display_name: default_display_name(),
            use_sudo: default_use_sudo(),
            systemctl: default_systemctl(),
        }
    }
}

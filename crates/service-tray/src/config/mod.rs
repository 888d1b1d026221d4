#[allow(clippy::module_inception)]
mod config;
mod details_config;
mod service_config;
mod timing_config;

pub(crate) use {
    config::Config, details_config::DetailsConfig, service_config::ServiceConfig,
    timing_config::TimingConfig,
};

pub(crate) const DEFAULT_SERVICE_NAME: &str = "ollama";
pub(crate) const DEFAULT_DISPLAY_NAME: &str = "Ollama";
pub(crate) const DEFAULT_USE_SUDO: bool = true;
pub(crate) const DEFAULT_SYSTEMCTL: &str = "systemctl";
pub(crate) const DEFAULT_DETAILS_LABEL: &str = "Models";
pub(crate) const DEFAULT_MAX_SHOWN: usize = 3;

pub(crate) fn default_service_name() -> String {
    DEFAULT_SERVICE_NAME.to_string()
}

pub(crate) fn default_display_name() -> String {
    DEFAULT_DISPLAY_NAME.to_string()
}

pub(crate) fn default_use_sudo() -> bool {
    DEFAULT_USE_SUDO
}

pub(crate) fn default_systemctl() -> String {
    DEFAULT_SYSTEMCTL.to_string()
}

pub(crate) fn default_details_label() -> String {
    DEFAULT_DETAILS_LABEL.to_string()
}

pub(crate) fn default_details_command() -> Option<Vec<String>> {
    Some(vec!["ollama".to_string(), "list".to_string()])
}

pub(crate) fn default_max_shown() -> usize {
    DEFAULT_MAX_SHOWN
}

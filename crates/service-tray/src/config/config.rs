//! Configuration management for service-tray.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, validation into core tunables, and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{DetailsConfig, ServiceConfig, TimingConfig},
};

use service_tray_core::{LifecycleConfig, MenuLabels};

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Supervised service.
    #[serde(default)]
    pub service: ServiceConfig,
    /// Timeouts, polling budgets and animation cadence.
    #[serde(default)]
    pub timing: TimingConfig,
    /// Supplementary listing shown while running.
    #[serde(default)]
    pub details: DetailsConfig,
}

impl Config {
    /// Load configuration from disk, creating default if not found.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = fs::read_to_string(&config_path)
                .map_err(|e| AppError::config(format!("Failed to read config: {e}")))?;

            let config = Self::parse(&contents)?;

            info!(config_path = ?config_path, "Configuration loaded");

            Ok(config)
        } else {
            info!("No config found, creating default");
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    /// Parse TOML text. Missing sections and keys take their defaults.
    #[track_caller]
    pub fn parse(contents: &str) -> AppResult<Self> {
        toml::from_str(contents).map_err(|e| AppError::config(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to `config_path` using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, config_path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| AppError::config(format!("Failed to serialize config: {e}")))?;

        let temp_path = config_path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path)
            .map_err(|e| AppError::config(format!("Failed to create temp config file: {e}")))?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::config(format!("Failed to write temp config file: {e}")))?;

        temp_file
            .sync_all()
            .map_err(|e| AppError::config(format!("Failed to sync temp config file: {e}")))?;

        fs::rename(&temp_path, config_path).map_err(|e| {
            AppError::config(format!("Failed to rename temp config to final: {e}"))
        })?;

        info!(config_path = ?config_path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// Convert into validated core tunables.
    #[track_caller]
    pub fn to_lifecycle_config(&self) -> AppResult<LifecycleConfig> {
        let timing = &self.timing;

        let config = LifecycleConfig {
            labels: MenuLabels {
                display_name: self.service.display_name.clone(),
                detail_label: self.details.label.clone(),
                max_details: self.details.max_shown,
            },
            probe_timeout: Duration::from_millis(timing.probe_timeout_ms),
            action_timeout: Duration::from_millis(timing.action_timeout_ms),
            settle_interval: Duration::from_millis(timing.settle_interval_ms),
            stop_attempts: timing.stop_attempts,
            start_attempts: timing.start_attempts,
            monitor_interval: Duration::from_millis(timing.monitor_interval_ms),
            animation_period: Duration::from_millis(timing.animation_period_ms),
            ..LifecycleConfig::new(self.service.name.clone())
        };

        config.validate()?;

        Ok(config)
    }

    /// Directory for rolling log files, created on demand.
    #[track_caller]
    pub fn log_dir() -> AppResult<PathBuf> {
        let proj_dirs = Self::project_dirs()?;
        let log_dir = proj_dirs.data_dir().join("logs");

        if !log_dir.exists() {
            fs::create_dir_all(&log_dir)?;
        }

        Ok(log_dir)
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        let proj_dirs = Self::project_dirs()?;
        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Ok(config_dir.join("config.toml"))
    }

    #[track_caller]
    fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from("com", "service-tray", "Service-Tray")
            .ok_or_else(|| AppError::config("Failed to get project directories"))
    }
}

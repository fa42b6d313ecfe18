use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;

use crate::models::settings::Settings;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "DASHBOARD_GANTT_CONFIG";

const CONFIG_FILE_NAME: &str = "config.toml";

pub struct SettingsService {
    path: Option<PathBuf>,
}

impl SettingsService {
    /// Use `path` if given, else the environment variable, else the platform config dir.
    pub fn new(path: Option<PathBuf>) -> Self {
        let path = path
            .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from))
            .or_else(Self::default_path);
        Self { path }
    }

    /// `<config dir>/dashboard-gantt/config.toml` for the current platform.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dashboard-gantt")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Load settings; a missing file yields defaults.
    pub fn get(&self) -> Result<Settings> {
        let Some(path) = self.path.as_deref() else {
            log::warn!("No config location available, using default settings");
            return Ok(Settings::default());
        };

        if !path.exists() {
            log::info!("Config file {:?} not found, using defaults", path);
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;

        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings in {:?}: {}", path, e))?;

        log::debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Write settings, creating the parent directory if needed.
    pub fn update(&self, settings: &Settings) -> Result<()> {
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings: {}", e))?;

        let path = self
            .path
            .as_deref()
            .ok_or_else(|| anyhow!("No config location available"))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let content = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
        fs::write(path, content).with_context(|| format!("Failed to write config file {:?}", path))?;
        Ok(())
    }
}

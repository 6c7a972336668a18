//! Settings persistence: a TOML file plus environment overrides.

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

use crate::models::settings::Settings;

pub const SETTINGS_FILE: &str = "planner.toml";
pub const ENV_API_URL: &str = "PLANNER_API_URL";
pub const ENV_API_TOKEN: &str = "PLANNER_API_TOKEN";

pub struct SettingsService {
    path: PathBuf,
}

impl SettingsService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Service for the platform config directory, falling back to the
    /// working directory when no home directory can be determined.
    pub fn default_location() -> Self {
        let path = ProjectDirs::from("com", "Planificador", "TaskPlanner")
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
            .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE));
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file (defaults when missing), without environment overrides.
    pub fn load_file(&self) -> Result<Settings> {
        if !self.path.exists() {
            log::debug!("No settings file at {}, using defaults", self.path.display());
            return Ok(Settings::default());
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let settings: Settings = toml::from_str(&raw)
            .with_context(|| format!("Invalid settings file {}", self.path.display()))?;
        Ok(settings)
    }

    /// Read the file and apply `PLANNER_API_URL` / `PLANNER_API_TOKEN`.
    pub fn load(&self) -> Result<Settings> {
        let mut settings = self.load_file()?;
        apply_overrides(&mut settings, |key| std::env::var(key).ok());
        settings.validate().map_err(|e| anyhow!(e))?;
        Ok(settings)
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        settings.validate().map_err(|e| anyhow!(e))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let raw = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))?;
        Ok(())
    }
}

fn apply_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
        settings.api_url = url;
    }
    if let Some(token) = lookup(ENV_API_TOKEN).filter(|v| !v.trim().is_empty()) {
        settings.api_token = Some(token);
    }
}

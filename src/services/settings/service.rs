use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use log::{debug, info};

use crate::error::{GridError, Result};
use crate::models::settings::CalendarSettings;

pub const SETTINGS_FILE: &str = "calendar.toml";

/// `calendar.toml` in the platform config directory, if one exists.
pub fn default_settings_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "CalendarGrid", "calendar-grid").map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
}

/// Loads and validates calendar settings documents.
pub struct SettingsService {
    path: Option<PathBuf>,
}

impl SettingsService {
    /// Service reading `path`, or the default location when `None`.
    pub fn new(path: Option<&Path>) -> Self {
        Self {
            path: path.map(Path::to_path_buf).or_else(default_settings_path),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Get the current settings
    ///
    /// A missing file yields the defaults. A file that exists but does not
    /// parse or validate is a configuration error.
    pub fn load(&self) -> Result<CalendarSettings> {
        let Some(path) = self.path.as_deref() else {
            debug!("No config directory available, using default settings");
            return Ok(CalendarSettings::default());
        };

        if !path.exists() {
            debug!("{} not found, using default settings", path.display());
            return Ok(CalendarSettings::default());
        }

        let text = fs::read_to_string(path)?;
        let settings = Self::parse_str(&text)?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Parse and validate a TOML settings document.
    pub fn parse_str(text: &str) -> Result<CalendarSettings> {
        let settings: CalendarSettings = toml::from_str(text)?;
        settings
            .validate()
            .map_err(|e| GridError::configuration(format!("Invalid settings: {}", e)))?;
        Ok(settings)
    }

    /// Write `settings` back as TOML, creating parent directories.
    pub fn save(&self, settings: &CalendarSettings) -> Result<()> {
        settings
            .validate()
            .map_err(|e| GridError::configuration(format!("Invalid settings: {}", e)))?;

        let path = self
            .path
            .as_deref()
            .ok_or_else(|| GridError::configuration("No settings path available"))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let text = toml::to_string_pretty(settings)
            .map_err(|e| GridError::configuration(format!("Failed to serialize settings: {}", e)))?;
        fs::write(path, text)?;
        Ok(())
    }
}

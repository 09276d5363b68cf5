//! Game settings and preferences
//!
//! Persisted as JSON next to the scoreboard database.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::sim::SessionConfig;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Round tuning
    pub session: SessionConfig,
    /// Name pre-filled on the start screen
    pub last_player: Option<String>,
    /// Scoreboard database file (defaults to the data dir)
    pub scoreboard_path: Option<PathBuf>,
}

impl Settings {
    const APP_DIR: &'static str = "chase-tap";
    const FILE_NAME: &'static str = "settings.json";
    const DB_NAME: &'static str = "scoreboard.sqlite";

    /// Per-user data directory, falling back to the working directory
    pub fn data_dir() -> PathBuf {
        dirs::data_dir()
            .map(|d| d.join(Self::APP_DIR))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn default_path() -> PathBuf {
        Self::data_dir().join(Self::FILE_NAME)
    }

    /// Where the scoreboard lives for these settings
    pub fn scoreboard_path(&self) -> PathBuf {
        self.scoreboard_path
            .clone()
            .unwrap_or_else(|| Self::data_dir().join(Self::DB_NAME))
    }

    /// Load settings, falling back to defaults if missing or unreadable
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(SettingsError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring settings at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn try_load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save settings as pretty JSON, creating the directory if needed
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }
}

//! Persistent defaults for the command line

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use ss44_control::{ControllerConfig, SerialConfig};
use ss44_protocol::Unit;

/// Saved connection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Serial port path
    #[serde(default = "default_port")]
    pub port: String,
    /// Baud rate
    #[serde(default = "default_baud")]
    pub baud_rate: u32,
    /// Switcher unit number
    #[serde(default)]
    pub unit: u8,
    /// Per-line read timeout in milliseconds
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    /// Pause before the final mute-all of the exercise sequence
    #[serde(default = "default_exercise_pause_ms")]
    pub exercise_pause_ms: u64,
}

fn default_port() -> String {
    "/dev/ttyUSB0".to_string()
}

fn default_baud() -> u32 {
    9600
}

fn default_read_timeout_ms() -> u64 {
    1000
}

fn default_exercise_pause_ms() -> u64 {
    2000
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: default_port(),
            baud_rate: default_baud(),
            unit: 0,
            read_timeout_ms: default_read_timeout_ms(),
            exercise_pause_ms: default_exercise_pause_ms(),
        }
    }
}

impl Settings {
    /// Get the XDG config directory for ss44
    /// Uses $XDG_CONFIG_HOME/ss44 on Linux/macOS, falls back to ~/.config/ss44
    fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join("ss44"));
            }
        }

        dirs::home_dir().map(|h| h.join(".config").join("ss44"))
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Ignoring settings file: {:#}", e);
                Self::default()
            }
        }
    }

    /// Load settings from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Save settings to disk
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::settings_path().context("could not determine settings path")?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save settings to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("failed to create settings directory")?;
        }
        let json = serde_json::to_string_pretty(self).context("failed to serialize settings")?;
        std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            unit: Unit(self.unit),
            read_timeout: self.read_timeout(),
        }
    }

    pub fn serial_config(&self) -> SerialConfig {
        SerialConfig {
            port: self.port.clone(),
            baud_rate: self.baud_rate,
            read_timeout: self.read_timeout(),
        }
    }
}

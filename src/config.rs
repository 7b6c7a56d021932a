//! Application configuration persistence
//!
//! Stores user preferences in `~/.config/quickchat/config.yaml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::playback::PlaybackOptions;

/// Settings that persist across sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Macro file used last, loaded when no file is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_file: Option<PathBuf>,
    /// How long an opened menu waits for its activation key
    pub menu_close_delay_ms: u64,
    /// Pause after opening chat, before typing
    pub chat_open_delay_ms: u64,
    /// Pause after each typed character
    pub key_delay_us: u64,
    /// How long each key is held; 0 taps keys back to back
    pub key_hold_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            last_file: None,
            menu_close_delay_ms: 2000,
            chat_open_delay_ms: 50,
            key_delay_us: 100,
            key_hold_ms: 0,
        }
    }
}

impl AppConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load config from `path`, or return defaults if missing or malformed
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Remember the macro file in use and save
    pub fn set_last_file(&mut self, path: &Path) -> Result<(), String> {
        if self.last_file.as_deref() == Some(path) {
            return Ok(());
        }
        self.last_file = Some(path.to_path_buf());
        self.save()
    }

    pub fn menu_close_delay(&self) -> Duration {
        Duration::from_millis(self.menu_close_delay_ms)
    }

    pub fn playback_options(&self) -> PlaybackOptions {
        PlaybackOptions {
            chat_open_delay: Duration::from_millis(self.chat_open_delay_ms),
            key_delay: Duration::from_micros(self.key_delay_us),
            hold: Duration::from_millis(self.key_hold_ms),
        }
    }
}

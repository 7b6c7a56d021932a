//! Centralized configuration paths for quickchat
//!
//! All config files live under:
//! - Unix/macOS: `~/.config/quickchat/`
//! - Windows: `%APPDATA%\quickchat\`
//!
//! This module is the single source of truth for config paths.

use std::{
    env, fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

const APP_DIR: &str = "quickchat";

/// File name suggested for a new macro file
pub const DEFAULT_MACROS_FILE: &str = "quickchats.yml";

/// Base config directory for quickchat
///
/// Unix/macOS:
///   - If XDG_CONFIG_HOME is set: `$XDG_CONFIG_HOME/quickchat`
///   - Else: `~/.config/quickchat`
///
/// Windows:
///   - `%APPDATA%\quickchat`
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join(APP_DIR))
    }

    #[cfg(not(target_os = "windows"))]
    {
        env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .map(|config| config.join(APP_DIR))
    }
}

/// `~/.config/quickchat/config.yaml`
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.yaml"))
}

/// `~/.config/quickchat/configs/`, where macro files are kept
pub fn macros_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("configs"))
}

/// `~/.config/quickchat/logs/`
pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("logs"))
}

/// Macro files (`.yml`/`.yaml`) in `dir`, most recently used first
///
/// "Used" is the access time where the filesystem records it, else the
/// modification time.
pub fn recent_macro_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut files: Vec<(PathBuf, SystemTime)> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml"))
                    .unwrap_or(false)
        })
        .map(|path| {
            let used = fs::metadata(&path)
                .and_then(|m| m.accessed().or_else(|_| m.modified()))
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (path, used)
        })
        .collect();

    // Newest first; ties broken by name for a stable order
    files.sort_by(|(a_path, a_time), (b_path, b_time)| {
        b_time.cmp(a_time).then_with(|| a_path.cmp(b_path))
    });
    files.into_iter().map(|(path, _)| path).collect()
}

fn ensure_dir(path: &Path) -> Result<(), String> {
    fs::create_dir_all(path)
        .map_err(|e| format!("Failed to create directory {}: {}", path.display(), e))
}

/// Ensure the base config dir exists, returning it
pub fn ensure_config_dir() -> Result<PathBuf, String> {
    let dir = config_dir().ok_or_else(|| "No config directory available".to_string())?;
    ensure_dir(&dir)?;
    Ok(dir)
}

/// Ensure logs dir exists, returning it
pub fn ensure_logs_dir() -> Result<PathBuf, String> {
    let config = ensure_config_dir()?;
    let logs = config.join("logs");
    ensure_dir(&logs)?;
    Ok(logs)
}

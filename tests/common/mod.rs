//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use quickchat::cli::{self, Command};
use quickchat::config::AppConfig;
use quickchat::macros::DEFAULT_MACROS_YAML;
use quickchat::Keycode;

pub const NUM7: Keycode = Keycode(71);
pub const NUM9: Keycode = Keycode(73);
pub const NUM4: Keycode = Keycode(75);
pub const NUM5: Keycode = Keycode(76);
pub const NUM6: Keycode = Keycode(77);
pub const NUM2: Keycode = Keycode(80);
pub const NUM3: Keycode = Keycode(81);

/// Write `yaml` to `name` inside `dir`, returning the path
pub fn write_file(dir: &Path, name: &str, yaml: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, yaml).unwrap();
    path
}

/// A temp dir holding the starter macro file
pub fn starter_file() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "quickchats.yml", DEFAULT_MACROS_YAML);
    (dir, path)
}

/// Run a command against `file` and capture its output
pub fn run_command(command: Command, file: &Path) -> anyhow::Result<String> {
    let mut out = Vec::new();
    cli::execute(&command, Some(file), &AppConfig::default(), &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

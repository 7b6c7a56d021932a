//! Logging setup
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=quickchat::dispatch=debug` - module-level filtering
//!
//! # Log Files
//!
//! Logs are written to `~/.config/quickchat/logs/quickchat.log` with daily
//! rotation. Files older than [`LOG_RETENTION`] are deleted at startup.

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// How long rotated log files are kept
pub const LOG_RETENTION: Duration = Duration::from_secs(3 * 24 * 60 * 60);

const LOG_FILE_PREFIX: &str = "quickchat.log";

/// Initialize tracing subscriber with console and file logging
///
/// Console output respects RUST_LOG; without it, `verbose` selects `info`
/// and the default is `warn`. File logging always records `debug`.
pub fn init(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Console layer - respects RUST_LOG
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(console_filter);

    // File layer - always debug level for troubleshooting
    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            prune_old_logs(&logs_dir, LOG_RETENTION);
            let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_names(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {}", e);
            None
        }
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}

/// Delete log files in `dir` last modified more than `max_age` ago.
/// Returns how many were removed.
pub fn prune_old_logs(dir: &Path, max_age: Duration) -> usize {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };
    let Some(cutoff) = SystemTime::now().checked_sub(max_age) else {
        return 0;
    };

    let mut removed = 0;
    for path in entries.filter_map(|e| e.ok()).map(|e| e.path()) {
        let is_log = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(LOG_FILE_PREFIX));
        if !is_log {
            continue;
        }

        let stale = fs::metadata(&path)
            .and_then(|m| m.modified())
            .is_ok_and(|modified| modified < cutoff);
        if stale && fs::remove_file(&path).is_ok() {
            removed += 1;
        }
    }
    removed
}

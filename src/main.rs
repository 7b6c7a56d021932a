use std::path::Path;

use anyhow::Result;
use clap::Parser;

use quickchat::cli::{self, CliArgs};
use quickchat::config::AppConfig;
use quickchat::config_paths;

fn main() -> Result<()> {
    let args = CliArgs::parse();
    quickchat::tracing::init(args.verbose);

    let mut config = AppConfig::load();
    let macros_dir = config_paths::macros_dir();
    let file = cli::macro_file(&args, &config, macros_dir.as_deref());
    tracing::debug!("Using macro file {:?}", file);

    // `run` blocks until the hook stops
    remember_file(&mut config, file.as_deref());

    let mut stdout = std::io::stdout().lock();
    cli::execute(&args.command, file.as_deref(), &config, &mut stdout)?;

    remember_file(&mut config, file.as_deref());
    Ok(())
}

fn remember_file(config: &mut AppConfig, file: Option<&Path>) {
    let Some(path) = file.filter(|p| p.is_file()) else {
        return;
    };
    let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if let Err(e) = config.set_last_file(&path) {
        tracing::warn!("Failed to remember macro file: {}", e);
    }
}

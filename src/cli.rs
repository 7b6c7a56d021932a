//! Command-line interface
//!
//! Supports:
//! - Listing and checking macro files
//! - Editing macros (add, remove, set) and rewriting files canonically
//! - Replaying scripted key events through the dispatcher
//! - Running the overlay against the system keyboard hook

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::config::AppConfig;
use crate::config_paths::{recent_macro_files, DEFAULT_MACROS_FILE};
use crate::dispatch::{self, DispatchAction, Dispatcher};
use crate::hook;
use crate::keycodes::{keyname, KeyParseError, Keycode};
use crate::macros::{KeyChange, Macro, MacroId, Macros, MacrosError, DEFAULT_MACROS_YAML};
use crate::playback::{Injected, RecordingInjector};

/// Quick-chat macros: type preset chat lines with a hotkey
#[derive(Parser, Debug)]
#[command(name = "quickchat", version, about = "Quick-chat macros for games")]
pub struct CliArgs {
    /// Macro file to use (default: most recently used file in the config dir)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Log progress to the console
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show macros grouped by menu
    List {
        /// Only show one menu (`none` for the top level)
        #[arg(long, value_name = "KEY")]
        menu: Option<KeyArg>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Load the macro file and report problems
    Check,
    /// Add a macro and save
    Add {
        /// Key that fires the macro
        #[arg(value_parser = Keycode::parse_known)]
        activation: Keycode,
        /// Text to type (default: "What a save!")
        text: Option<String>,
        /// Menu the macro lives in (`esc` for the top level)
        #[arg(long, value_name = "KEY", value_parser = Keycode::parse_known)]
        menu: Option<Keycode>,
        /// Key that opens chat first (`none` to type straight away)
        #[arg(long, value_name = "KEY")]
        chat_opener: Option<KeyArg>,
        /// Save even if other macros are incomplete (they are dropped)
        #[arg(long)]
        force: bool,
    },
    /// Remove a macro and save
    Remove {
        #[command(flatten)]
        target: MacroSelector,
        /// Save even if other macros are incomplete (they are dropped)
        #[arg(long)]
        force: bool,
    },
    /// Change a macro and save
    Set {
        #[command(flatten)]
        target: MacroSelector,
        /// Move the macro to another menu (`none` or `esc` for the top level)
        #[arg(long, value_name = "KEY")]
        new_menu: Option<KeyArg>,
        /// Bind a new activation key
        #[arg(long, value_name = "KEY", value_parser = Keycode::parse_known)]
        new_activation: Option<Keycode>,
        /// Key that opens chat first (`none` to type straight away)
        #[arg(long, value_name = "KEY")]
        chat_opener: Option<KeyArg>,
        /// New text; the macro is renamed after it
        #[arg(long)]
        text: Option<String>,
        /// Save even if a macro is incomplete (it is dropped)
        #[arg(long)]
        force: bool,
    },
    /// Rewrite the macro file in canonical form
    Fmt {
        /// Drop incomplete macros instead of failing
        #[arg(long)]
        force: bool,
    },
    /// Write the starter macro file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// List key names and scancodes
    Keys,
    /// Replay scripted key events and show what would be typed
    Simulate {
        /// Script file (default: stdin)
        script: Option<PathBuf>,
    },
    /// Listen for hotkeys system-wide and play macros
    Run,
}

impl Command {
    /// Commands that create the macro file when it doesn't exist
    fn creates_file(&self) -> bool {
        matches!(self, Command::Add { .. } | Command::Init { .. })
    }
}

/// Which macro `remove` and `set` act on
///
/// Macros are found by key; a macro without an activation key can only
/// be found by name.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct MacroSelector {
    /// Activation key of the macro
    #[arg(required_unless_present = "name")]
    pub activation: Option<Keycode>,
    /// Menu of the macro
    #[arg(long, value_name = "KEY")]
    pub menu: Option<Keycode>,
    /// Name of the macro
    #[arg(long, conflicts_with = "activation")]
    pub name: Option<String>,
}

impl MacroSelector {
    pub fn by_key(menu: Option<Keycode>, activation: Keycode) -> Self {
        Self {
            activation: Some(activation),
            menu,
            name: None,
        }
    }

    pub fn by_name(name: &str) -> Self {
        Self {
            activation: None,
            menu: None,
            name: Some(name.to_string()),
        }
    }
}

/// A key argument that also accepts `none`. Only known keys are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyArg(pub Option<Keycode>);

impl FromStr for KeyArg {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("none") {
            return Ok(KeyArg(None));
        }
        Keycode::parse_known(s).map(|code| KeyArg(Some(code)))
    }
}

/// Pick the macro file for a command
///
/// An explicit path always wins. Otherwise the most recently used file in
/// `macros_dir` that loads cleanly is used, then the config's last file.
/// Commands that create files fall back to the default file name.
pub fn macro_file(
    args: &CliArgs,
    config: &AppConfig,
    macros_dir: Option<&Path>,
) -> Option<PathBuf> {
    if matches!(args.command, Command::Keys) {
        return None;
    }
    if let Some(path) = &args.file {
        return Some(path.clone());
    }
    if matches!(args.command, Command::Init { .. }) {
        return macros_dir.map(|dir| dir.join(DEFAULT_MACROS_FILE));
    }

    resolve_macro_file(macros_dir, config.last_file.as_deref()).or_else(|| {
        args.command
            .creates_file()
            .then(|| macros_dir.map(|dir| dir.join(DEFAULT_MACROS_FILE)))
            .flatten()
    })
}

/// The newest loadable macro file in `macros_dir`, else `last_file` if it exists
pub fn resolve_macro_file(macros_dir: Option<&Path>, last_file: Option<&Path>) -> Option<PathBuf> {
    if let Some(dir) = macros_dir {
        for path in recent_macro_files(dir) {
            match Macros::load(&path) {
                Ok(_) => return Some(path),
                Err(e) => tracing::warn!("Skipping {}: {}", path.display(), e),
            }
        }
    }
    last_file.filter(|p| p.is_file()).map(Path::to_path_buf)
}

/// Run one command against `file`, writing user output to `out`
pub fn execute<W: Write>(
    command: &Command,
    file: Option<&Path>,
    config: &AppConfig,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Keys => list_keys(out),
        Command::Init { force } => init(require_path(file)?, *force, out),
        Command::Add {
            activation,
            text,
            menu,
            chat_opener,
            force,
        } => {
            let path = require_path(file)?;
            let mut macros = if path.exists() {
                load(path)?
            } else {
                Macros::new()
            };
            let menu = menu.filter(|k| *k != Keycode::ESCAPE);
            let opener = chat_opener
                .map(|k| k.0)
                .unwrap_or(Some(Keycode::DEFAULT_CHAT_OPENER));
            let id = macros
                .add_macro(menu, Some(*activation), opener, text.as_deref())
                .map_err(|conflict| anyhow!("Cannot add macro: {}", conflict))?;
            if let Some(m) = macros.get(id) {
                writeln!(out, "Added {}", describe(m))?;
            }
            save(&mut macros, path, *force)?;
            writeln!(out, "Saved {}", path.display())?;
            Ok(())
        }
        Command::Remove { target, force } => {
            let path = require_file(file)?;
            let mut macros = load(path)?;
            let id = find(&macros, target)?;
            if let Some(m) = macros.remove_macro(id) {
                writeln!(out, "Removed {}", describe(&m))?;
            }
            save(&mut macros, path, *force)?;
            writeln!(out, "Saved {}", path.display())?;
            Ok(())
        }
        Command::Set {
            target,
            new_menu,
            new_activation,
            chat_opener,
            text,
            force,
        } => {
            let path = require_file(file)?;
            let mut macros = load(path)?;
            let id = find(&macros, target)?;
            let activation = macros.get(id).and_then(Macro::activation_key);

            if let Some(KeyArg(new_menu)) = new_menu {
                if macros.set_menu_key(id, *new_menu)? == KeyChange::ClearedActivation {
                    writeln!(
                        out,
                        "Activation key {} is taken in menu {}; activation key cleared",
                        keyname(activation),
                        keyname(*new_menu)
                    )?;
                }
            }
            if let Some(new_activation) = new_activation {
                if macros.set_activation_key(id, *new_activation)? == KeyChange::ClearedMenu {
                    writeln!(
                        out,
                        "Activation key {} is taken in its menu; moved to the top level",
                        new_activation
                    )?;
                }
            }
            if let Some(KeyArg(opener)) = chat_opener {
                macros.set_chat_opener_key(id, *opener)?;
            }
            if let Some(text) = text {
                macros.set_text(id, text)?;
            }

            if !macros.has_changed() {
                writeln!(out, "No changes")?;
                return Ok(());
            }
            if let Some(m) = macros.get(id) {
                writeln!(out, "Updated {}", describe(m))?;
            }
            save(&mut macros, path, *force)?;
            writeln!(out, "Saved {}", path.display())?;
            Ok(())
        }
        Command::List { menu, json } => {
            let macros = load(require_file(file)?)?;
            list(&macros, *menu, *json, out)
        }
        Command::Check => check(require_file(file)?, out),
        Command::Fmt { force } => fmt_file(require_file(file)?, *force, out),
        Command::Simulate { script } => {
            let macros = load(require_file(file)?)?;
            let script = read_script(script.as_deref())?;
            simulate(macros, &script, config, out)
        }
        Command::Run => {
            let path = require_file(file)?;
            let macros = load(path)?;
            let hook = hook::install()?;
            let mut injector = hook::system_injector()?;
            let mut dispatcher = Dispatcher::new(macros, config.menu_close_delay());
            writeln!(
                out,
                "Listening for {} macros from {}. Press Ctrl+C to quit.",
                dispatcher.macros().len(),
                path.display()
            )?;
            out.flush()?;
            dispatch::run(
                &mut dispatcher,
                hook.events(),
                &mut injector,
                &config.playback_options(),
            );
            Ok(())
        }
    }
}

fn require_path(file: Option<&Path>) -> Result<&Path> {
    file.ok_or_else(|| anyhow!("No config directory available; pass --file"))
}

fn require_file(file: Option<&Path>) -> Result<&Path> {
    let path = file.ok_or_else(|| {
        anyhow!("No macro file found; run `quickchat init` or pass --file")
    })?;
    if !path.is_file() {
        bail!("Macro file not found: {}", path.display());
    }
    Ok(path)
}

fn load(path: &Path) -> Result<Macros> {
    Macros::load(path).with_context(|| format!("Failed to load {}", path.display()))
}

fn save(macros: &mut Macros, path: &Path, force: bool) -> Result<()> {
    match macros.save(path, force) {
        Ok(()) => Ok(()),
        Err(e @ MacrosError::Incomplete(_)) => Err(anyhow!(
            "{}\n{}Pass --force to save without them.",
            e.title(),
            e.body()
        )),
        Err(e) => Err(e).with_context(|| format!("Failed to save {}", path.display())),
    }
}

fn find(macros: &Macros, target: &MacroSelector) -> Result<MacroId> {
    if let Some(name) = &target.name {
        let mut named = macros.get_all().into_iter().filter(|m| {
            m.name() == name && target.menu.map_or(true, |menu| m.menu_key() == Some(menu))
        });
        let found = named
            .next()
            .ok_or_else(|| anyhow!("No macro named \"{}\"", name))?;
        if named.next().is_some() {
            bail!("Several macros are named \"{}\"; select one by key", name);
        }
        return Ok(found.id());
    }

    let activation = target
        .activation
        .ok_or_else(|| anyhow!("Select a macro by activation key or --name"))?;
    macros
        .get_macro(target.menu, activation)
        .map(Macro::id)
        .ok_or_else(|| {
            anyhow!(
                "No macro on {} in {}",
                activation,
                menu_label(target.menu)
            )
        })
}

fn menu_label(menu: Option<Keycode>) -> String {
    match menu {
        Some(key) => format!("menu {}", key),
        None => "the top level".to_string(),
    }
}

/// `"Go left!" (Num7 → Num4)`
fn describe(m: &Macro) -> String {
    let activation = m
        .activation_key()
        .map(|k| k.to_string())
        .unwrap_or_else(|| "no activation key".to_string());
    match m.menu_key() {
        Some(menu) => format!("\"{}\" ({} → {})", m.name(), menu, activation),
        None => format!("\"{}\" ({})", m.name(), activation),
    }
}

/// What an incomplete macro still needs
fn missing_parts(m: &Macro) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if m.activation_key().is_none() {
        missing.push("activation key");
    }
    if m.text().is_empty() {
        missing.push("text");
    }
    missing
}

/// JSON form of a macro for `list --json`
#[derive(Debug, Serialize)]
struct ListedMacro<'a> {
    name: &'a str,
    menu: Option<String>,
    menu_keycode: Option<u16>,
    activation: Option<String>,
    activation_keycode: Option<u16>,
    chat_opener: Option<String>,
    chat_opener_keycode: Option<u16>,
    text: &'a str,
    complete: bool,
}

impl<'a> From<&'a Macro> for ListedMacro<'a> {
    fn from(m: &'a Macro) -> Self {
        Self {
            name: m.name(),
            menu: m.menu_key().map(|k| k.to_string()),
            menu_keycode: m.menu_key().map(|k| k.0),
            activation: m.activation_key().map(|k| k.to_string()),
            activation_keycode: m.activation_key().map(|k| k.0),
            chat_opener: m.chat_opener_key().map(|k| k.to_string()),
            chat_opener_keycode: m.chat_opener_key().map(|k| k.0),
            text: m.text(),
            complete: m.is_valid(),
        }
    }
}

fn list<W: Write>(macros: &Macros, menu: Option<KeyArg>, json: bool, out: &mut W) -> Result<()> {
    // Macros without an activation key are outside the key index
    let unbound: Vec<&Macro> = macros
        .get_all()
        .into_iter()
        .filter(|m| m.activation_key().is_none())
        .filter(|m| menu.map_or(true, |KeyArg(menu)| m.menu_key() == menu))
        .collect();
    let groups: Vec<Option<Keycode>> = match menu {
        Some(KeyArg(menu)) => vec![menu],
        None => std::iter::once(None)
            .chain(macros.menu_keys().into_iter().map(Some))
            .collect(),
    };

    if json {
        let listed: Vec<ListedMacro> = groups
            .iter()
            .flat_map(|menu| macros.get_menu_entries(*menu))
            .chain(unbound)
            .map(ListedMacro::from)
            .collect();
        serde_json::to_writer_pretty(&mut *out, &listed)?;
        writeln!(out)?;
        return Ok(());
    }

    for menu in groups {
        let entries = macros.get_menu_entries(menu);
        if entries.is_empty() {
            continue;
        }
        match menu {
            Some(key) => writeln!(out, "Menu {}:", key)?,
            None => writeln!(out, "Top level:")?,
        }
        for m in entries {
            write!(out, "  {}: {}", keyname(m.activation_key()), m.text())?;
            write_notes(m, out)?;
        }
    }

    if !unbound.is_empty() {
        writeln!(out, "Incomplete:")?;
        for m in unbound {
            write!(out, "  {}: {}", m.name(), m.text())?;
            if let Some(menu) = m.menu_key() {
                write!(out, "  [menu: {}]", menu)?;
            }
            write_notes(m, out)?;
        }
    }
    Ok(())
}

/// Trailing `[...]` notes of a listed macro, then the newline
fn write_notes<W: Write>(m: &Macro, out: &mut W) -> Result<()> {
    match m.chat_opener_key() {
        Some(Keycode::DEFAULT_CHAT_OPENER) => {}
        Some(opener) => write!(out, "  [chat: {}]", opener)?,
        None => write!(out, "  [no chat key]")?,
    }
    let missing = missing_parts(m);
    if !missing.is_empty() {
        write!(out, "  [missing {}]", missing.join(" and "))?;
    }
    writeln!(out)?;
    Ok(())
}

fn check<W: Write>(path: &Path, out: &mut W) -> Result<()> {
    let macros = load(path)?;

    let mut warnings = 0;
    for m in macros.get_all() {
        let keys = [
            ("menu key", m.menu_key()),
            ("activation key", m.activation_key()),
            ("chat opener key", m.chat_opener_key()),
        ];
        for (label, key) in keys {
            if let Some(key) = key.filter(|k| !k.is_known()) {
                writeln!(out, "warning: {} uses unknown {} {}", describe(m), label, key)?;
                warnings += 1;
            }
        }
        for part in missing_parts(m) {
            writeln!(out, "warning: {} has no {}", describe(m), part)?;
            warnings += 1;
        }
    }

    writeln!(
        out,
        "{}: {} macros in {} menus, {} warnings",
        path.display(),
        macros.len(),
        macros.menu_keys().len(),
        warnings
    )?;
    Ok(())
}

fn fmt_file<W: Write>(path: &Path, force: bool, out: &mut W) -> Result<()> {
    let mut macros = load(path)?;
    let current = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let canonical = match macros.to_yaml(force) {
        Ok(yaml) => yaml,
        Err(e @ MacrosError::Incomplete(_)) => {
            bail!("{}\n{}Pass --force to drop them.", e.title(), e.body())
        }
        Err(e) => return Err(e.into()),
    };
    if canonical == current {
        writeln!(out, "{} is already formatted", path.display())?;
        return Ok(());
    }

    save(&mut macros, path, force)?;
    writeln!(out, "Formatted {}", path.display())?;
    Ok(())
}

fn init<W: Write>(path: &Path, force: bool, out: &mut W) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        );
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_MACROS_YAML)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    writeln!(out, "Wrote starter macros to {}", path.display())?;
    Ok(())
}

fn list_keys<W: Write>(out: &mut W) -> Result<()> {
    for (code, name) in Keycode::all_named() {
        writeln!(out, "{:>4}  {}", code.0, name)?;
    }
    Ok(())
}

fn read_script(path: Option<&Path>) -> Result<Vec<hook::ScriptStep>> {
    let text = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read script from stdin")?;
            text
        }
    };
    hook::parse_script(&text).context("Invalid script")
}

/// Replay `script` and print every action with the keystrokes it typed
///
/// ```text
/// open Num7
///   Num4: I got it!
/// close Num7
/// play "I got it!": +T -T +I -I ...
/// ```
pub fn simulate<W: Write>(
    macros: Macros,
    script: &[hook::ScriptStep],
    config: &AppConfig,
    out: &mut W,
) -> Result<()> {
    let catalog = macros.clone();
    let mut dispatcher = Dispatcher::new(macros, config.menu_close_delay());
    let mut injector = RecordingInjector::new();
    let mut lines = Vec::new();

    dispatch::simulate(
        &mut dispatcher,
        script,
        &mut injector,
        &config.playback_options(),
        |action, injector| match action {
            DispatchAction::OpenMenu(view) => {
                lines.push(format!("open {}", view.menu));
                lines.extend(view.lines.iter().map(|l| format!("  {}: {}", l.key, l.text)));
            }
            DispatchAction::CloseMenu(menu) => lines.push(format!("close {}", menu)),
            DispatchAction::Play(id) => {
                let keys: Vec<String> = injector
                    .drain()
                    .into_iter()
                    .filter(|e| !matches!(e, Injected::Pause(_)))
                    .map(|e| e.to_string())
                    .collect();
                let name = catalog.get(*id).map(Macro::name).unwrap_or("?");
                lines.push(format!("play \"{}\": {}", name, keys.join(" ")));
            }
        },
    );

    for line in lines {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

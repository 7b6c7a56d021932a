//! Quick-chat macros and the registry that indexes them
//!
//! # Lookup
//!
//! ```text
//! menu key (None = top level) → activation key → Macro
//! ```
//!
//! A top-level macro fires when its activation key is pressed. A menu
//! macro fires when its activation key is pressed while its menu is open.
//!
//! # Loading
//!
//! ```ignore
//! let mut macros = Macros::load(Path::new("quickchats.yml"))?;
//! macros.add_macro(None, Some(Keycode(80)), Some(Keycode::DEFAULT_CHAT_OPENER), Some("gg"))?;
//! macros.save(Path::new("quickchats.yml"), false)?;
//! ```

mod chat_macro;
mod error;
mod file;
mod registry;

pub use chat_macro::{Macro, MacroId};
pub use error::{IncompleteMacro, KeyConflict, MacrosError};
pub use file::{dump_macro_yaml, load_macro_file, parse_macro_yaml, MacroEntry};
pub use registry::{KeyChange, Macros, DEFAULT_MACRO_TEXT};

/// Starter macro file written by `quickchat init`
pub const DEFAULT_MACROS_YAML: &str = include_str!("../../quickchats.yml");

#[cfg(test)]
mod tests;

//! Errors for the macro registry and macro files

use std::fmt;

use crate::keycodes::{keyname, Keycode};

use super::MacroId;

/// Why a menu/activation key combination cannot be used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyConflict {
    /// Another macro in the same menu already uses the activation key
    ActivationInUse {
        menu: Option<Keycode>,
        activation: Keycode,
    },
    /// A top-level activation key is already the key of a menu
    OccupiedByMenu { activation: Keycode },
    /// A menu key is already a top-level activation key
    MenuOccupiedByBinding { menu: Keycode },
}

impl KeyConflict {
    /// Numeric code: 1 for a taken activation key, 2 for a key claimed by a menu,
    /// 3 for a menu key claimed by a binding
    pub fn code(&self) -> u8 {
        match self {
            KeyConflict::ActivationInUse { .. } => 1,
            KeyConflict::OccupiedByMenu { .. } => 2,
            KeyConflict::MenuOccupiedByBinding { .. } => 3,
        }
    }
}

impl fmt::Display for KeyConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyConflict::ActivationInUse {
                menu: Some(menu),
                activation,
            } => write!(
                f,
                "Activation key {} is already in use by another macro in menu {}",
                activation, menu
            ),
            KeyConflict::ActivationInUse {
                menu: None,
                activation,
            } => write!(
                f,
                "Activation key {} is already in use by another macro",
                activation
            ),
            KeyConflict::OccupiedByMenu { activation } => write!(
                f,
                "Activation key {} is occupied by an existing menu",
                activation
            ),
            KeyConflict::MenuOccupiedByBinding { menu } => write!(
                f,
                "Menu key {} is already bound to a macro outside any menu",
                menu
            ),
        }
    }
}

impl std::error::Error for KeyConflict {}

/// Summary of a macro that cannot be saved yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncompleteMacro {
    pub menu: Option<Keycode>,
    pub activation: Option<Keycode>,
    pub text: String,
}

/// Errors from loading, editing or saving macros
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacrosError {
    Io(String),
    Parse(String),
    Serialize(String),
    /// An entry in the file does not match the macro schema
    InvalidEntry { name: String, message: String },
    /// A keycode field is outside the scancode range and not the `-1` sentinel
    InvalidKeycode {
        name: String,
        field: &'static str,
        value: i64,
    },
    Conflict { name: String, conflict: KeyConflict },
    UnknownMacro(MacroId),
    /// Some macros lack an activation key or text. Saving with `force`
    /// skips them.
    Incomplete(Vec<IncompleteMacro>),
}

impl MacrosError {
    /// Short heading for the incomplete-macro prompt
    pub fn title(&self) -> &'static str {
        match self {
            MacrosError::Incomplete(_) => "You have some incomplete macros!",
            _ => "Macro error",
        }
    }

    /// Detailed message; lists every incomplete macro
    pub fn body(&self) -> String {
        match self {
            MacrosError::Incomplete(macros) => {
                let mut body =
                    String::from("Do you want to continue without saving the following macros:\n");
                for m in macros {
                    body.push_str(&format!(
                        "Menu key: {}, Activation key: {}, Text: {}\n",
                        keyname(m.menu),
                        keyname(m.activation),
                        m.text
                    ));
                }
                body
            }
            other => other.to_string(),
        }
    }
}

impl fmt::Display for MacrosError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacrosError::Io(e) => write!(f, "IO error: {}", e),
            MacrosError::Parse(e) => write!(f, "Parse error: {}", e),
            MacrosError::Serialize(e) => write!(f, "Serialize error: {}", e),
            MacrosError::InvalidEntry { name, message } => {
                write!(f, "Invalid macro '{}': {}", name, message)
            }
            MacrosError::InvalidKeycode { name, field, value } => {
                write!(f, "Invalid {} {} in macro '{}'", field, value, name)
            }
            MacrosError::Conflict { name, conflict } => {
                write!(f, "Macro '{}': {}", name, conflict)
            }
            MacrosError::UnknownMacro(id) => write!(f, "No macro with id {}", id),
            MacrosError::Incomplete(macros) => write!(
                f,
                "{} incomplete macro(s); save with force to keep only the valid ones",
                macros.len()
            ),
        }
    }
}

impl std::error::Error for MacrosError {}

//! Core key type: a hardware scancode with a human-readable name

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::table::{KEY_NAMES, SHIFTED};

/// A hardware scancode as delivered by the system keyboard hook
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keycode(pub u16);

impl Keycode {
    /// Escape clears a menu binding while capturing keys
    pub const ESCAPE: Keycode = Keycode(1);
    pub const ENTER: Keycode = Keycode(28);
    pub const SHIFT: Keycode = Keycode(42);
    pub const SPACE: Keycode = Keycode(57);
    /// "T", the all-chat key in most games
    pub const DEFAULT_CHAT_OPENER: Keycode = Keycode(20);

    /// Display name for this code, if it is on the name table
    pub fn name(self) -> Option<&'static str> {
        KEY_NAMES
            .iter()
            .find(|(code, _, _)| *code == self.0)
            .map(|(_, name, _)| *name)
    }

    /// Whether this code has a known name. Key capture rejects unknown codes.
    #[inline]
    pub fn is_known(self) -> bool {
        self.name().is_some()
    }

    /// The key that types `ch` without Shift held
    ///
    /// Letters are matched case-insensitively; whitespace maps to
    /// Space, Tab and Enter.
    pub fn for_char(ch: char) -> Option<Keycode> {
        match ch {
            ' ' => return Some(Keycode::SPACE),
            '\t' => return Some(Keycode(15)),
            '\n' => return Some(Keycode::ENTER),
            _ => {}
        }

        let upper = ch.to_ascii_uppercase();
        KEY_NAMES.iter().find_map(|(code, name, _)| {
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c == upper => Some(Keycode(*code)),
                _ => None,
            }
        })
    }

    /// Parse a key the way key capture accepts it: only codes with a name
    /// in the key table
    pub fn parse_known(s: &str) -> Result<Keycode, KeyParseError> {
        let code: Keycode = s.parse()?;
        if !code.is_known() {
            return Err(KeyParseError::Unassigned(code.0));
        }
        Ok(code)
    }

    /// Every named key, in scancode order
    pub fn all_named() -> impl Iterator<Item = (Keycode, &'static str)> {
        KEY_NAMES.iter().map(|(code, name, _)| (Keycode(*code), *name))
    }
}

/// Sort/display helper for optional keys: no key renders as an empty string
pub fn keyname(code: Option<Keycode>) -> String {
    code.map(|c| c.to_string()).unwrap_or_default()
}

/// The unshifted character that shares a key with `ch`, if typing `ch`
/// needs Shift held
pub fn shifted_base(ch: char) -> Option<char> {
    if ch.is_ascii_uppercase() {
        return Some(ch.to_ascii_lowercase());
    }
    SHIFTED
        .iter()
        .find(|(shifted, _)| *shifted == ch)
        .map(|(_, base)| *base)
}

impl fmt::Display for Keycode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "#{}", self.0),
        }
    }
}

/// Parse a key from its name (`"num4"`, `"T"`, `"esc"`) or a raw
/// scancode (`"#71"`, `"71"`)
///
/// Names win over numbers, so `"1"` is the "1" key (scancode 2). Use
/// the `#` prefix to force a raw scancode.
impl FromStr for Keycode {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(KeyParseError::Empty);
        }

        let lower = trimmed.to_lowercase();
        let named = KEY_NAMES.iter().find(|(_, name, aliases)| {
            name.to_lowercase() == lower || aliases.contains(&lower.as_str())
        });
        if let Some((code, _, _)) = named {
            return Ok(Keycode(*code));
        }

        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        digits
            .parse::<u16>()
            .map(Keycode)
            .map_err(|_| KeyParseError::UnknownKey(trimmed.to_string()))
    }
}

/// Errors that can occur when parsing a key name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyParseError {
    Empty,
    UnknownKey(String),
    /// A raw scancode with no entry in the key table
    Unassigned(u16),
}

impl fmt::Display for KeyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyParseError::Empty => write!(f, "Empty key name"),
            KeyParseError::UnknownKey(k) => write!(f, "Unknown key: {}", k),
            KeyParseError::Unassigned(code) => write!(
                f,
                "Scancode {} is not a known key (see `quickchat keys`)",
                code
            ),
        }
    }
}

impl std::error::Error for KeyParseError {}

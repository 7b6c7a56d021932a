//! A single quick-chat macro: a key binding plus the text it types

use std::fmt;

use crate::keycodes::Keycode;
use crate::playback::{self, InjectError, KeyInjector, PlaybackOptions};

use super::file::{key_from_raw, key_to_raw, MacroEntry};
use super::MacrosError;

/// Registry-assigned identity of a macro
///
/// Stays stable while the macro's keys change, so editors can refer to a
/// macro that is not (yet) reachable through the key index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacroId(pub(super) u32);

impl fmt::Display for MacroId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Text to type when the activation key is pressed, optionally inside a menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macro {
    pub(super) id: MacroId,
    pub(super) name: String,
    pub(super) menu_key: Option<Keycode>,
    pub(super) activation_key: Option<Keycode>,
    pub(super) chat_opener_key: Option<Keycode>,
    pub(super) text: String,
    pub(super) enabled: bool,
}

impl Macro {
    /// Create a detached macro. The registry assigns its id on insert.
    pub fn new(
        name: impl Into<String>,
        menu_key: Option<Keycode>,
        activation_key: Option<Keycode>,
        chat_opener_key: Option<Keycode>,
        text: impl Into<String>,
    ) -> Self {
        let mut m = Self {
            id: MacroId::default(),
            name: name.into(),
            menu_key,
            activation_key,
            chat_opener_key,
            text: text.into(),
            enabled: false,
        };
        m.enabled = m.is_valid();
        m
    }

    /// Build a macro from a file entry, mapping `-1` keycodes to "none"
    pub fn from_entry(name: &str, entry: &MacroEntry) -> Result<Self, MacrosError> {
        tracing::info!("Loading macro: {} {:?}", name, entry);
        let menu_key = match entry.menu_keycode {
            Some(raw) => key_from_raw(name, "menu_keycode", raw)?,
            None => None,
        };
        let activation_key = key_from_raw(name, "activation_keycode", entry.activation_keycode)?;
        let chat_opener_key = match entry.chat_opener_keycode {
            Some(raw) => key_from_raw(name, "chat_opener_keycode", raw)?,
            None => Some(Keycode::DEFAULT_CHAT_OPENER),
        };

        Ok(Self::new(
            name,
            menu_key,
            activation_key,
            chat_opener_key,
            entry.text.clone(),
        ))
    }

    /// Serialisable form, or `None` while the macro is incomplete
    pub fn to_entry(&self) -> Option<MacroEntry> {
        let activation = self.activation_key?;
        if !self.is_valid() {
            return None;
        }

        // A missing chat opener reads back as "T", so "none" is written as -1
        let chat_opener_keycode = match self.chat_opener_key {
            Some(Keycode::DEFAULT_CHAT_OPENER) => None,
            Some(key) => Some(key_to_raw(key)),
            None => Some(-1),
        };

        Some(MacroEntry {
            menu_keycode: self.menu_key.map(key_to_raw),
            activation_keycode: key_to_raw(activation),
            chat_opener_keycode,
            text: self.text.clone(),
        })
    }

    pub fn id(&self) -> MacroId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn menu_key(&self) -> Option<Keycode> {
        self.menu_key
    }

    pub fn activation_key(&self) -> Option<Keycode> {
        self.activation_key
    }

    pub fn chat_opener_key(&self) -> Option<Keycode> {
        self.chat_opener_key
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Complete enough to save and to play
    pub fn is_valid(&self) -> bool {
        self.activation_key.is_some() && !self.text.is_empty()
    }

    pub fn refresh_enabled(&mut self) {
        self.enabled = self.is_valid();
        tracing::info!("Macro: {} is enabled: {}", self.name, self.enabled);
    }

    /// Type this macro's text. Disabled macros do nothing.
    pub fn play<I: KeyInjector + ?Sized>(
        &self,
        injector: &mut I,
        options: &PlaybackOptions,
    ) -> Result<(), InjectError> {
        if !self.enabled {
            return Ok(());
        }
        tracing::info!("Playing macro: {}", self.name);
        playback::type_text(injector, self.chat_opener_key, &self.text, options)
    }
}

impl fmt::Display for Macro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Macro: {}", self.name)
    }
}

//! YAML macro files
//!
//! A macro file maps macro names to entries:
//!
//! ```yaml
//! Go left!:
//!   menu_keycode: 71
//!   activation_keycode: 75
//!   text: Go left!
//! ```
//!
//! `activation_keycode` and `text` are required. A missing
//! `chat_opener_keycode` means "T"; `-1` in any keycode field means "none".

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};

use crate::keycodes::Keycode;

use super::MacrosError;

/// A single macro as stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MacroEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_keycode: Option<i64>,
    pub activation_keycode: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_opener_keycode: Option<i64>,
    #[serde(deserialize_with = "scalar_text")]
    pub text: String,
}

/// Any YAML scalar reads as text, so `text: 404` is the string "404"
fn scalar_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(String::new()),
        other => scalar_to_string(other).map_err(|kind| {
            serde::de::Error::custom(format!("text must be a plain value, found {}", kind))
        }),
    }
}

/// The string form of a string, number or boolean; otherwise the value's kind
fn scalar_to_string(value: Value) -> Result<String, &'static str> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(value_kind(&other)),
    }
}

/// Convert a stored keycode, where `-1` is the "none" sentinel
pub(super) fn key_from_raw(
    name: &str,
    field: &'static str,
    raw: i64,
) -> Result<Option<Keycode>, MacrosError> {
    if raw == -1 {
        return Ok(None);
    }
    u16::try_from(raw)
        .map(|code| Some(Keycode(code)))
        .map_err(|_| MacrosError::InvalidKeycode {
            name: name.to_string(),
            field,
            value: raw,
        })
}

pub(super) fn key_to_raw(key: Keycode) -> i64 {
    i64::from(key.0)
}

/// Read a macro file from disk
pub fn load_macro_file(path: &Path) -> Result<Vec<(String, MacroEntry)>, MacrosError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| MacrosError::Io(format!("{}: {}", path.display(), e)))?;
    parse_macro_yaml(&content)
}

/// Parse macro YAML into `(name, entry)` pairs, in file order
pub fn parse_macro_yaml(yaml: &str) -> Result<Vec<(String, MacroEntry)>, MacrosError> {
    if yaml.trim().is_empty() {
        return Ok(Vec::new());
    }

    let root: Value = serde_yaml::from_str(yaml).map_err(|e| MacrosError::Parse(e.to_string()))?;
    let mapping = match root {
        Value::Mapping(mapping) => mapping,
        Value::Null => return Ok(Vec::new()),
        other => {
            return Err(MacrosError::Parse(format!(
                "expected a mapping of macro names, found {}",
                value_kind(&other)
            )))
        }
    };

    let mut entries = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let name = scalar_to_string(key).map_err(|kind| {
            MacrosError::Parse(format!("macro names must be strings, found {}", kind))
        })?;
        let entry: MacroEntry =
            serde_yaml::from_value(value).map_err(|e| MacrosError::InvalidEntry {
                name: name.clone(),
                message: e.to_string(),
            })?;
        entries.push((name, entry));
    }

    Ok(entries)
}

/// Serialise `(name, entry)` pairs, preserving order
pub fn dump_macro_yaml(entries: &[(String, MacroEntry)]) -> Result<String, MacrosError> {
    let mut mapping = Mapping::new();
    for (name, entry) in entries {
        let value =
            serde_yaml::to_value(entry).map_err(|e| MacrosError::Serialize(e.to_string()))?;
        mapping.insert(Value::String(name.clone()), value);
    }
    serde_yaml::to_string(&mapping).map_err(|e| MacrosError::Serialize(e.to_string()))
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

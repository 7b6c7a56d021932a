//! Macro registry: two-level key index with conflict checks

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::keycodes::{keyname, Keycode};

use super::chat_macro::{Macro, MacroId};
use super::error::{IncompleteMacro, KeyConflict, MacrosError};
use super::file::{dump_macro_yaml, load_macro_file, parse_macro_yaml};

/// Text given to macros created without any
pub const DEFAULT_MACRO_TEXT: &str = "What a save!";

/// What a key edit did besides setting the requested key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyChange {
    Applied,
    /// The new menu key conflicted with the activation key, which was cleared
    ClearedActivation,
    /// The new activation key conflicted inside the menu, so the macro
    /// moved out of the menu
    ClearedMenu,
}

/// All macros, indexed by menu key then activation key
///
/// `None` as the menu key is the top level: those macros fire directly.
/// Macros without an activation key are kept but not indexed, so several
/// new macros can be edited side by side.
#[derive(Debug, Clone, Default)]
pub struct Macros {
    macros: HashMap<MacroId, Macro>,
    menus: HashMap<Option<Keycode>, HashMap<Keycode, MacroId>>,
    next_id: u32,
    /// Canonical YAML at the last load or save
    last_yaml: Option<String>,
}

impl Macros {
    /// Create an empty registry
    pub fn new() -> Self {
        let mut macros = Self::default();
        macros.mark_saved();
        macros
    }

    /// Load macros from a YAML file
    pub fn load(path: &Path) -> Result<Self, MacrosError> {
        let entries = load_macro_file(path)?;
        tracing::info!("Loading {} macros from {}", entries.len(), path.display());
        Self::from_entries(entries)
    }

    /// Load macros from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, MacrosError> {
        Self::from_entries(parse_macro_yaml(yaml)?)
    }

    fn from_entries(entries: Vec<(String, super::MacroEntry)>) -> Result<Self, MacrosError> {
        let mut macros = Self::default();
        for (name, entry) in entries {
            let m = Macro::from_entry(&name, &entry)?;
            macros
                .insert(m)
                .map_err(|conflict| MacrosError::Conflict { name, conflict })?;
        }
        macros.mark_saved();
        Ok(macros)
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    pub fn get(&self, id: MacroId) -> Option<&Macro> {
        self.macros.get(&id)
    }

    /// The macro bound to `activation` inside `menu` (`None` for top level)
    pub fn get_macro(&self, menu: Option<Keycode>, activation: Keycode) -> Option<&Macro> {
        self.menus
            .get(&menu)
            .and_then(|m| m.get(&activation))
            .and_then(|id| self.macros.get(id))
    }

    /// The activation index of one menu
    pub fn get_menu(&self, menu: Option<Keycode>) -> Option<&HashMap<Keycode, MacroId>> {
        self.menus.get(&menu)
    }

    /// Whether pressing `key` at the top level opens a menu
    pub fn is_menu_key(&self, key: Keycode) -> bool {
        self.menus.contains_key(&Some(key))
    }

    /// Keys that open a menu, sorted by name
    pub fn menu_keys(&self) -> Vec<Keycode> {
        let mut keys: Vec<Keycode> = self.menus.keys().filter_map(|k| *k).collect();
        keys.sort_by_key(|k| (k.to_string(), *k));
        keys
    }

    /// Every key the dispatcher has to watch: menu keys and activation keys
    pub fn unique_keycodes(&self) -> HashSet<Keycode> {
        let mut codes = HashSet::new();
        for (menu, entries) in &self.menus {
            codes.extend(*menu);
            codes.extend(entries.keys().copied());
        }
        codes
    }

    /// Check whether `menu` + `activation` can be bound without clashing
    ///
    /// `ignore` skips the macro being edited, so re-checking its own keys
    /// does not report a conflict with itself.
    pub fn verify_key_combo(
        &self,
        menu: Option<Keycode>,
        activation: Option<Keycode>,
        ignore: Option<MacroId>,
    ) -> Result<(), KeyConflict> {
        let is_other = |id: &MacroId| Some(*id) != ignore;

        if let Some(activation) = activation {
            let taken = self
                .menus
                .get(&menu)
                .and_then(|m| m.get(&activation))
                .is_some_and(is_other);
            if taken {
                return Err(KeyConflict::ActivationInUse { menu, activation });
            }

            if menu.is_none() && self.menu_has_other(activation, ignore) {
                return Err(KeyConflict::OccupiedByMenu { activation });
            }
        }

        if let Some(menu) = menu {
            let bound = self
                .menus
                .get(&None)
                .and_then(|m| m.get(&menu))
                .is_some_and(is_other);
            if bound {
                return Err(KeyConflict::MenuOccupiedByBinding { menu });
            }
        }

        Ok(())
    }

    fn menu_has_other(&self, menu: Keycode, ignore: Option<MacroId>) -> bool {
        self.menus
            .get(&Some(menu))
            .is_some_and(|entries| entries.values().any(|id| Some(*id) != ignore))
    }

    /// Add a macro after checking its keys. Returns its new id.
    pub fn insert(&mut self, mut m: Macro) -> Result<MacroId, KeyConflict> {
        self.verify_key_combo(m.menu_key, m.activation_key, None)?;

        let id = MacroId(self.next_id);
        self.next_id += 1;
        m.id = id;

        tracing::info!(
            "Inserting macro {} into menu {} with activation key {}",
            m.name,
            keyname(m.menu_key),
            keyname(m.activation_key)
        );
        self.macros.insert(id, m);
        self.index(id);
        Ok(id)
    }

    /// Create a macro from parts
    ///
    /// `None` text uses [`DEFAULT_MACRO_TEXT`]; the macro is named after its text.
    pub fn add_macro(
        &mut self,
        menu: Option<Keycode>,
        activation: Option<Keycode>,
        chat_opener: Option<Keycode>,
        text: Option<&str>,
    ) -> Result<MacroId, KeyConflict> {
        let text = text.unwrap_or(DEFAULT_MACRO_TEXT);
        tracing::info!(
            "Adding macro with menu key {}, activation key {}, chat opener key {}, and text {}",
            keyname(menu),
            keyname(activation),
            keyname(chat_opener),
            text
        );
        self.insert(Macro::new(text, menu, activation, chat_opener, text))
    }

    pub fn remove_macro(&mut self, id: MacroId) -> Option<Macro> {
        self.unindex(id);
        let removed = self.macros.remove(&id);
        if let Some(m) = &removed {
            tracing::info!("Removed macro {}", m.name);
        }
        removed
    }

    /// Move a macro into a menu (`None` or Escape: top level)
    ///
    /// If the macro's activation key clashes in the new menu, the
    /// activation key is cleared and the macro becomes incomplete. A menu
    /// key that is already a top-level binding is refused.
    pub fn set_menu_key(
        &mut self,
        id: MacroId,
        menu: Option<Keycode>,
    ) -> Result<KeyChange, MacrosError> {
        let menu = menu.filter(|k| *k != Keycode::ESCAPE);
        let activation = self.require(id)?.activation_key;

        let mut change = KeyChange::Applied;
        let mut new_activation = activation;
        if let Err(conflict) = self.verify_key_combo(menu, activation, Some(id)) {
            match conflict {
                KeyConflict::MenuOccupiedByBinding { .. } => {
                    return Err(self.conflict_error(id, conflict));
                }
                _ => {
                    tracing::info!("{}; clearing activation key", conflict);
                    new_activation = None;
                    change = KeyChange::ClearedActivation;
                }
            }
        }
        if change == KeyChange::ClearedActivation {
            self.verify_key_combo(menu, None, Some(id))
                .map_err(|c| self.conflict_error(id, c))?;
        }

        self.rebind(id, menu, new_activation);
        Ok(change)
    }

    /// Bind a macro's activation key
    ///
    /// If the key is taken inside the macro's menu, the macro moves to the
    /// top level. A key that is still taken there is refused.
    pub fn set_activation_key(
        &mut self,
        id: MacroId,
        activation: Keycode,
    ) -> Result<KeyChange, MacrosError> {
        let menu = self.require(id)?.menu_key;

        if self.verify_key_combo(menu, Some(activation), Some(id)).is_ok() {
            self.rebind(id, menu, Some(activation));
            return Ok(KeyChange::Applied);
        }

        self.verify_key_combo(None, Some(activation), Some(id))
            .map_err(|c| self.conflict_error(id, c))?;
        tracing::info!(
            "Activation key {} is taken in menu {}; moving macro to the top level",
            activation,
            keyname(menu)
        );
        self.rebind(id, None, Some(activation));
        Ok(KeyChange::ClearedMenu)
    }

    /// Set the key that opens chat before typing (`None`: type straight away)
    pub fn set_chat_opener_key(
        &mut self,
        id: MacroId,
        chat_opener: Option<Keycode>,
    ) -> Result<(), MacrosError> {
        self.require_mut(id)?.chat_opener_key = chat_opener;
        Ok(())
    }

    /// Change a macro's text; the macro is renamed after it
    pub fn set_text(&mut self, id: MacroId, text: &str) -> Result<(), MacrosError> {
        let m = self.require_mut(id)?;
        m.text = text.to_string();
        m.name = text.to_string();
        Ok(())
    }

    /// All macros, sorted by menu key name then activation key name.
    /// Incomplete macros come last.
    pub fn get_all(&self) -> Vec<&Macro> {
        let mut all: Vec<&Macro> = self.macros.values().collect();
        all.sort_by_key(|m| sort_key(m));
        all
    }

    /// The macros of one menu, sorted by activation key name
    pub fn get_menu_entries(&self, menu: Option<Keycode>) -> Vec<&Macro> {
        let mut entries: Vec<&Macro> = self
            .menus
            .get(&menu)
            .map(|m| m.values().filter_map(|id| self.macros.get(id)).collect())
            .unwrap_or_default();
        entries.sort_by_key(|m| sort_key(m));
        entries
    }

    /// Refresh the enabled flag of every macro
    pub fn arm_macros(&mut self) {
        for m in self.macros.values_mut() {
            m.refresh_enabled();
        }
    }

    /// Serialise to YAML in [`get_all`](Self::get_all) order
    ///
    /// Incomplete macros are an error unless `force`, which skips them.
    pub fn to_yaml(&self, force: bool) -> Result<String, MacrosError> {
        let mut entries: Vec<(String, super::MacroEntry)> = Vec::new();
        let mut incomplete = Vec::new();

        for m in self.get_all() {
            match m.to_entry() {
                Some(entry) => {
                    let mut name = m.name.clone();
                    while entries.iter().any(|(n, _)| *n == name) {
                        name = format!("{} ({})", name, entry.activation_keycode);
                    }
                    entries.push((name, entry));
                }
                None if !force => incomplete.push(IncompleteMacro {
                    menu: m.menu_key,
                    activation: m.activation_key,
                    text: m.text.clone(),
                }),
                None => {
                    tracing::debug!("Skipping incomplete macro {}", m.name);
                }
            }
        }

        if !incomplete.is_empty() {
            return Err(MacrosError::Incomplete(incomplete));
        }

        dump_macro_yaml(&entries)
    }

    /// Whether the macros differ from the last load or save.
    /// Anything that cannot be serialised counts as changed.
    pub fn has_changed(&self) -> bool {
        match (self.to_yaml(false), &self.last_yaml) {
            (Ok(current), Some(last)) => current != *last,
            _ => true,
        }
    }

    /// Take a new change-detection snapshot
    pub fn mark_saved(&mut self) {
        self.last_yaml = self.to_yaml(false).ok();
    }

    /// Write the macros to `path`. See [`to_yaml`](Self::to_yaml) for `force`.
    pub fn save(&mut self, path: &Path, force: bool) -> Result<(), MacrosError> {
        let yaml = self.to_yaml(force)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                MacrosError::Io(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        std::fs::write(path, yaml)
            .map_err(|e| MacrosError::Io(format!("Failed to write {}: {}", path.display(), e)))?;

        tracing::info!("Saved macros to {}", path.display());
        self.mark_saved();
        Ok(())
    }

    fn require(&self, id: MacroId) -> Result<&Macro, MacrosError> {
        self.macros.get(&id).ok_or(MacrosError::UnknownMacro(id))
    }

    fn require_mut(&mut self, id: MacroId) -> Result<&mut Macro, MacrosError> {
        self.macros.get_mut(&id).ok_or(MacrosError::UnknownMacro(id))
    }

    fn conflict_error(&self, id: MacroId, conflict: KeyConflict) -> MacrosError {
        let name = self
            .macros
            .get(&id)
            .map(|m| m.name.clone())
            .unwrap_or_default();
        MacrosError::Conflict { name, conflict }
    }

    fn rebind(&mut self, id: MacroId, menu: Option<Keycode>, activation: Option<Keycode>) {
        self.unindex(id);
        if let Some(m) = self.macros.get_mut(&id) {
            m.menu_key = menu;
            m.activation_key = activation;
        }
        self.index(id);
    }

    fn index(&mut self, id: MacroId) {
        let Some(m) = self.macros.get(&id) else {
            return;
        };
        if let Some(activation) = m.activation_key {
            self.menus
                .entry(m.menu_key)
                .or_default()
                .insert(activation, id);
        }
    }

    fn unindex(&mut self, id: MacroId) {
        let Some(m) = self.macros.get(&id) else {
            return;
        };
        let (menu, activation) = (m.menu_key, m.activation_key);
        let Some(activation) = activation else {
            return;
        };
        if let Some(entries) = self.menus.get_mut(&menu) {
            if entries.get(&activation) == Some(&id) {
                entries.remove(&activation);
            }
            if entries.is_empty() {
                self.menus.remove(&menu);
            }
        }
    }
}

fn sort_key(m: &Macro) -> (bool, String, String, MacroId) {
    (
        !m.is_valid(),
        keyname(m.menu_key),
        keyname(m.activation_key),
        m.id,
    )
}

//! Registry tests: indexing, conflicts, key edits and serialisation

use super::*;
use crate::keycodes::Keycode;

const NUM7: Keycode = Keycode(71);
const NUM9: Keycode = Keycode(73);
const NUM4: Keycode = Keycode(75);
const NUM5: Keycode = Keycode(76);
const NUM2: Keycode = Keycode(80);
const T: Keycode = Keycode::DEFAULT_CHAT_OPENER;

fn add(macros: &mut Macros, menu: Option<Keycode>, activation: Keycode, text: &str) -> MacroId {
    macros
        .add_macro(menu, Some(activation), Some(T), Some(text))
        .expect("macro should insert")
}

#[test]
fn test_embedded_defaults_load() {
    let macros = Macros::from_yaml(DEFAULT_MACROS_YAML)
        .expect("Embedded quickchats.yml should parse successfully");

    assert_eq!(macros.len(), 8);
    assert!(macros.is_menu_key(NUM7));
    assert!(macros.is_menu_key(NUM9));
    assert_eq!(macros.get_macro(Some(NUM7), NUM4).unwrap().text(), "I got it!");
    assert_eq!(macros.get_macro(None, NUM2).unwrap().text(), "What a save!");
    assert!(!macros.has_changed());
}

#[test]
fn test_get_macro_by_menu_and_activation() {
    let mut macros = Macros::new();
    add(&mut macros, Some(NUM7), NUM4, "left");
    add(&mut macros, None, NUM4, "top");

    assert_eq!(macros.get_macro(Some(NUM7), NUM4).unwrap().text(), "left");
    assert_eq!(macros.get_macro(None, NUM4).unwrap().text(), "top");
    assert!(macros.get_macro(Some(NUM9), NUM4).is_none());
}

#[test]
fn test_duplicate_activation_in_menu_rejected() {
    let mut macros = Macros::new();
    add(&mut macros, Some(NUM7), NUM4, "first");

    let err = macros
        .add_macro(Some(NUM7), Some(NUM4), Some(T), Some("second"))
        .unwrap_err();
    assert_eq!(
        err,
        KeyConflict::ActivationInUse {
            menu: Some(NUM7),
            activation: NUM4
        }
    );
    assert_eq!(err.code(), 1);

    // Same activation in another menu is fine
    add(&mut macros, Some(NUM9), NUM4, "other menu");
}

#[test]
fn test_top_level_activation_cannot_be_a_menu_key() {
    let mut macros = Macros::new();
    add(&mut macros, Some(NUM7), NUM4, "in menu");

    let err = macros
        .add_macro(None, Some(NUM7), Some(T), Some("clash"))
        .unwrap_err();
    assert_eq!(err, KeyConflict::OccupiedByMenu { activation: NUM7 });
    assert_eq!(err.code(), 2);
}

#[test]
fn test_menu_key_cannot_be_a_top_level_activation() {
    let mut macros = Macros::new();
    add(&mut macros, None, NUM7, "top");

    let err = macros
        .add_macro(Some(NUM7), Some(NUM4), Some(T), Some("clash"))
        .unwrap_err();
    assert_eq!(err, KeyConflict::MenuOccupiedByBinding { menu: NUM7 });
}

#[test]
fn test_conflicting_file_fails_to_load() {
    let yaml = r#"
a:
  activation_keycode: 75
  text: a
b:
  activation_keycode: 75
  text: b
"#;
    let err = Macros::from_yaml(yaml).unwrap_err();
    assert!(matches!(err, MacrosError::Conflict { ref name, .. } if name == "b"));
}

#[test]
fn test_incomplete_macros_coexist() {
    let mut macros = Macros::new();
    let a = macros.add_macro(None, None, Some(T), None).unwrap();
    let b = macros.add_macro(None, None, Some(T), None).unwrap();

    assert_ne!(a, b);
    assert_eq!(macros.len(), 2);
    assert_eq!(macros.get(a).unwrap().text(), DEFAULT_MACRO_TEXT);
    assert!(macros.unique_keycodes().is_empty());
}

#[test]
fn test_remove_prunes_empty_menu() {
    let mut macros = Macros::new();
    let id = add(&mut macros, Some(NUM7), NUM4, "only");
    assert!(macros.is_menu_key(NUM7));

    let removed = macros.remove_macro(id).unwrap();
    assert_eq!(removed.text(), "only");
    assert!(!macros.is_menu_key(NUM7));
    assert!(macros.get_menu(Some(NUM7)).is_none());
    assert!(macros.remove_macro(id).is_none());
}

#[test]
fn test_unique_keycodes() {
    let mut macros = Macros::new();
    add(&mut macros, Some(NUM7), NUM4, "a");
    add(&mut macros, Some(NUM7), NUM5, "b");
    add(&mut macros, None, NUM2, "c");

    let codes = macros.unique_keycodes();
    assert_eq!(codes.len(), 4);
    for code in [NUM7, NUM4, NUM5, NUM2] {
        assert!(codes.contains(&code));
    }
}

#[test]
fn test_set_menu_key_moves_macro() {
    let mut macros = Macros::new();
    let id = add(&mut macros, None, NUM4, "move me");

    let change = macros.set_menu_key(id, Some(NUM7)).unwrap();
    assert_eq!(change, KeyChange::Applied);
    assert!(macros.get_macro(None, NUM4).is_none());
    assert_eq!(macros.get_macro(Some(NUM7), NUM4).unwrap().id(), id);
}

#[test]
fn test_set_menu_key_escape_clears_menu() {
    let mut macros = Macros::new();
    let id = add(&mut macros, Some(NUM7), NUM4, "x");

    macros.set_menu_key(id, Some(Keycode::ESCAPE)).unwrap();
    assert_eq!(macros.get(id).unwrap().menu_key(), None);
    assert!(macros.get_macro(None, NUM4).is_some());
}

#[test]
fn test_set_menu_key_conflict_clears_activation() {
    let mut macros = Macros::new();
    add(&mut macros, Some(NUM7), NUM4, "resident");
    let id = add(&mut macros, Some(NUM9), NUM4, "newcomer");

    let change = macros.set_menu_key(id, Some(NUM7)).unwrap();
    assert_eq!(change, KeyChange::ClearedActivation);

    let m = macros.get(id).unwrap();
    assert_eq!(m.menu_key(), Some(NUM7));
    assert_eq!(m.activation_key(), None);
    assert!(!m.is_valid());
    assert_eq!(macros.get_macro(Some(NUM7), NUM4).unwrap().text(), "resident");
}

#[test]
fn test_set_menu_key_refuses_top_level_binding() {
    let mut macros = Macros::new();
    add(&mut macros, None, NUM2, "top");
    let id = add(&mut macros, None, NUM4, "x");

    let err = macros.set_menu_key(id, Some(NUM2)).unwrap_err();
    assert!(matches!(
        err,
        MacrosError::Conflict {
            conflict: KeyConflict::MenuOccupiedByBinding { .. },
            ..
        }
    ));
    assert_eq!(macros.get(id).unwrap().menu_key(), None);
}

#[test]
fn test_set_activation_key() {
    let mut macros = Macros::new();
    let id = macros.add_macro(Some(NUM7), None, Some(T), Some("x")).unwrap();
    assert!(!macros.is_menu_key(NUM7));

    let change = macros.set_activation_key(id, NUM4).unwrap();
    assert_eq!(change, KeyChange::Applied);
    assert!(macros.is_menu_key(NUM7));
    assert_eq!(macros.get_macro(Some(NUM7), NUM4).unwrap().id(), id);
}

#[test]
fn test_set_activation_key_conflict_moves_to_top_level() {
    let mut macros = Macros::new();
    add(&mut macros, Some(NUM7), NUM4, "resident");
    let id = add(&mut macros, Some(NUM7), NUM5, "mover");

    let change = macros.set_activation_key(id, NUM4).unwrap();
    assert_eq!(change, KeyChange::ClearedMenu);
    assert_eq!(macros.get_macro(None, NUM4).unwrap().id(), id);
}

#[test]
fn test_set_activation_key_refused_when_taken_everywhere() {
    let mut macros = Macros::new();
    add(&mut macros, Some(NUM7), NUM4, "in menu");
    add(&mut macros, None, NUM4, "top");
    let id = add(&mut macros, Some(NUM7), NUM5, "stuck");

    assert!(macros.set_activation_key(id, NUM4).is_err());
    let m = macros.get(id).unwrap();
    assert_eq!(m.menu_key(), Some(NUM7));
    assert_eq!(m.activation_key(), Some(NUM5));
}

#[test]
fn test_rebinding_own_key_is_not_a_conflict() {
    let mut macros = Macros::new();
    let id = add(&mut macros, Some(NUM7), NUM4, "x");
    assert_eq!(macros.set_activation_key(id, NUM4).unwrap(), KeyChange::Applied);
}

#[test]
fn test_set_text_renames() {
    let mut macros = Macros::new();
    let id = add(&mut macros, None, NUM4, "old");
    macros.set_text(id, "new text").unwrap();

    let m = macros.get(id).unwrap();
    assert_eq!(m.text(), "new text");
    assert_eq!(m.name(), "new text");
}

#[test]
fn test_unknown_id() {
    let mut macros = Macros::new();
    let id = add(&mut macros, None, NUM4, "x");
    macros.remove_macro(id);
    assert!(matches!(
        macros.set_text(id, "y"),
        Err(MacrosError::UnknownMacro(_))
    ));
}

#[test]
fn test_get_all_sorted_by_key_names() {
    let mut macros = Macros::new();
    add(&mut macros, Some(NUM9), NUM5, "d");
    add(&mut macros, Some(NUM7), NUM5, "b");
    add(&mut macros, None, NUM2, "a");
    add(&mut macros, Some(NUM7), NUM4, "c");
    macros.add_macro(None, None, Some(T), Some("incomplete")).unwrap();

    let texts: Vec<&str> = macros.get_all().iter().map(|m| m.text()).collect();
    assert_eq!(texts, vec!["a", "c", "b", "d", "incomplete"]);

    let menu: Vec<&str> = macros
        .get_menu_entries(Some(NUM7))
        .iter()
        .map(|m| m.text())
        .collect();
    assert_eq!(menu, vec!["c", "b"]);
}

#[test]
fn test_to_yaml_refuses_incomplete_unless_forced() {
    let mut macros = Macros::new();
    add(&mut macros, None, NUM4, "good");
    macros.add_macro(Some(NUM7), None, Some(T), Some("no key")).unwrap();

    let err = macros.to_yaml(false).unwrap_err();
    let MacrosError::Incomplete(ref list) = err else {
        panic!("expected Incomplete, got {:?}", err);
    };
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].menu, Some(NUM7));
    assert!(err.body().contains("Menu key: Num7, Activation key: , Text: no key"));
    assert_eq!(err.title(), "You have some incomplete macros!");

    let yaml = macros.to_yaml(true).unwrap();
    assert!(yaml.contains("good"));
    assert!(!yaml.contains("no key"));
}

#[test]
fn test_to_yaml_disambiguates_names() {
    let mut macros = Macros::new();
    add(&mut macros, Some(NUM7), NUM4, "gg");
    add(&mut macros, Some(NUM9), NUM5, "gg");

    let yaml = macros.to_yaml(false).unwrap();
    let reloaded = Macros::from_yaml(&yaml).unwrap();
    assert_eq!(reloaded.len(), 2);
    assert!(yaml.contains("gg (76)"));
}

#[test]
fn test_yaml_round_trip_keeps_bindings() {
    let loaded = Macros::from_yaml(DEFAULT_MACROS_YAML).unwrap();
    let reloaded = Macros::from_yaml(&loaded.to_yaml(false).unwrap()).unwrap();

    for m in loaded.get_all() {
        let other = reloaded
            .get_macro(m.menu_key(), m.activation_key().unwrap())
            .expect("binding should survive a round trip");
        assert_eq!(other.text(), m.text());
        assert_eq!(other.chat_opener_key(), m.chat_opener_key());
    }
}

#[test]
fn test_has_changed_tracks_edits() {
    let mut macros = Macros::from_yaml(DEFAULT_MACROS_YAML).unwrap();
    assert!(!macros.has_changed());

    let id = add(&mut macros, None, Keycode(59), "F1 macro");
    assert!(macros.has_changed());

    macros.mark_saved();
    assert!(!macros.has_changed());

    macros.set_text(id, "").unwrap();
    // Incomplete macros cannot be serialised, which counts as a change
    assert!(macros.has_changed());
}

#[test]
fn test_arm_macros_refreshes_enabled() {
    let mut macros = Macros::new();
    let id = add(&mut macros, None, NUM4, "x");
    macros.set_text(id, "").unwrap();
    assert!(macros.get(id).unwrap().is_enabled());

    macros.arm_macros();
    assert!(!macros.get(id).unwrap().is_enabled());
}

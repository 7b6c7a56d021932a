//! Overlay tests: scripted key events through the dispatcher and playback

mod common;

use std::time::Duration;

use common::*;
use quickchat::dispatch::{self, DispatchAction, Dispatcher, KeyEvent};
use quickchat::hook::{parse_script, ScriptStep};
use quickchat::macros::{Macros, DEFAULT_MACROS_YAML};
use quickchat::playback::{Injected, Key, PlaybackOptions, RecordingInjector};
use quickchat::Keycode;

fn starter_dispatcher() -> Dispatcher {
    let macros = Macros::from_yaml(DEFAULT_MACROS_YAML).unwrap();
    Dispatcher::new(macros, dispatch::DEFAULT_MENU_CLOSE_DELAY)
}

fn replay(script: &str) -> (Vec<DispatchAction>, RecordingInjector) {
    let mut dispatcher = starter_dispatcher();
    let steps = parse_script(script).unwrap();
    let mut injector = RecordingInjector::new();
    let mut actions = Vec::new();
    dispatch::simulate(
        &mut dispatcher,
        &steps,
        &mut injector,
        &PlaybackOptions::default(),
        |action, _| actions.push(action.clone()),
    );
    (actions, injector)
}

fn typed(injector: &RecordingInjector) -> String {
    injector
        .keystrokes()
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn test_menu_macro_types_text() {
    let (actions, injector) = replay("tap num7\ntap num5\n");

    assert!(matches!(actions[0], DispatchAction::OpenMenu(_)));
    assert_eq!(actions[1], DispatchAction::CloseMenu(NUM7));
    assert!(matches!(actions[2], DispatchAction::Play(_)));
    assert_eq!(
        typed(&injector),
        "+T -T +Shift +C -C -Shift +E -E +N -N +T -T +E -E +R -R +I -I +N -N +G -G \
         +Shift +1 -1 -Shift +Enter -Enter"
    );
}

#[test]
fn test_menu_view_lists_entries() {
    let (actions, _) = replay("tap num9\n");
    let DispatchAction::OpenMenu(view) = &actions[0] else {
        panic!("expected menu, got {:?}", actions);
    };
    assert_eq!(view.menu, NUM9);
    assert_eq!(view.to_string(), "Num4: Thanks!\nNum5: Sorry!\nNum6: Need boost!\n");
}

#[test]
fn test_custom_chat_opener_is_tapped_first() {
    let (_, injector) = replay("tap num9\ntap num6\n");
    let keys = injector.keystrokes();
    assert_eq!(keys[0], Injected::Press(Key::Code(Keycode(21))));
    assert_eq!(keys[1], Injected::Release(Key::Code(Keycode(21))));
}

#[test]
fn test_chat_open_delay_follows_opener() {
    let (_, injector) = replay("tap num2\n");
    assert_eq!(
        injector.events()[2],
        Injected::Pause(PlaybackOptions::default().chat_open_delay)
    );
}

#[test]
fn test_menu_expires_before_activation() {
    let (actions, injector) = replay("tap num7\nwait 2500\ntap num5\n");
    assert_eq!(actions.len(), 2);
    assert_eq!(actions[1], DispatchAction::CloseMenu(NUM7));
    assert!(injector.events().is_empty());
}

#[test]
fn test_activation_within_delay_still_plays() {
    let (actions, _) = replay("tap num7\nwait 1500\ntap num4\n");
    assert!(matches!(actions.last(), Some(DispatchAction::Play(_))));
}

#[test]
fn test_held_menu_key_opens_once() {
    let (actions, _) = replay("down num7\ndown num7\ndown num7\nup num7\n");
    assert_eq!(actions.len(), 1);
}

#[test]
fn test_unrelated_keys_do_nothing() {
    let (actions, injector) = replay("tap a\ntap space\ntap num4\n");
    assert!(actions.is_empty());
    assert!(injector.events().is_empty());
}

#[test]
fn test_run_stops_when_events_end() {
    let mut dispatcher = starter_dispatcher();
    let (tx, rx) = std::sync::mpsc::channel();
    tx.send(KeyEvent::down(NUM2)).unwrap();
    tx.send(KeyEvent::up(NUM2)).unwrap();
    drop(tx);

    let mut injector = RecordingInjector::new();
    let options = PlaybackOptions {
        chat_open_delay: Duration::ZERO,
        key_delay: Duration::ZERO,
        hold: Duration::ZERO,
    };
    dispatch::run(&mut dispatcher, &rx, &mut injector, &options);

    let keys = injector.keystrokes();
    assert_eq!(keys.first(), Some(&Injected::Press(Key::Code(Keycode::DEFAULT_CHAT_OPENER))));
    assert_eq!(keys.last(), Some(&Injected::Release(Key::Code(Keycode::ENTER))));
}

#[test]
fn test_script_steps_drive_virtual_clock() {
    let steps = parse_script("wait 100\ntap f1\n").unwrap();
    assert_eq!(steps[0], ScriptStep::Wait(Duration::from_millis(100)));
    assert_eq!(steps.len(), 3);
}

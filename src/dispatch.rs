//! Hotkey dispatch: turns raw key events into menu and playback actions
//!
//! ```text
//! KeyEvent ──▶ Dispatcher::handle() ──▶ OpenMenu / CloseMenu / Play
//!                    ▲
//!   Dispatcher::tick() closes an idle menu after `menu_close_delay`
//! ```
//!
//! The dispatcher is pure state: it never sleeps or injects keys, and
//! takes the current time as an argument. [`run`] and [`simulate`] wire it
//! to an event stream and a [`KeyInjector`].

use std::collections::HashSet;
use std::fmt;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::hook::ScriptStep;
use crate::keycodes::Keycode;
use crate::macros::{MacroId, Macros};
use crate::playback::{KeyInjector, PlaybackOptions};

/// How long an opened menu waits for its activation key
pub const DEFAULT_MENU_CLOSE_DELAY: Duration = Duration::from_secs(2);

/// How often the overlay loop wakes up to expire menus
const TICK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyDirection {
    Down,
    Up,
}

/// A raw key event from the system hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: Keycode,
    pub direction: KeyDirection,
}

impl KeyEvent {
    pub fn down(code: Keycode) -> Self {
        Self {
            code,
            direction: KeyDirection::Down,
        }
    }

    pub fn up(code: Keycode) -> Self {
        Self {
            code,
            direction: KeyDirection::Up,
        }
    }
}

/// What the overlay should do in response to a key event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchAction {
    OpenMenu(MenuView),
    CloseMenu(Keycode),
    Play(MacroId),
}

/// One line of an open menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuLine {
    pub key: Keycode,
    pub text: String,
}

/// The entries shown while a menu is open
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuView {
    pub menu: Keycode,
    pub lines: Vec<MenuLine>,
}

impl MenuView {
    pub fn new(macros: &Macros, menu: Keycode) -> Self {
        let lines = macros
            .get_menu_entries(Some(menu))
            .into_iter()
            .filter_map(|m| {
                m.activation_key().map(|key| MenuLine {
                    key,
                    text: m.text().to_string(),
                })
            })
            .collect();
        Self { menu, lines }
    }
}

impl fmt::Display for MenuView {
    /// ```text
    /// Num4: Go left!
    /// Num5: Howard hits those!
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}: {}", line.key, line.text)?;
        }
        Ok(())
    }
}

/// Menu state machine over a macro registry
#[derive(Debug)]
pub struct Dispatcher {
    macros: Macros,
    watched: HashSet<Keycode>,
    down_keys: HashSet<Keycode>,
    current_menu: Option<Keycode>,
    menu_opened: Option<Instant>,
    menu_close_delay: Duration,
}

impl Dispatcher {
    /// Take ownership of `macros` and arm them
    pub fn new(mut macros: Macros, menu_close_delay: Duration) -> Self {
        macros.arm_macros();
        let watched = macros.unique_keycodes();
        Self {
            macros,
            watched,
            down_keys: HashSet::new(),
            current_menu: None,
            menu_opened: None,
            menu_close_delay,
        }
    }

    pub fn macros(&self) -> &Macros {
        &self.macros
    }

    pub fn current_menu(&self) -> Option<Keycode> {
        self.current_menu
    }

    /// Whether the dispatcher reacts to `code` at all
    pub fn is_watched(&self, code: Keycode) -> bool {
        self.watched.contains(&code)
    }

    /// Feed one key event
    ///
    /// Only key-down events of watched keys can trigger anything, and a
    /// key held down fires once until it is released.
    pub fn handle(&mut self, event: KeyEvent, now: Instant) -> Vec<DispatchAction> {
        if !self.is_watched(event.code) {
            tracing::trace!("Unwatched key: {}", event.code);
            return Vec::new();
        }

        tracing::debug!("Key {:?}: {} [{}]", event.direction, event.code, event.code.0);
        match event.direction {
            KeyDirection::Up => {
                self.down_keys.remove(&event.code);
                Vec::new()
            }
            KeyDirection::Down => {
                if !self.down_keys.insert(event.code) {
                    return Vec::new();
                }
                self.key_pressed(event.code, now)
            }
        }
    }

    fn key_pressed(&mut self, code: Keycode, now: Instant) -> Vec<DispatchAction> {
        match self.current_menu {
            None if self.macros.is_menu_key(code) => {
                self.current_menu = Some(code);
                self.menu_opened = Some(now);
                tracing::debug!("Showing menu for {}", code);
                vec![DispatchAction::OpenMenu(MenuView::new(&self.macros, code))]
            }
            None => self
                .macros
                .get_macro(None, code)
                .map(|m| vec![DispatchAction::Play(m.id())])
                .unwrap_or_default(),
            Some(menu) => match self.macros.get_macro(Some(menu), code) {
                Some(m) => {
                    let id = m.id();
                    self.close_menu();
                    vec![DispatchAction::CloseMenu(menu), DispatchAction::Play(id)]
                }
                None => Vec::new(),
            },
        }
    }

    /// Close the open menu once it has waited `menu_close_delay`
    pub fn tick(&mut self, now: Instant) -> Option<DispatchAction> {
        let opened = self.menu_opened?;
        if now.saturating_duration_since(opened) <= self.menu_close_delay {
            return None;
        }
        let menu = self.current_menu?;
        tracing::debug!("Menu {} timed out", menu);
        self.close_menu();
        Some(DispatchAction::CloseMenu(menu))
    }

    fn close_menu(&mut self) {
        self.current_menu = None;
        self.menu_opened = None;
    }
}

/// Carry out an action: play macros, log menu changes
pub fn apply<I: KeyInjector + ?Sized>(
    dispatcher: &Dispatcher,
    action: &DispatchAction,
    injector: &mut I,
    options: &PlaybackOptions,
) {
    match action {
        DispatchAction::OpenMenu(view) => {
            tracing::info!("Menu {} open:\n{}", view.menu, view);
        }
        DispatchAction::CloseMenu(menu) => {
            tracing::info!("Menu {} closed", menu);
        }
        DispatchAction::Play(id) => {
            let Some(m) = dispatcher.macros().get(*id) else {
                tracing::warn!("Macro {} vanished before playback", id);
                return;
            };
            if let Err(e) = m.play(injector, options) {
                tracing::warn!("Failed to play {}: {}", m, e);
            }
        }
    }
}

/// The overlay loop: dispatch events until the stream closes
pub fn run<I: KeyInjector + ?Sized>(
    dispatcher: &mut Dispatcher,
    events: &Receiver<KeyEvent>,
    injector: &mut I,
    options: &PlaybackOptions,
) {
    tracing::info!(
        "Listening for {} hotkeys",
        dispatcher.macros().unique_keycodes().len()
    );

    loop {
        let mut actions = match events.recv_timeout(TICK_INTERVAL) {
            Ok(event) => dispatcher.handle(event, Instant::now()),
            Err(RecvTimeoutError::Timeout) => Vec::new(),
            Err(RecvTimeoutError::Disconnected) => break,
        };
        actions.extend(dispatcher.tick(Instant::now()));

        for action in &actions {
            apply(dispatcher, action, injector, options);
        }
    }

    tracing::info!("Key event stream closed");
}

/// Replay a scripted event stream on a virtual clock
///
/// `on_action` sees every action before it is applied, so callers can
/// report what happened.
pub fn simulate<I, F>(
    dispatcher: &mut Dispatcher,
    script: &[ScriptStep],
    injector: &mut I,
    options: &PlaybackOptions,
    mut on_action: F,
) where
    I: KeyInjector + ?Sized,
    F: FnMut(&DispatchAction, &mut I),
{
    let start = Instant::now();
    let mut elapsed = Duration::ZERO;

    for step in script {
        let mut actions = Vec::new();
        match step {
            ScriptStep::Event(event) => {
                actions.extend(dispatcher.handle(*event, start + elapsed));
            }
            ScriptStep::Wait(duration) => elapsed += *duration,
        }
        actions.extend(dispatcher.tick(start + elapsed));

        for action in &actions {
            apply(dispatcher, action, injector, options);
            on_action(action, injector);
        }
    }
}

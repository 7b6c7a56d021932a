//! Keystroke injection for macro playback
//!
//! A macro types its text by opening the game's chat, tapping one key per
//! character (Shift held for shifted characters) and finishing with Enter.
//! The OS side is hidden behind [`KeyInjector`] so the same routine drives
//! the Windows `SendInput` backend and the in-memory recorder.

mod recording;

use std::fmt;
use std::time::Duration;

use crate::keycodes::{shifted_base, Keycode};

pub use recording::{Injected, RecordingInjector};

/// A key to inject
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// A hardware scancode
    Code(Keycode),
    /// A character with no scancode on the key table, sent as text
    Unicode(char),
}

impl Key {
    /// The key that types `ch` unshifted
    pub fn for_char(ch: char) -> Key {
        Keycode::for_char(ch)
            .map(Key::Code)
            .unwrap_or(Key::Unicode(ch))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Code(code) => write!(f, "{}", code),
            Key::Unicode(ch) => write!(f, "'{}'", ch),
        }
    }
}

/// Synthetic keyboard output
pub trait KeyInjector {
    fn press(&mut self, key: Key) -> Result<(), InjectError>;

    fn release(&mut self, key: Key) -> Result<(), InjectError>;

    /// Wait between keystrokes
    fn pause(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }

    /// Press and immediately release
    fn tap(&mut self, key: Key) -> Result<(), InjectError> {
        self.press(key)?;
        self.release(key)
    }
}

impl<T: KeyInjector + ?Sized> KeyInjector for Box<T> {
    fn press(&mut self, key: Key) -> Result<(), InjectError> {
        (**self).press(key)
    }

    fn release(&mut self, key: Key) -> Result<(), InjectError> {
        (**self).release(key)
    }

    fn pause(&mut self, duration: Duration) {
        (**self).pause(duration)
    }

    fn tap(&mut self, key: Key) -> Result<(), InjectError> {
        (**self).tap(key)
    }
}

/// Timing knobs for playback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackOptions {
    /// Pause after tapping the chat opener so the chat box can open
    pub chat_open_delay: Duration,
    /// Pause after each character
    pub key_delay: Duration,
    /// How long each key is held. Zero taps press and release back to back.
    pub hold: Duration,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            chat_open_delay: Duration::from_millis(50),
            key_delay: Duration::from_micros(100),
            hold: Duration::ZERO,
        }
    }
}

/// Type `text` after opening chat with `chat_opener`, then send it with Enter
pub fn type_text<I: KeyInjector + ?Sized>(
    injector: &mut I,
    chat_opener: Option<Keycode>,
    text: &str,
    options: &PlaybackOptions,
) -> Result<(), InjectError> {
    if let Some(opener) = chat_opener {
        injector.tap(Key::Code(opener))?;
        injector.pause(options.chat_open_delay);
    }

    for ch in text.chars() {
        match shifted_base(ch) {
            Some(base) => {
                let shift = Key::Code(Keycode::SHIFT);
                injector.press(shift)?;
                stroke(injector, Key::for_char(base), options)?;
                injector.release(shift)?;
            }
            None => stroke(injector, Key::for_char(ch), options)?,
        }
        injector.pause(options.key_delay);
    }

    injector.tap(Key::Code(Keycode::ENTER))
}

fn stroke<I: KeyInjector + ?Sized>(
    injector: &mut I,
    key: Key,
    options: &PlaybackOptions,
) -> Result<(), InjectError> {
    if options.hold.is_zero() {
        return injector.tap(key);
    }
    injector.press(key)?;
    injector.pause(options.hold);
    injector.release(key)?;
    injector.pause(options.hold);
    Ok(())
}

/// Errors raised by an injection backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectError {
    /// The OS accepted fewer events than were sent
    Rejected { key: Key, reason: String },
    Unsupported(String),
}

impl fmt::Display for InjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InjectError::Rejected { key, reason } => {
                write!(f, "Failed to inject {}: {}", key, reason)
            }
            InjectError::Unsupported(what) => write!(f, "Injection not supported: {}", what),
        }
    }
}

impl std::error::Error for InjectError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(c: u16) -> Key {
        Key::Code(Keycode(c))
    }

    #[test]
    fn test_plain_text_taps_each_key_then_enter() {
        let mut rec = RecordingInjector::new();
        type_text(&mut rec, None, "hi", &PlaybackOptions::default()).unwrap();

        assert_eq!(
            rec.keystrokes(),
            vec![
                Injected::Press(code(35)),
                Injected::Release(code(35)),
                Injected::Press(code(23)),
                Injected::Release(code(23)),
                Injected::Press(code(28)),
                Injected::Release(code(28)),
            ]
        );
    }

    #[test]
    fn test_chat_opener_tapped_first_and_waited_on() {
        let mut rec = RecordingInjector::new();
        let options = PlaybackOptions::default();
        type_text(&mut rec, Some(Keycode::DEFAULT_CHAT_OPENER), "a", &options).unwrap();

        let events = rec.events();
        assert_eq!(events[0], Injected::Press(code(20)));
        assert_eq!(events[1], Injected::Release(code(20)));
        assert_eq!(events[2], Injected::Pause(options.chat_open_delay));
    }

    #[test]
    fn test_shifted_characters_hold_shift() {
        let mut rec = RecordingInjector::new();
        type_text(&mut rec, None, "A!", &PlaybackOptions::default()).unwrap();

        let shift = code(42);
        assert_eq!(
            rec.keystrokes(),
            vec![
                Injected::Press(shift),
                Injected::Press(code(30)),
                Injected::Release(code(30)),
                Injected::Release(shift),
                Injected::Press(shift),
                Injected::Press(code(2)),
                Injected::Release(code(2)),
                Injected::Release(shift),
                Injected::Press(code(28)),
                Injected::Release(code(28)),
            ]
        );
    }

    #[test]
    fn test_unmapped_character_sent_as_unicode() {
        let mut rec = RecordingInjector::new();
        type_text(&mut rec, None, "é", &PlaybackOptions::default()).unwrap();
        assert_eq!(rec.keystrokes()[0], Injected::Press(Key::Unicode('é')));
    }

    #[test]
    fn test_hold_pauses_between_press_and_release() {
        let mut rec = RecordingInjector::new();
        let options = PlaybackOptions {
            hold: Duration::from_millis(5),
            ..PlaybackOptions::default()
        };
        type_text(&mut rec, None, "a", &options).unwrap();

        let events = rec.events();
        assert_eq!(events[0], Injected::Press(code(30)));
        assert_eq!(events[1], Injected::Pause(Duration::from_millis(5)));
        assert_eq!(events[2], Injected::Release(code(30)));
        // Enter is sent once, after the text
        let enters = rec
            .keystrokes()
            .into_iter()
            .filter(|e| *e == Injected::Press(code(28)))
            .count();
        assert_eq!(enters, 1);
    }
}

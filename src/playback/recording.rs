//! In-memory injector that records output instead of sending it

use std::fmt;
use std::time::Duration;

use super::{InjectError, Key, KeyInjector};

/// One recorded injector call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Injected {
    Press(Key),
    Release(Key),
    Pause(Duration),
}

impl fmt::Display for Injected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Injected::Press(key) => write!(f, "+{}", key),
            Injected::Release(key) => write!(f, "-{}", key),
            Injected::Pause(d) => write!(f, "~{:?}", d),
        }
    }
}

/// Records presses, releases and pauses. Pauses are not slept.
#[derive(Debug, Default, Clone)]
pub struct RecordingInjector {
    events: Vec<Injected>,
}

impl RecordingInjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Injected] {
        &self.events
    }

    /// Recorded events without pauses
    pub fn keystrokes(&self) -> Vec<Injected> {
        self.events
            .iter()
            .copied()
            .filter(|e| !matches!(e, Injected::Pause(_)))
            .collect()
    }

    /// Take everything recorded so far
    pub fn drain(&mut self) -> Vec<Injected> {
        std::mem::take(&mut self.events)
    }
}

impl KeyInjector for RecordingInjector {
    fn press(&mut self, key: Key) -> Result<(), InjectError> {
        self.events.push(Injected::Press(key));
        Ok(())
    }

    fn release(&mut self, key: Key) -> Result<(), InjectError> {
        self.events.push(Injected::Release(key));
        Ok(())
    }

    fn pause(&mut self, duration: Duration) {
        if !duration.is_zero() {
            self.events.push(Injected::Pause(duration));
        }
    }
}

//! System keyboard access: global key events in, synthetic keys out
//!
//! The dispatcher only needs a stream of [`KeyEvent`]s and a
//! [`KeyInjector`]. On Windows both come from a low-level keyboard hook
//! and `SendInput`. Elsewhere [`install`] reports the platform as
//! unsupported and scripted events ([`parse_script`]) stand in.

mod script;
#[cfg(target_os = "windows")]
mod win32;

use std::fmt;
use std::sync::mpsc::Receiver;

use crate::dispatch::KeyEvent;
use crate::playback::KeyInjector;

pub use script::{parse_script, ScriptError, ScriptStep};

/// A running system-wide keyboard hook
///
/// Events from synthetic input are filtered out, so playback never
/// re-triggers hotkeys. Dropping the hook uninstalls it.
pub struct SystemHook {
    events: Receiver<KeyEvent>,
    #[cfg(target_os = "windows")]
    _thread: win32::HookThread,
}

impl SystemHook {
    pub fn events(&self) -> &Receiver<KeyEvent> {
        &self.events
    }
}

/// Install the global keyboard hook
#[cfg(target_os = "windows")]
pub fn install() -> Result<SystemHook, HookError> {
    let (events, thread) = win32::install()?;
    tracing::info!("Installed low-level keyboard hook");
    Ok(SystemHook {
        events,
        _thread: thread,
    })
}

/// Install the global keyboard hook
#[cfg(not(target_os = "windows"))]
pub fn install() -> Result<SystemHook, HookError> {
    Err(HookError::Unsupported(std::env::consts::OS))
}

/// The platform's synthetic keyboard
#[cfg(target_os = "windows")]
pub fn system_injector() -> Result<Box<dyn KeyInjector>, HookError> {
    Ok(Box::new(win32::SendInputInjector))
}

/// The platform's synthetic keyboard
#[cfg(not(target_os = "windows"))]
pub fn system_injector() -> Result<Box<dyn KeyInjector>, HookError> {
    Err(HookError::Unsupported(std::env::consts::OS))
}

/// Errors that can occur when hooking the keyboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookError {
    Unsupported(&'static str),
    Install(String),
}

impl fmt::Display for HookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookError::Unsupported(os) => write!(
                f,
                "Global keyboard hook is not supported on {} (use `simulate` to test macros)",
                os
            ),
            HookError::Install(e) => write!(f, "Failed to install keyboard hook: {}", e),
        }
    }
}

impl std::error::Error for HookError {}

//! quickchat - quick-chat macros for games
//!
//! This crate provides the macro registry, the hotkey dispatcher and the
//! keystroke playback behind the `quickchat` command.

pub mod cli;
pub mod config;
pub mod config_paths;
pub mod dispatch;
pub mod hook;
pub mod keycodes;
pub mod macros;
pub mod playback;
pub mod tracing;

// Re-export commonly used types
pub use config::AppConfig;
pub use dispatch::{DispatchAction, Dispatcher, KeyEvent};
pub use keycodes::Keycode;
pub use macros::{Macro, Macros, MacrosError};
pub use playback::{KeyInjector, PlaybackOptions};

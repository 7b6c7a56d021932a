//! Key identities shared by the registry, dispatcher and playback
//!
//! Keys are hardware scancodes. Macro files store the raw number; the
//! CLI and logs use the names from the built-in table.
//!
//! ```text
//! "num4" ──FromStr──▶ Keycode(75) ──Display──▶ "Num4"
//! '?'    ──shifted_base──▶ '/' ──for_char──▶ Keycode(53)
//! ```

mod table;
mod types;

pub use types::{keyname, shifted_base, KeyParseError, Keycode};

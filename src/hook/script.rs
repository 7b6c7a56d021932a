//! Scripted key events for `quickchat simulate`
//!
//! Lines starting with `#` are comments.
//!
//! ```text
//! # open the Num7 menu, then pick Num4
//! tap num7
//! wait 500
//! down num4
//! up num4
//! ```

use std::fmt;
use std::time::Duration;

use crate::dispatch::KeyEvent;
use crate::keycodes::Keycode;

/// One step of a scripted event stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStep {
    Event(KeyEvent),
    /// Advance the clock
    Wait(Duration),
}

/// Parse a script. `tap <key>` expands to a down and an up event.
pub fn parse_script(text: &str) -> Result<Vec<ScriptStep>, ScriptError> {
    let mut steps = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (verb, arg) = line
            .split_once(char::is_whitespace)
            .map(|(v, a)| (v, a.trim()))
            .unwrap_or((line, ""));
        let err = |message: String| ScriptError {
            line: line_no,
            message,
        };

        match verb.to_lowercase().as_str() {
            "wait" => {
                let ms = arg
                    .parse::<u64>()
                    .map_err(|_| err(format!("invalid wait '{}', expected milliseconds", arg)))?;
                steps.push(ScriptStep::Wait(Duration::from_millis(ms)));
            }
            verb @ ("down" | "up" | "tap") => {
                let code: Keycode = arg.parse().map_err(|e| err(format!("{}", e)))?;
                match verb {
                    "down" => steps.push(ScriptStep::Event(KeyEvent::down(code))),
                    "up" => steps.push(ScriptStep::Event(KeyEvent::up(code))),
                    _ => {
                        steps.push(ScriptStep::Event(KeyEvent::down(code)));
                        steps.push(ScriptStep::Event(KeyEvent::up(code)));
                    }
                }
            }
            other => return Err(err(format!("unknown step '{}'", other))),
        }
    }

    Ok(steps)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ScriptError {}

//! Windows backend: `WH_KEYBOARD_LL` hook and `SendInput` injection

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;
use std::thread::JoinHandle;

use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYBD_EVENT_FLAGS, KEYEVENTF_KEYUP,
    KEYEVENTF_SCANCODE, KEYEVENTF_UNICODE, VIRTUAL_KEY,
};
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, GetMessageW, PostThreadMessageW, SetWindowsHookExW, UnhookWindowsHookEx,
    HC_ACTION, KBDLLHOOKSTRUCT, LLKHF_INJECTED, MSG, WH_KEYBOARD_LL, WM_KEYDOWN, WM_KEYUP,
    WM_QUIT, WM_SYSKEYDOWN, WM_SYSKEYUP,
};

use super::HookError;
use crate::dispatch::{KeyDirection, KeyEvent};
use crate::keycodes::Keycode;
use crate::playback::{InjectError, Key, KeyInjector};

/// Where the hook procedure forwards events. The hook has no user data
/// pointer, so this has to be global.
static EVENT_SENDER: Mutex<Option<Sender<KeyEvent>>> = Mutex::new(None);

/// The thread that owns the hook and pumps its message loop
pub(super) struct HookThread {
    thread_id: u32,
    handle: Option<JoinHandle<()>>,
}

impl Drop for HookThread {
    fn drop(&mut self) {
        unsafe {
            let _ = PostThreadMessageW(self.thread_id, WM_QUIT, WPARAM(0), LPARAM(0));
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

pub(super) fn install() -> Result<(Receiver<KeyEvent>, HookThread), HookError> {
    let (tx, rx) = mpsc::channel();
    *EVENT_SENDER
        .lock()
        .map_err(|_| HookError::Install("hook state poisoned".to_string()))? = Some(tx);

    let (ready_tx, ready_rx) = mpsc::channel();
    let handle = std::thread::Builder::new()
        .name("keyboard-hook".to_string())
        .spawn(move || hook_thread(ready_tx))
        .map_err(|e| HookError::Install(e.to_string()))?;

    let thread_id = ready_rx
        .recv()
        .map_err(|_| HookError::Install("hook thread exited".to_string()))?
        .map_err(HookError::Install)?;

    Ok((
        rx,
        HookThread {
            thread_id,
            handle: Some(handle),
        },
    ))
}

fn hook_thread(ready: Sender<Result<u32, String>>) {
    unsafe {
        let module = match GetModuleHandleW(None) {
            Ok(module) => module,
            Err(e) => {
                let _ = ready.send(Err(e.to_string()));
                return;
            }
        };

        let hook = match SetWindowsHookExW(
            WH_KEYBOARD_LL,
            Some(keyboard_hook_proc),
            Some(module.into()),
            0,
        ) {
            Ok(hook) => hook,
            Err(e) => {
                let _ = ready.send(Err(e.to_string()));
                return;
            }
        };
        let _ = ready.send(Ok(GetCurrentThreadId()));

        // Low-level hooks are called on this thread while it pumps messages
        let mut msg = MSG::default();
        while GetMessageW(&mut msg, None, 0, 0).0 > 0 {}

        let _ = UnhookWindowsHookEx(hook);
    }

    if let Ok(mut sender) = EVENT_SENDER.lock() {
        sender.take();
    }
    tracing::info!("Keyboard hook removed");
}

unsafe extern "system" fn keyboard_hook_proc(
    code: i32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if code == HC_ACTION as i32 {
        let kbd = &*(lparam.0 as *const KBDLLHOOKSTRUCT);
        let injected = kbd.flags.0 & LLKHF_INJECTED.0 != 0;
        let direction = match wparam.0 as u32 {
            WM_KEYDOWN | WM_SYSKEYDOWN => Some(KeyDirection::Down),
            WM_KEYUP | WM_SYSKEYUP => Some(KeyDirection::Up),
            _ => None,
        };

        if let (false, Some(direction)) = (injected, direction) {
            if let Ok(sender) = EVENT_SENDER.lock() {
                if let Some(tx) = sender.as_ref() {
                    let _ = tx.send(KeyEvent {
                        code: Keycode(kbd.scanCode as u16),
                        direction,
                    });
                }
            }
        }
    }
    CallNextHookEx(None, code, wparam, lparam)
}

/// Injects scancodes, and text for characters with no scancode
pub(super) struct SendInputInjector;

impl SendInputInjector {
    fn send(&mut self, key: Key, release: bool) -> Result<(), InjectError> {
        let up = if release {
            KEYEVENTF_KEYUP
        } else {
            KEYBD_EVENT_FLAGS(0)
        };

        let inputs: Vec<INPUT> = match key {
            Key::Code(code) => vec![keyboard_input(code.0, KEYEVENTF_SCANCODE | up)],
            Key::Unicode(ch) => {
                let mut buf = [0u16; 2];
                ch.encode_utf16(&mut buf)
                    .iter()
                    .map(|unit| keyboard_input(*unit, KEYEVENTF_UNICODE | up))
                    .collect()
            }
        };

        let sent = unsafe { SendInput(&inputs, std::mem::size_of::<INPUT>() as i32) };
        if sent as usize != inputs.len() {
            return Err(InjectError::Rejected {
                key,
                reason: format!("SendInput accepted {} of {} events", sent, inputs.len()),
            });
        }
        Ok(())
    }
}

impl KeyInjector for SendInputInjector {
    fn press(&mut self, key: Key) -> Result<(), InjectError> {
        self.send(key, false)
    }

    fn release(&mut self, key: Key) -> Result<(), InjectError> {
        self.send(key, true)
    }
}

fn keyboard_input(scan: u16, flags: KEYBD_EVENT_FLAGS) -> INPUT {
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(0),
                wScan: scan,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

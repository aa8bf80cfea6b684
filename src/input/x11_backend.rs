//! X11 XGrabKey hotkey backend
//!
//! Uses X11's native global hotkey registration via XGrabKey. Requires no
//! special permissions.
//!
//! Limitations:
//! - Cannot distinguish between different physical keyboards
//! - Fails when another client already grabbed the same combination

use anyhow::{Context, Result};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc::Sender;
use tracing::{debug, error, info, warn};
use x11rb::connection::Connection;
use x11rb::errors::ReplyError;
use x11rb::protocol::Event;
use x11rb::protocol::ErrorKind;
use x11rb::protocol::xproto::*;

use crate::config::{HotkeyBinding, KeyPress};
use crate::constants::x11::EVDEV_KEYCODE_OFFSET;
use crate::input::backend::{GrabError, GrabHost};
use crate::x11::X11Session;

/// Lock-key permutations grabbed alongside every combination.
/// X11 treats "Ctrl+P" and "Ctrl+P+NumLock" as different hotkeys.
fn ignore_masks() -> [ModMask; 4] {
    [
        ModMask::from(0u16),         // No lock keys
        ModMask::M2,                 // NumLock (Mod2)
        ModMask::LOCK,               // CapsLock
        ModMask::M2 | ModMask::LOCK, // NumLock + CapsLock
    ]
}

pub struct X11GrabHost {
    session: Arc<X11Session>,
}

impl X11GrabHost {
    pub fn new(session: Arc<X11Session>) -> Self {
        Self { session }
    }
}

impl GrabHost for X11GrabHost {
    fn grab(&mut self, binding: &HotkeyBinding) -> Result<(), GrabError> {
        let (keycode, modmask) = binding_to_x11_key(binding)
            .ok_or_else(|| GrabError::Unmappable(binding.display_name()))?;

        let conn = &self.session.conn;
        let root = self.session.root;
        let mut grabbed = Vec::with_capacity(4);

        for ignore_mask in ignore_masks() {
            let effective_modmask = modmask | ignore_mask;
            let result = conn
                .grab_key(
                    false, // owner_events: deliver to this client only
                    root,
                    effective_modmask,
                    keycode,
                    GrabMode::ASYNC,
                    GrabMode::ASYNC,
                )
                .map_err(ReplyError::from)
                .and_then(|cookie| cookie.check());

            if let Err(err) = result {
                // Roll back the permutations that did succeed
                for done in &grabbed {
                    let _ = conn.ungrab_key(keycode, root, *done);
                }
                let _ = conn.flush();

                return Err(match err {
                    ReplyError::X11Error(e) if e.error_kind == ErrorKind::Access => {
                        GrabError::AlreadyClaimed(binding.display_name())
                    }
                    other => GrabError::Host(anyhow::Error::new(other).context(format!(
                        "Failed to grab key: keycode={}, modmask={:?}",
                        keycode, effective_modmask
                    ))),
                });
            }
            grabbed.push(effective_modmask);
        }

        info!(
            binding = %binding.display_name(),
            x11_keycode = keycode,
            modmask = ?modmask,
            "Grabbed global hotkey"
        );
        Ok(())
    }

    fn ungrab(&mut self, binding: &HotkeyBinding) -> Result<(), GrabError> {
        let (keycode, modmask) = binding_to_x11_key(binding)
            .ok_or_else(|| GrabError::Unmappable(binding.display_name()))?;

        let conn = &self.session.conn;
        for ignore_mask in ignore_masks() {
            let effective_modmask = modmask | ignore_mask;
            conn.ungrab_key(keycode, self.session.root, effective_modmask)
                .context("Failed to send UngrabKey request")?
                .check()
                .context("X server rejected UngrabKey")?;
        }

        debug!(binding = %binding.display_name(), "Released global hotkey");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "X11"
    }
}

/// Spawn the thread that turns X11 KeyPress events into [`KeyPress`] values
/// for the event loop.
///
/// Only grabbed combinations produce KeyPress events on the root window, so
/// every event is forwarded; the broker decides whether it matches.
pub fn spawn_listener(session: Arc<X11Session>, sender: Sender<KeyPress>) -> JoinHandle<()> {
    thread::spawn(move || {
        if let Err(e) = run_listener(&session, &sender) {
            error!(error = %e, "X11 hotkey listener error");
        }
    })
}

fn run_listener(session: &X11Session, sender: &Sender<KeyPress>) -> Result<()> {
    info!("X11 hotkey listener started");

    loop {
        let event = session
            .conn
            .wait_for_event()
            .context("Lost connection to X11 while waiting for events")?;

        match event {
            Event::KeyPress(key_event) => {
                let Some(press) = x11_key_to_press(key_event.detail, key_event.state) else {
                    debug!(keycode = key_event.detail, "KeyPress outside evdev range");
                    continue;
                };

                debug!(keycode = key_event.detail, state = ?key_event.state, "KeyPress received");

                if sender.blocking_send(press).is_err() {
                    info!("Event loop closed, stopping X11 hotkey listener");
                    return Ok(());
                }
            }
            Event::MappingNotify(_) => {
                warn!("Keyboard mapping changed - hotkey may not work correctly until reload");
            }
            // Errors from unchecked requests issued elsewhere also land here
            Event::Error(e) => {
                debug!(error = ?e, "X11 error event");
            }
            _ => {}
        }
    }
}

/// Normalize modifier mask by removing lock keys
fn normalize_modmask(state: KeyButMask) -> ModMask {
    let state_u16: u16 = state.into();

    // Keep only Shift, Control, Mod1 (Alt), Mod4 (Super)
    let normalized = state_u16
        & (ModMask::SHIFT.bits()
            | ModMask::CONTROL.bits()
            | ModMask::M1.bits()
            | ModMask::M4.bits());

    ModMask::from(normalized)
}

/// Convert an X11 key event back to evdev terms
fn x11_key_to_press(keycode: Keycode, state: KeyButMask) -> Option<KeyPress> {
    let key_code = u16::from(keycode).checked_sub(EVDEV_KEYCODE_OFFSET)?;
    let modmask = normalize_modmask(state);

    Some(KeyPress::new(
        key_code,
        modmask.contains(ModMask::CONTROL),
        modmask.contains(ModMask::SHIFT),
        modmask.contains(ModMask::M1),
        modmask.contains(ModMask::M4),
    ))
}

/// Convert a binding to X11 keycode and modifier mask
fn binding_to_x11_key(binding: &HotkeyBinding) -> Option<(Keycode, ModMask)> {
    let x11_keycode = evdev_keycode_to_x11(binding.key_code)?;

    let mut modmask = ModMask::from(0u16);

    if binding.ctrl {
        modmask |= ModMask::CONTROL;
    }
    if binding.shift {
        modmask |= ModMask::SHIFT;
    }
    if binding.alt {
        modmask |= ModMask::M1; // Alt is typically Mod1
    }
    if binding.super_key {
        modmask |= ModMask::M4; // Super is typically Mod4
    }

    Some((x11_keycode, modmask))
}

/// Convert evdev keycode to X11 keycode
///
/// X11 keycodes are typically evdev keycode + 8
fn evdev_keycode_to_x11(evdev_code: u16) -> Option<Keycode> {
    let x11_code = evdev_code.checked_add(EVDEV_KEYCODE_OFFSET)?;

    if (8..=255).contains(&x11_code) {
        Some(x11_code as Keycode)
    } else {
        None
    }
}

//! X11 window queries and operations

use anyhow::{Context, Result};
use tracing::debug;
use x11rb::connection::Connection;
use x11rb::errors::ReplyError;
use x11rb::protocol::xproto::*;

use crate::common::geometry::Rect;
use crate::constants::x11;

use super::X11Session;

/// Get the list of managed client windows from _NET_CLIENT_LIST on the root window
pub fn get_client_list(session: &X11Session) -> Result<Vec<Window>> {
    let prop = session
        .conn
        .get_property(
            false,
            session.root,
            session.atoms.net_client_list,
            AtomEnum::WINDOW,
            0,
            u32::MAX,
        )
        .context("Failed to query _NET_CLIENT_LIST property")?
        .reply()
        .context("Failed to get window list from X11 server")?;

    // An empty property (no window manager yet) has no format
    Ok(prop
        .value32()
        .map(|values| values.collect())
        .unwrap_or_default())
}

/// Read _NET_WM_PID. Windows destroyed mid-query report no pid.
pub fn get_window_pid(session: &X11Session, window: Window) -> Result<Option<u32>> {
    let cookie = session
        .conn
        .get_property(
            false,
            window,
            session.atoms.net_wm_pid,
            AtomEnum::CARDINAL,
            0,
            1,
        )
        .context(format!("Failed to query _NET_WM_PID for window {}", window))?;

    let prop = match cookie.reply() {
        Ok(reply) => reply,
        Err(ReplyError::X11Error(err)) if err.error_kind == x11rb::protocol::ErrorKind::Window => {
            debug!(window = window, "Window destroyed before _NET_WM_PID reply, skipping");
            return Ok(None);
        }
        Err(err) => {
            return Err(err)
                .context(format!("Failed to get _NET_WM_PID reply for window {}", window));
        }
    };

    if prop.value.len() < x11::PID_PROPERTY_SIZE {
        return Ok(None);
    }
    Ok(prop.value32().and_then(|mut values| values.next()))
}

/// Find the first managed top-level window owned by `pid`
pub fn find_window_by_pid(session: &X11Session, pid: u32) -> Result<Option<Window>> {
    for window in get_client_list(session)? {
        if get_window_pid(session, window)? == Some(pid) {
            return Ok(Some(window));
        }
    }
    Ok(None)
}

/// Move and resize a window. The window manager may adjust the request.
pub fn move_resize_window(session: &X11Session, window: Window, rect: Rect) -> Result<()> {
    session
        .conn
        .configure_window(
            window,
            &ConfigureWindowAux::new()
                .x(rect.origin.x)
                .y(rect.origin.y)
                .width(rect.size.width)
                .height(rect.size.height),
        )
        .context(format!("Failed to configure geometry of window {}", window))?;

    session
        .conn
        .flush()
        .context("Failed to flush X11 connection after window move")?;
    Ok(())
}

/// Ask the window manager to add one or two _NET_WM_STATE atoms
pub fn add_window_state(
    session: &X11Session,
    window: Window,
    first: Atom,
    second: Atom,
) -> Result<()> {
    let event = ClientMessageEvent {
        response_type: CLIENT_MESSAGE_EVENT,
        format: 32,
        sequence: 0,
        window,
        type_: session.atoms.net_wm_state,
        data: ClientMessageData::from([
            x11::NET_WM_STATE_ADD,
            first,
            second,
            x11::ACTIVE_WINDOW_SOURCE_PAGER,
            0,
        ]),
    };

    session
        .conn
        .send_event(
            false,
            session.root,
            EventMask::SUBSTRUCTURE_NOTIFY | EventMask::SUBSTRUCTURE_REDIRECT,
            event,
        )
        .context(format!("Failed to send _NET_WM_STATE event for window {}", window))?;

    session
        .conn
        .flush()
        .context("Failed to flush X11 connection after window state change")?;
    Ok(())
}

pub fn maximize_window(session: &X11Session, window: Window) -> Result<()> {
    add_window_state(
        session,
        window,
        session.atoms.net_wm_state_maximized_vert,
        session.atoms.net_wm_state_maximized_horz,
    )
}

pub fn fullscreen_window(session: &X11Session, window: Window) -> Result<()> {
    add_window_state(session, window, session.atoms.net_wm_state_fullscreen, 0)
}

/// Activate (focus) an X11 window using _NET_ACTIVE_WINDOW
pub fn activate_window(session: &X11Session, window: Window) -> Result<()> {
    session
        .conn
        .configure_window(
            window,
            &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE),
        )
        .context(format!("Failed to raise window {} to top of stack", window))?;

    let event = ClientMessageEvent {
        response_type: CLIENT_MESSAGE_EVENT,
        format: 32,
        sequence: 0,
        window,
        type_: session.atoms.net_active_window,
        data: ClientMessageData::from([
            x11::ACTIVE_WINDOW_SOURCE_PAGER,
            x11rb::CURRENT_TIME,
            0,
            0,
            0,
        ]),
    };

    session
        .conn
        .send_event(
            false,
            session.root,
            EventMask::SUBSTRUCTURE_NOTIFY | EventMask::SUBSTRUCTURE_REDIRECT,
            event,
        )
        .context(format!("Failed to send _NET_ACTIVE_WINDOW event for window {}", window))?;

    session
        .conn
        .flush()
        .context("Failed to flush X11 connection after window activation")?;
    Ok(())
}

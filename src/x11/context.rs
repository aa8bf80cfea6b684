//! Shared X11 connection and cached atoms

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;

/// One connection to the X server, shared by the hotkey listener thread and
/// the event loop. `RustConnection` is thread-safe, so both sides may issue
/// requests while the listener blocks waiting for events.
pub struct X11Session {
    pub conn: RustConnection,
    pub screen_num: usize,
    pub root: Window,
    pub atoms: CachedAtoms,
}

impl X11Session {
    /// Connect using `$DISPLAY`
    pub fn connect() -> Result<Arc<Self>> {
        let (conn, screen_num) = x11rb::connect(None)
            .context("Failed to connect to X11 server. Is DISPLAY set correctly?")?;

        let screen = &conn.setup().roots[screen_num];
        let root = screen.root;
        info!(
            screen = screen_num,
            width = screen.width_in_pixels,
            height = screen.height_in_pixels,
            "Connected to X11 server"
        );

        let atoms = CachedAtoms::new(&conn).context("Failed to cache X11 atoms at startup")?;

        Ok(Arc::new(Self {
            conn,
            screen_num,
            root,
            atoms,
        }))
    }

    pub fn screen(&self) -> &Screen {
        &self.conn.setup().roots[self.screen_num]
    }
}

/// Pre-cached X11 atoms to avoid repeated roundtrips
pub struct CachedAtoms {
    pub net_wm_pid: Atom,
    pub net_client_list: Atom,
    pub net_active_window: Atom,
    pub net_wm_state: Atom,
    pub net_wm_state_maximized_vert: Atom,
    pub net_wm_state_maximized_horz: Atom,
    pub net_wm_state_fullscreen: Atom,
}

impl CachedAtoms {
    pub fn new(conn: &RustConnection) -> Result<Self> {
        Ok(Self {
            net_wm_pid: intern(conn, b"_NET_WM_PID")?,
            net_client_list: intern(conn, b"_NET_CLIENT_LIST")?,
            net_active_window: intern(conn, b"_NET_ACTIVE_WINDOW")?,
            net_wm_state: intern(conn, b"_NET_WM_STATE")?,
            net_wm_state_maximized_vert: intern(conn, b"_NET_WM_STATE_MAXIMIZED_VERT")?,
            net_wm_state_maximized_horz: intern(conn, b"_NET_WM_STATE_MAXIMIZED_HORZ")?,
            net_wm_state_fullscreen: intern(conn, b"_NET_WM_STATE_FULLSCREEN")?,
        })
    }
}

fn intern(conn: &RustConnection, name: &[u8]) -> Result<Atom> {
    let display_name = String::from_utf8_lossy(name);
    Ok(conn
        .intern_atom(false, name)
        .with_context(|| format!("Failed to intern {} atom", display_name))?
        .reply()
        .with_context(|| format!("Failed to get reply for {} atom", display_name))?
        .atom)
}

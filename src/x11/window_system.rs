//! X11 implementation of the launcher's window-system seam

use anyhow::Result;
use std::sync::Arc;

use super::{X11Session, monitors, window};
use crate::common::geometry::Rect;
use crate::config::WindowMode;
use crate::launcher::{WindowId, WindowSystem};

pub struct X11WindowSystem {
    session: Arc<X11Session>,
}

impl X11WindowSystem {
    pub fn new(session: Arc<X11Session>) -> Self {
        Self { session }
    }
}

impl WindowSystem for X11WindowSystem {
    fn find_window(&self, pid: u32) -> Result<Option<WindowId>> {
        window::find_window_by_pid(&self.session, pid)
    }

    fn pointer_monitor(&self) -> Result<Option<Rect>> {
        let pointer = monitors::pointer_position(&self.session)?;
        let all = monitors::list_monitors(&self.session)?;
        Ok(monitors::monitor_at(&all, pointer).map(|m| m.rect))
    }

    fn move_resize(&self, window: WindowId, rect: Rect) -> Result<()> {
        window::move_resize_window(&self.session, window, rect)
    }

    fn set_mode(&self, window: WindowId, mode: WindowMode) -> Result<()> {
        match mode {
            WindowMode::Maximize => window::maximize_window(&self.session, window),
            WindowMode::Fullscreen => window::fullscreen_window(&self.session, window),
            WindowMode::Normal => Ok(()),
        }
    }

    fn activate(&self, window: WindowId) -> Result<()> {
        window::activate_window(&self.session, window)
    }
}

//! Seams between the launcher and the desktop it drives

use anyhow::Result;
use std::process::Stdio;
use tracing::{debug, info, warn};

use super::command::LaunchCommand;
use crate::common::geometry::Rect;
use crate::config::WindowMode;

/// Opaque window handle on the host window system
pub type WindowId = u32;

/// Window-system operations the launcher needs
pub trait WindowSystem: Send + Sync {
    /// Top-level window owned by `pid`, if it has one yet
    fn find_window(&self, pid: u32) -> Result<Option<WindowId>>;

    /// Bounds of the monitor under the mouse pointer
    fn pointer_monitor(&self) -> Result<Option<Rect>>;

    fn move_resize(&self, window: WindowId, rect: Rect) -> Result<()>;

    fn set_mode(&self, window: WindowId, mode: WindowMode) -> Result<()>;

    /// Raise and focus
    fn activate(&self, window: WindowId) -> Result<()>;
}

/// Starts a process and reports its pid
pub trait ProcessSpawner: Send + Sync {
    fn spawn(&self, command: &LaunchCommand) -> std::io::Result<u32>;
}

/// Spawns real processes through tokio. Must be called inside a runtime.
pub struct SystemSpawner;

impl ProcessSpawner for SystemSpawner {
    fn spawn(&self, command: &LaunchCommand) -> std::io::Result<u32> {
        let mut child = tokio::process::Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            // Own process group: a Ctrl-C aimed at us must not take the terminal down
            .process_group(0)
            .spawn()?;

        let pid = child.id().ok_or_else(|| {
            std::io::Error::other(format!("{} exited before its pid was read", command.program))
        })?;

        // Reap the child so it does not linger as a zombie
        let program = command.program.clone();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => {
                    debug!(pid = pid, program = %program, "Terminal exited");
                }
                Ok(status) => {
                    info!(pid = pid, program = %program, status = %status, "Terminal exited with failure status");
                }
                Err(e) => {
                    warn!(pid = pid, program = %program, error = %e, "Failed to wait for terminal");
                }
            }
        });

        Ok(pid)
    }
}

//! Terminal launcher
//!
//! Spawns the terminal for a session, waits for its window to appear, then
//! places it on the monitor under the pointer. Waiting is a timer loop on the
//! event loop and never blocks it.

pub mod cancel;
pub mod command;
pub mod target;
pub mod window;

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use crate::common::geometry::Dimensions;
use crate::config::{Configuration, WindowMode};
use crate::constants::launch::{NOMINAL_HEIGHT, NOMINAL_WIDTH, POLL_INTERVAL_MS};

pub use cancel::CancelToken;
pub use command::LaunchCommand;
pub use target::ConnectionTarget;
pub use window::{ProcessSpawner, SystemSpawner, WindowId, WindowSystem};

/// Failures that abort a launch
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// What a finished launch observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOutcome {
    pub pid: u32,
    /// `None` when the window did not appear in time or the wait was cancelled
    pub window: Option<WindowId>,
    pub elapsed: Duration,
    pub cancelled: bool,
}

enum WindowWait {
    Found(WindowId),
    TimedOut,
    Cancelled,
}

pub struct Launcher {
    windows: Arc<dyn WindowSystem>,
    spawner: Arc<dyn ProcessSpawner>,
}

impl Launcher {
    pub fn new(windows: Arc<dyn WindowSystem>, spawner: Arc<dyn ProcessSpawner>) -> Self {
        Self { windows, spawner }
    }

    /// Start a terminal for `spec` and place its window.
    ///
    /// Only a failed spawn is an error. A window that never shows up, or a
    /// cancelled wait, still returns `Ok` with no window.
    pub async fn launch(
        &self,
        spec: &str,
        config: &Configuration,
        cancel: &CancelToken,
    ) -> Result<LaunchOutcome, LaunchError> {
        let target = ConnectionTarget::parse(spec);
        let command = LaunchCommand::build(&target, config);
        info!(command = %command, "Starting terminal");

        let pid = self
            .spawner
            .spawn(&command)
            .map_err(|source| LaunchError::Spawn {
                program: command.program.clone(),
                source,
            })?;
        let started = Instant::now();

        let timeout = Duration::from_millis(config.putty_start_timeout_ms);
        let wait = self.wait_for_window(pid, timeout, cancel).await;
        let elapsed = started.elapsed();

        let mut outcome = LaunchOutcome {
            pid,
            window: None,
            elapsed,
            cancelled: false,
        };

        match wait {
            WindowWait::Found(window) => {
                info!(
                    pid = pid,
                    window = window,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Terminal window appeared"
                );
                self.place(window, config.window_mode());
                outcome.window = Some(window);
            }
            WindowWait::TimedOut => {
                warn!(
                    pid = pid,
                    timeout_ms = config.putty_start_timeout_ms,
                    "Terminal window not found in time"
                );
            }
            WindowWait::Cancelled => {
                debug!(pid = pid, "Stopped waiting for terminal window");
                outcome.cancelled = true;
            }
        }

        Ok(outcome)
    }

    async fn wait_for_window(
        &self,
        pid: u32,
        timeout: Duration,
        cancel: &CancelToken,
    ) -> WindowWait {
        let deadline = Instant::now() + timeout;
        let mut ticker = interval(Duration::from_millis(POLL_INTERVAL_MS));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return WindowWait::Cancelled,
                _ = ticker.tick() => {}
            }

            match self.windows.find_window(pid) {
                Ok(Some(window)) => return WindowWait::Found(window),
                Ok(None) => {}
                Err(e) => debug!(pid = pid, error = %e, "Window lookup failed, retrying"),
            }

            if Instant::now() >= deadline {
                return WindowWait::TimedOut;
            }
        }
    }

    /// Center at the nominal size on the pointer's monitor, then apply the
    /// final state, then focus. Failures are logged and skipped.
    fn place(&self, window: WindowId, mode: WindowMode) {
        match self.windows.pointer_monitor() {
            Ok(Some(monitor)) => {
                let rect = monitor.centered(Dimensions::new(NOMINAL_WIDTH, NOMINAL_HEIGHT));
                debug!(window = window, rect = ?rect, "Moving terminal window");
                if let Err(e) = self.windows.move_resize(window, rect) {
                    warn!(window = window, error = %e, "Failed to move terminal window");
                }
            }
            Ok(None) => debug!("No monitor found under pointer, keeping initial placement"),
            Err(e) => warn!(error = %e, "Failed to locate pointer monitor"),
        }

        if mode != WindowMode::Normal
            && let Err(e) = self.windows.set_mode(window, mode)
        {
            warn!(window = window, mode = ?mode, error = %e, "Failed to change terminal window state");
        }

        if let Err(e) = self.windows.activate(window) {
            warn!(window = window, error = %e, "Failed to activate terminal window");
        }
    }
}

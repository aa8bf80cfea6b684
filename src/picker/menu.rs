//! rofi-backed picker surface
//!
//! Runs the menu program in dmenu mode, feeds it one line per session on
//! stdin and reads the chosen line from stdout.

use anyhow::{Context, Result};
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::{MenuEvent, MenuRequest, PickerSurface};
use crate::config::{PickerMonitor, Theme};
use crate::constants::picker::{MONITOR_POINTER, MONITOR_PRIMARY, PROMPT};
use crate::x11::{X11Session, window};

struct RunningMenu {
    generation: u64,
    pid: Option<u32>,
    /// Dropping or firing this kills the menu process
    _close: oneshot::Sender<()>,
}

pub struct RofiMenu {
    events: UnboundedSender<MenuEvent>,
    x11: Option<Arc<X11Session>>,
    running: Option<RunningMenu>,
}

impl RofiMenu {
    /// `x11` is used to raise the menu window; without it raising is a no-op
    pub fn new(events: UnboundedSender<MenuEvent>, x11: Option<Arc<X11Session>>) -> Self {
        Self {
            events,
            x11,
            running: None,
        }
    }
}

impl PickerSurface for RofiMenu {
    fn open(&mut self, request: MenuRequest) -> Result<()> {
        // At most one menu process at a time
        self.running = None;

        let mut child = Command::new(&request.program)
            .args(menu_args(&request))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start picker program '{}'", request.program))?;

        let pid = child.id();
        let mut input = request.lines.join("\n");
        input.push('\n');

        let (close_tx, close_rx) = oneshot::channel();
        let events = self.events.clone();
        let generation = request.generation;

        tokio::spawn(async move {
            let selection = tokio::select! {
                result = run_menu(&mut child, input) => Some(result),
                _ = close_rx => None,
            };

            let selection = match selection {
                Some(Ok(selection)) => selection,
                Some(Err(e)) => {
                    warn!(generation = generation, error = %e, "Picker menu failed");
                    None
                }
                None => {
                    debug!(generation = generation, "Closing picker menu");
                    let _ = child.kill().await;
                    None
                }
            };

            // The receiver is gone only during shutdown
            let _ = events.send(MenuEvent {
                generation,
                selection,
            });
        });

        debug!(generation = generation, pid = ?pid, "Picker menu started");
        self.running = Some(RunningMenu {
            generation,
            pid,
            _close: close_tx,
        });
        Ok(())
    }

    fn bring_to_front(&mut self) -> Result<()> {
        let (Some(running), Some(x11)) = (self.running.as_ref(), self.x11.as_ref()) else {
            return Ok(());
        };
        let Some(pid) = running.pid else {
            return Ok(());
        };

        // rofi's default override-redirect window is not managed and already on top
        match window::find_window_by_pid(x11, pid)? {
            Some(menu_window) => window::activate_window(x11, menu_window),
            None => {
                debug!(generation = running.generation, "Picker window is unmanaged, nothing to raise");
                Ok(())
            }
        }
    }

    fn close(&mut self) {
        // Dropping the sender wakes the task, which kills the process
        self.running = None;
    }
}

/// Write the lines, then wait for the chosen one. Non-zero exit or empty
/// output means the user cancelled.
async fn run_menu(child: &mut Child, input: String) -> std::io::Result<Option<String>> {
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input.as_bytes()).await?;
        // Closing stdin marks the end of the list
        drop(stdin);
    }

    let output = read_all(child.stdout.take()).await?;
    let status = child.wait().await?;

    if !status.success() {
        debug!(status = %status, "Picker menu cancelled");
        return Ok(None);
    }

    let line = output.trim_end_matches(['\r', '\n']);
    Ok((!line.trim().is_empty()).then(|| line.to_string()))
}

async fn read_all(stdout: Option<ChildStdout>) -> std::io::Result<String> {
    let mut buffer = String::new();
    if let Some(mut stdout) = stdout {
        stdout.read_to_string(&mut buffer).await?;
    }
    Ok(buffer)
}

/// Command-line arguments for one rofi invocation
pub fn menu_args(request: &MenuRequest) -> Vec<String> {
    let mut args: Vec<String> = ["-dmenu", "-i", "-no-custom", "-p", PROMPT, "-m"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    args.push(
        match request.monitor {
            PickerMonitor::Cursor => MONITOR_POINTER,
            PickerMonitor::Primary => MONITOR_PRIMARY,
        }
        .to_string(),
    );

    if !request.topmost {
        args.push("-normal-window".to_string());
    }

    if let Some(row) = request.selected_row {
        args.push("-selected-row".to_string());
        args.push(row.to_string());
    }

    args.push("-theme-str".to_string());
    args.push(theme_str(request.theme));
    args
}

/// Inline rofi theme for the resolved palette
pub fn theme_str(theme: Theme) -> String {
    let (background, foreground, selected_background, selected_foreground, border) = match theme {
        Theme::Dark => ("#181818", "#DCDCDC", "#365DAB", "#FFFFFF", "#404040"),
        Theme::Light => ("#FFFFFF", "#000000", "#0078D7", "#FFFFFF", "#B4B4B4"),
    };

    format!(
        "* {{ background-color: {background}; text-color: {foreground}; border-color: {border}; }} \
         element selected.normal {{ background-color: {selected_background}; text-color: {selected_foreground}; }}"
    )
}

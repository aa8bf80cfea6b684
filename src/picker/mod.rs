//! Session picker
//!
//! Keeps at most one menu open at a time and turns the chosen line back into
//! a session. Drawing is delegated to a [`PickerSurface`]; results come back
//! asynchronously as [`MenuEvent`]s tagged with the generation of the menu
//! that produced them.

pub mod menu;

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::{Configuration, PickerMonitor, Session, Theme};
use crate::constants::picker::SEPARATOR;

pub use menu::RofiMenu;

/// Everything a surface needs to show one menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuRequest {
    pub generation: u64,
    pub program: String,
    pub lines: Vec<String>,
    pub selected_row: Option<usize>,
    pub theme: Theme,
    pub monitor: PickerMonitor,
    pub topmost: bool,
}

/// A menu finished. `selection` is `None` when it was cancelled or closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEvent {
    pub generation: u64,
    pub selection: Option<String>,
}

/// Where menus are drawn
pub trait PickerSurface {
    /// Show a menu. The result must eventually arrive as a [`MenuEvent`]
    /// carrying `request.generation`.
    fn open(&mut self, request: MenuRequest) -> Result<()>;

    /// Raise the menu that is already showing
    fn bring_to_front(&mut self) -> Result<()>;

    /// Close the showing menu, if any
    fn close(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Opened,
    BroughtToFront,
}

/// A session chosen in the picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub id: String,
    pub spec: String,
}

struct ActiveMenu {
    generation: u64,
    /// Configuration the menu was built from; selections resolve against it
    config: Arc<Configuration>,
}

pub struct SessionPicker<S: PickerSurface> {
    surface: S,
    active: Option<ActiveMenu>,
    next_generation: u64,
    last_selection: Option<String>,
}

/// Format one picker line
pub fn display_line(session: &Session) -> String {
    format!("{}  {}  {}", session.id, SEPARATOR, session.spec)
}

/// Recover the id from a picker line: everything before the first separator,
/// trimmed. An id that itself contains the separator is cut short.
pub fn resolve_id(line: &str) -> &str {
    line.split(SEPARATOR).next().unwrap_or_default().trim()
}

impl<S: PickerSurface> SessionPicker<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            active: None,
            next_generation: 1,
            last_selection: None,
        }
    }

    #[allow(dead_code)]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Open the picker, or raise it if one is already showing
    pub fn activate(&mut self, config: Arc<Configuration>, theme: Theme) -> Result<Activation> {
        if self.active.is_some() {
            if let Err(e) = self.surface.bring_to_front() {
                debug!(error = %e, "Failed to raise picker");
            }
            return Ok(Activation::BroughtToFront);
        }

        let generation = self.next_generation;
        self.next_generation += 1;

        let lines: Vec<String> = config.sessions.iter().map(display_line).collect();
        let selected_row = if config.remember_last_selection {
            self.last_selection
                .as_deref()
                .and_then(|id| config.sessions.position(id))
        } else {
            None
        };

        let request = MenuRequest {
            generation,
            program: config.picker_program.clone(),
            lines,
            selected_row,
            theme,
            monitor: config.picker_monitor,
            topmost: config.picker_topmost,
        };

        self.surface.open(request)?;
        debug!(generation = generation, sessions = config.sessions.len(), "Picker opened");

        self.active = Some(ActiveMenu { generation, config });
        Ok(Activation::Opened)
    }

    /// Handle a finished menu. Returns the session to launch, if one was chosen.
    pub fn handle_menu_event(&mut self, event: MenuEvent) -> Option<LaunchRequest> {
        let active = match self.active.take() {
            Some(active) if active.generation == event.generation => active,
            other => {
                debug!(generation = event.generation, "Ignoring result from a superseded picker");
                self.active = other;
                return None;
            }
        };

        let line = event.selection?;
        let id = resolve_id(&line);

        let Some(session) = active.config.sessions.get(id) else {
            warn!(id = %id, "Selected picker line does not match any session");
            return None;
        };

        info!(id = %session.id, "Session selected");
        if active.config.remember_last_selection {
            self.last_selection = Some(session.id.clone());
        }

        Some(LaunchRequest {
            id: session.id.clone(),
            spec: session.spec.clone(),
        })
    }

    /// Close the open picker without selecting anything
    pub fn dismiss(&mut self) {
        if let Some(active) = self.active.take() {
            debug!(generation = active.generation, "Picker dismissed");
            self.surface.close();
        }
    }
}

//! System tray icon integration
//!
//! The tray runs on ksni's own task and only ever sends [`AppCommand`]s to the
//! event loop; state it displays is pushed back through the handle.

use ksni::TrayMethods;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info};

use super::AppCommand;
use crate::constants::app;

pub type TrayHandle = ksni::Handle<SessionTray>;

pub struct SessionTray {
    pub commands: UnboundedSender<AppCommand>,
    pub autostart_enabled: bool,
    pub hotkey: String,
}

impl SessionTray {
    fn send(&self, command: AppCommand) {
        // Fails only while the event loop is shutting down
        let _ = self.commands.send(command);
    }
}

impl ksni::Tray for SessionTray {
    fn id(&self) -> String {
        app::NAME.into()
    }

    fn icon_name(&self) -> String {
        "utilities-terminal".into()
    }

    fn title(&self) -> String {
        app::TITLE.into()
    }

    fn tool_tip(&self) -> ksni::ToolTip {
        ksni::ToolTip {
            title: format!("{} {}", app::TITLE, env!("CARGO_PKG_VERSION")),
            description: format!("Open sessions with {}", self.hotkey),
            ..Default::default()
        }
    }

    /// Left click opens the picker
    fn activate(&mut self, _x: i32, _y: i32) {
        self.send(AppCommand::OpenPicker);
    }

    fn menu(&self) -> Vec<ksni::MenuItem<Self>> {
        use ksni::menu::*;

        vec![
            StandardItem {
                label: "Open".into(),
                activate: Box::new(|this: &mut SessionTray| this.send(AppCommand::OpenPicker)),
                ..Default::default()
            }
            .into(),
            StandardItem {
                label: "Reload config".into(),
                activate: Box::new(|this: &mut SessionTray| this.send(AppCommand::ReloadConfig)),
                ..Default::default()
            }
            .into(),
            StandardItem {
                label: "Open location".into(),
                activate: Box::new(|this: &mut SessionTray| this.send(AppCommand::OpenLocation)),
                ..Default::default()
            }
            .into(),
            CheckmarkItem {
                label: "Run at startup".into(),
                checked: self.autostart_enabled,
                activate: Box::new(|this: &mut SessionTray| {
                    this.send(AppCommand::ToggleAutostart)
                }),
                ..Default::default()
            }
            .into(),
            StandardItem {
                label: "About...".into(),
                activate: Box::new(|this: &mut SessionTray| this.send(AppCommand::About)),
                ..Default::default()
            }
            .into(),
            MenuItem::Separator,
            StandardItem {
                label: "Exit".into(),
                activate: Box::new(|this: &mut SessionTray| this.send(AppCommand::Quit)),
                ..Default::default()
            }
            .into(),
        ]
    }
}

/// Register the tray icon. Returns `None` when no StatusNotifier host is
/// reachable; the daemon keeps working through the hotkey alone.
pub async fn spawn_tray(tray: SessionTray) -> Option<TrayHandle> {
    let is_flatpak = std::env::var("FLATPAK_ID").is_ok();

    let result = if is_flatpak {
        info!("Running in Flatpak: spawning tray without D-Bus name");
        tray.spawn_without_dbus_name().await
    } else {
        tray.spawn().await
    };

    match result {
        Ok(handle) => {
            info!("Tray icon created via ksni/D-Bus");
            Some(handle)
        }
        Err(e) => {
            error!(error = ?e, "Failed to create tray icon (D-Bus unavailable?)");
            None
        }
    }
}

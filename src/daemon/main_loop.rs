//! Event loop wiring hotkey, picker, launcher and tray together

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::instance;
use super::tray::{SessionTray, TrayHandle, spawn_tray};
use crate::common::notify::{NotifyLevel, notify, should_show};
use crate::config::{
    ConfigStore, EnvironmentSnapshot, KeyPress, ThemeMode, autostart, resolve_theme,
};
use crate::constants::{app, paths};
use crate::input::{GrabHost, HotkeyBroker, X11GrabHost, spawn_listener};
use crate::launcher::{CancelToken, Launcher, SystemSpawner};
use crate::picker::{Activation, LaunchRequest, MenuEvent, PickerSurface, RofiMenu, SessionPicker};
use crate::x11::{X11Session, X11WindowSystem};

/// Requests from the tray and the hotkey callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    OpenPicker,
    ReloadConfig,
    OpenLocation,
    ToggleAutostart,
    About,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Where user-facing notifications go
pub type NotifySink = Arc<dyn Fn(NotifyLevel, String) + Send + Sync>;

pub struct Daemon<H: GrabHost, S: PickerSurface> {
    store: ConfigStore,
    broker: HotkeyBroker<H>,
    picker: SessionPicker<S>,
    launcher: Arc<Launcher>,
    cancel: CancelToken,
    launches: JoinSet<()>,
    tray: Option<TrayHandle>,
    notify: NotifySink,
}

impl<H: GrabHost, S: PickerSurface> Daemon<H, S> {
    pub fn new(
        store: ConfigStore,
        broker: HotkeyBroker<H>,
        picker: SessionPicker<S>,
        launcher: Arc<Launcher>,
        notify: NotifySink,
    ) -> Self {
        Self {
            store,
            broker,
            picker,
            launcher,
            cancel: CancelToken::new(),
            launches: JoinSet::new(),
            tray: None,
            notify,
        }
    }

    fn notify(&self, level: NotifyLevel, body: impl Into<String>) {
        if should_show(level, self.store.snapshot().show_notifications) {
            (self.notify)(level, body.into());
        }
    }

    /// Route hotkey presses to the picker
    pub fn subscribe_hotkey(&mut self, commands: mpsc::UnboundedSender<AppCommand>) {
        self.broker.on_pressed(Box::new(move |binding| {
            debug!(binding = %binding.display_name(), "Hotkey pressed");
            let _ = commands.send(AppCommand::OpenPicker);
        }));
    }

    /// Claim the configured hotkey. Failure is reported and tolerated.
    pub fn register_hotkey(&mut self) -> bool {
        let hotkey = self.store.snapshot().hotkey.clone();
        if self.broker.register_global(&hotkey) {
            return true;
        }

        warn!(hotkey = %hotkey, "Hotkey registration failed");
        self.notify(NotifyLevel::Warning, "Hotkey is already in use.");
        false
    }

    pub fn handle_key(&mut self, press: &KeyPress) {
        self.broker.dispatch(press);
    }

    pub async fn handle_command(&mut self, command: AppCommand) -> Flow {
        debug!(command = ?command, "Handling command");
        match command {
            AppCommand::OpenPicker => self.open_picker().await,
            AppCommand::ReloadConfig => self.reload().await,
            AppCommand::OpenLocation => self.open_location(),
            AppCommand::ToggleAutostart => self.toggle_autostart().await,
            AppCommand::About => self.about(),
            AppCommand::Quit => return Flow::Exit,
        }
        Flow::Continue
    }

    async fn open_picker(&mut self) {
        let config = self.store.snapshot();
        let environment = if config.theme == ThemeMode::Auto {
            EnvironmentSnapshot::capture().await
        } else {
            None
        };
        let theme = resolve_theme(config.theme, environment.as_ref());

        match self.picker.activate(config, theme) {
            Ok(Activation::Opened) => debug!(theme = ?theme, "Picker opened"),
            Ok(Activation::BroughtToFront) => debug!("Picker already open, raised it"),
            Err(e) => {
                error!(error = %e, "Failed to open picker");
                self.notify(NotifyLevel::Error, format!("Failed to open the session picker.\n\n{:#}", e));
            }
        }
    }

    pub fn handle_menu_event(&mut self, event: MenuEvent) {
        if let Some(request) = self.picker.handle_menu_event(event) {
            self.start_launch(request);
        }
    }

    fn start_launch(&mut self, request: LaunchRequest) {
        let launcher = Arc::clone(&self.launcher);
        let config = self.store.snapshot();
        let cancel = self.cancel.clone();
        let notify = Arc::clone(&self.notify);

        self.launches.spawn(async move {
            match launcher.launch(&request.spec, &config, &cancel).await {
                Ok(outcome) => debug!(
                    id = %request.id,
                    pid = outcome.pid,
                    window = ?outcome.window,
                    cancelled = outcome.cancelled,
                    "Launch finished"
                ),
                Err(e) => {
                    error!(id = %request.id, error = %e, "Launch error");
                    notify(NotifyLevel::Error, format!("Failed to start PuTTY.\n\n{}", e));
                }
            }
        });
    }

    /// Re-read the file and apply it. The hotkey is rebound only when its
    /// text changed, and an open picker is closed so it cannot show stale
    /// sessions.
    async fn reload(&mut self) {
        let (previous, report) = self.store.reload();
        let current = self.store.snapshot();

        if !previous.hotkey.eq_ignore_ascii_case(&current.hotkey) {
            if self.broker.rebind(&current.hotkey) {
                info!(hotkey = %current.hotkey, "Hotkey rebind succeeded");
            } else {
                warn!(hotkey = %current.hotkey, "Hotkey rebind failed");
                self.notify(NotifyLevel::Warning, "Hotkey is already in use.");
            }
        }

        self.picker.dismiss();

        if let Some(tray) = &self.tray {
            let hotkey = current.hotkey.clone();
            tray.update(move |tray: &mut SessionTray| tray.hotkey = hotkey).await;
        }

        info!(
            sessions = current.sessions.len(),
            issues = report.issues.len(),
            "Configuration reloaded"
        );
        self.notify(NotifyLevel::Info, "Configuration reloaded.");
    }

    fn open_location(&self) {
        let directory = self.store.directory();
        match tokio::process::Command::new(paths::OPENER)
            .arg(&directory)
            .spawn()
        {
            Ok(mut child) => {
                // Reap in the background
                tokio::spawn(async move {
                    let _ = child.wait().await;
                });
            }
            Err(e) => {
                warn!(path = %directory.display(), error = %e, "Open location failed");
                self.notify(
                    NotifyLevel::Warning,
                    format!("Unable to open location.\n\n{}", e),
                );
            }
        }
    }

    async fn toggle_autostart(&mut self) {
        let enable = !autostart::is_enabled();
        if !autostart::set_enabled(enable) {
            self.notify(NotifyLevel::Warning, "Unable to update Run at startup.");
            return;
        }

        info!(enabled = enable, "Run at startup updated");
        if let Some(tray) = &self.tray {
            tray.update(move |tray: &mut SessionTray| tray.autostart_enabled = enable)
                .await;
        }
    }

    fn about(&self) {
        let config = self.store.snapshot();
        let body = format!(
            "{} {}\nLightweight launcher for quick opening of PuTTY SSH sessions via a global hotkey ({}).",
            app::TITLE,
            env!("CARGO_PKG_VERSION"),
            config.hotkey
        );
        // Explicitly requested, so shown regardless of show_notifications
        (self.notify)(NotifyLevel::Info, body);
    }

    /// Stop waiting launches, close the picker, release the hotkey and the tray
    pub async fn shutdown(mut self) {
        info!("Shutting down");
        self.cancel.cancel();
        self.picker.dismiss();
        self.broker.unregister();

        if let Some(tray) = self.tray.take() {
            tray.shutdown().await;
        }

        while self.launches.join_next().await.is_some() {}
        info!("Shutdown complete");
    }
}

/// Create the autostart entry when the configuration asks for it and it is missing
fn sync_autostart(run_at_startup: bool) {
    if run_at_startup && !autostart::is_enabled() {
        if autostart::set_enabled(true) {
            info!("Created autostart entry");
        } else {
            warn!("Failed to create autostart entry");
        }
    }
}

/// Run the hotkey daemon until Exit, Ctrl-C or SIGTERM
pub async fn run_daemon(store: ConfigStore) -> Result<()> {
    let config = store.snapshot();

    let _instance = if config.single_instance {
        match instance::acquire(&instance::default_lock_path())? {
            Some(lock) => {
                debug!(path = %lock.path().display(), "Holding single-instance lock");
                Some(lock)
            }
            None => {
                info!("Another instance is already running, exiting");
                return Ok(());
            }
        }
    } else {
        None
    };

    sync_autostart(config.run_at_startup);

    let session = X11Session::connect()?;

    let (key_tx, mut key_rx) = mpsc::channel::<KeyPress>(16);
    let (command_tx, mut command_rx) = mpsc::unbounded_channel();
    let (menu_tx, mut menu_rx) = mpsc::unbounded_channel();

    let launcher = Arc::new(Launcher::new(
        Arc::new(X11WindowSystem::new(Arc::clone(&session))),
        Arc::new(SystemSpawner),
    ));
    let notify_sink: NotifySink = Arc::new(|level: NotifyLevel, body: String| notify(level, body));

    let mut daemon = Daemon::new(
        store,
        HotkeyBroker::new(X11GrabHost::new(Arc::clone(&session))),
        SessionPicker::new(RofiMenu::new(menu_tx, Some(Arc::clone(&session)))),
        launcher,
        notify_sink,
    );

    daemon.subscribe_hotkey(command_tx.clone());
    daemon.register_hotkey();
    let _listener = spawn_listener(Arc::clone(&session), key_tx);

    daemon.tray = spawn_tray(SessionTray {
        commands: command_tx,
        autostart_enabled: autostart::is_enabled(),
        hotkey: config.hotkey.clone(),
    })
    .await;

    let mut sigint = signal(SignalKind::interrupt()).context("Failed to register SIGINT handler")?;
    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to register SIGTERM handler")?;

    info!(hotkey = %config.hotkey, sessions = config.sessions.len(), "Daemon running");

    loop {
        tokio::select! {
            _ = sigint.recv() => {
                info!("Received SIGINT");
                break;
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
                break;
            }
            Some(press) = key_rx.recv() => daemon.handle_key(&press),
            Some(command) = command_rx.recv() => {
                if daemon.handle_command(command).await == Flow::Exit {
                    break;
                }
            }
            Some(event) = menu_rx.recv() => daemon.handle_menu_event(event),
            Some(finished) = daemon.launches.join_next(), if !daemon.launches.is_empty() => {
                if let Err(e) = finished {
                    error!(error = %e, "Launch task panicked");
                }
            }
        }
    }

    daemon.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::geometry::Rect;
    use crate::config::{HotkeyBinding, WindowMode};
    use crate::input::backend::GrabError;
    use crate::input::broker::BrokerState;
    use crate::launcher::{LaunchCommand, ProcessSpawner, WindowId, WindowSystem};
    use crate::picker::MenuRequest;
    use std::sync::Mutex;

    #[derive(Default, Clone)]
    struct RecordingHost {
        grabs: Arc<Mutex<Vec<String>>>,
        /// Combinations another client already owns
        claimed: Arc<Mutex<Vec<String>>>,
    }

    impl GrabHost for RecordingHost {
        fn grab(&mut self, binding: &HotkeyBinding) -> Result<(), GrabError> {
            let name = binding.display_name();
            if self.claimed.lock().unwrap().contains(&name) {
                return Err(GrabError::AlreadyClaimed(name));
            }
            self.grabs.lock().unwrap().push(name);
            Ok(())
        }

        fn ungrab(&mut self, _binding: &HotkeyBinding) -> Result<(), GrabError> {
            Ok(())
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    #[derive(Default, Clone)]
    struct RecordingSurface {
        opened: Arc<Mutex<Vec<MenuRequest>>>,
        closed: Arc<Mutex<usize>>,
    }

    impl PickerSurface for RecordingSurface {
        fn open(&mut self, request: MenuRequest) -> Result<()> {
            self.opened.lock().unwrap().push(request);
            Ok(())
        }

        fn bring_to_front(&mut self) -> Result<()> {
            Ok(())
        }

        fn close(&mut self) {
            *self.closed.lock().unwrap() += 1;
        }
    }

    struct NoWindows;

    impl WindowSystem for NoWindows {
        fn find_window(&self, _pid: u32) -> Result<Option<WindowId>> {
            Ok(None)
        }
        fn pointer_monitor(&self) -> Result<Option<Rect>> {
            Ok(None)
        }
        fn move_resize(&self, _window: WindowId, _rect: Rect) -> Result<()> {
            Ok(())
        }
        fn set_mode(&self, _window: WindowId, _mode: WindowMode) -> Result<()> {
            Ok(())
        }
        fn activate(&self, _window: WindowId) -> Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingSpawner {
        commands: Mutex<Vec<LaunchCommand>>,
        fail: bool,
    }

    impl ProcessSpawner for RecordingSpawner {
        fn spawn(&self, command: &LaunchCommand) -> std::io::Result<u32> {
            self.commands.lock().unwrap().push(command.clone());
            if self.fail {
                return Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
            }
            Ok(4242)
        }
    }

    struct Harness {
        daemon: Daemon<RecordingHost, RecordingSurface>,
        host: RecordingHost,
        surface: RecordingSurface,
        spawner: Arc<RecordingSpawner>,
        notifications: Arc<Mutex<Vec<(NotifyLevel, String)>>>,
        path: std::path::PathBuf,
        _dir: tempfile::TempDir,
    }

    fn harness(contents: &str, spawner: RecordingSpawner) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session-launcher.conf");
        std::fs::write(&path, contents).unwrap();
        let (store, _report) = ConfigStore::load_or_create(&path);

        let host = RecordingHost::default();
        let surface = RecordingSurface::default();
        let spawner = Arc::new(spawner);
        let notifications = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&notifications);
        let notify: NotifySink =
            Arc::new(move |level: NotifyLevel, body: String| sink.lock().unwrap().push((level, body)));

        let daemon = Daemon::new(
            store,
            HotkeyBroker::new(host.clone()),
            SessionPicker::new(surface.clone()),
            Arc::new(Launcher::new(Arc::new(NoWindows), spawner.clone())),
            notify,
        );

        Harness {
            daemon,
            host,
            surface,
            spawner,
            notifications,
            path,
            _dir: dir,
        }
    }

    const CONFIG: &str = "hotkey = Ctrl+Alt+P\ntheme = dark\nputty_start_timeout_ms = 0\n\
                          [sessions]\nweb = \"deploy@web01:2222\"\n";

    #[tokio::test]
    async fn test_hotkey_press_opens_single_picker() {
        let mut h = harness(CONFIG, RecordingSpawner::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        h.daemon.subscribe_hotkey(tx);
        assert!(h.daemon.register_hotkey());

        let press = HotkeyBinding::parse_lenient("Ctrl+Alt+P");
        h.daemon.handle_key(&press);
        h.daemon.handle_key(&press);

        for _ in 0..2 {
            let command = rx.recv().await.unwrap();
            assert_eq!(h.daemon.handle_command(command).await, Flow::Continue);
        }

        let opened = h.surface.opened.lock().unwrap();
        assert_eq!(opened.len(), 1);
        assert_eq!(opened[0].lines, vec!["web  —  deploy@web01:2222"]);
    }

    #[tokio::test]
    async fn test_selection_launches_terminal() {
        let mut h = harness(CONFIG, RecordingSpawner::default());
        h.daemon.handle_command(AppCommand::OpenPicker).await;

        let request = h.surface.opened.lock().unwrap()[0].clone();
        h.daemon.handle_menu_event(MenuEvent {
            generation: request.generation,
            selection: Some(request.lines[0].clone()),
        });

        while h.daemon.launches.join_next().await.is_some() {}

        let commands = h.spawner.commands.lock().unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].args, vec!["-ssh", "deploy@web01", "-P", "2222"]);
    }

    #[tokio::test]
    async fn test_spawn_failure_notifies_even_when_disabled() {
        let config = format!("show_notifications = false\n{}", CONFIG);
        let mut h = harness(
            &config,
            RecordingSpawner {
                fail: true,
                ..RecordingSpawner::default()
            },
        );
        h.daemon.handle_command(AppCommand::OpenPicker).await;
        let request = h.surface.opened.lock().unwrap()[0].clone();
        h.daemon.handle_menu_event(MenuEvent {
            generation: request.generation,
            selection: Some(request.lines[0].clone()),
        });
        while h.daemon.launches.join_next().await.is_some() {}

        let notifications = h.notifications.lock().unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].0, NotifyLevel::Error);
        assert!(notifications[0].1.starts_with("Failed to start PuTTY."));
    }

    #[tokio::test]
    async fn test_reload_rebinds_only_on_hotkey_change() {
        let mut h = harness(CONFIG, RecordingSpawner::default());
        h.daemon.register_hotkey();

        // Same hotkey in different case: no rebind
        std::fs::write(&h.path, CONFIG.replace("Ctrl+Alt+P", "ctrl+alt+p")).unwrap();
        h.daemon.handle_command(AppCommand::ReloadConfig).await;
        assert_eq!(*h.host.grabs.lock().unwrap(), vec!["Ctrl+Alt+P"]);

        std::fs::write(&h.path, CONFIG.replace("Ctrl+Alt+P", "Ctrl+Shift+K")).unwrap();
        h.daemon.handle_command(AppCommand::ReloadConfig).await;
        assert_eq!(*h.host.grabs.lock().unwrap(), vec!["Ctrl+Alt+P", "Ctrl+Shift+K"]);

        let notifications = h.notifications.lock().unwrap();
        assert_eq!(notifications.len(), 2);
        assert!(notifications.iter().all(|(_, body)| body == "Configuration reloaded."));
    }

    #[tokio::test]
    async fn test_claimed_hotkey_warns_once_and_keeps_running() {
        let mut h = harness(CONFIG, RecordingSpawner::default());
        h.host.claimed.lock().unwrap().push("Ctrl+Alt+P".to_string());

        assert!(!h.daemon.register_hotkey());
        assert_eq!(h.daemon.broker.state(), BrokerState::Unregistered);
        assert_eq!(
            *h.notifications.lock().unwrap(),
            vec![(NotifyLevel::Warning, "Hotkey is already in use.".to_string())]
        );

        // The tray still works without a hotkey
        assert_eq!(h.daemon.handle_command(AppCommand::OpenPicker).await, Flow::Continue);
        assert_eq!(h.surface.opened.lock().unwrap().len(), 1);
        assert_eq!(h.notifications.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_claimed_hotkey_is_silent_when_notifications_off() {
        let config = format!("show_notifications = false\n{}", CONFIG);
        let mut h = harness(&config, RecordingSpawner::default());
        h.host.claimed.lock().unwrap().push("Ctrl+Alt+P".to_string());

        assert!(!h.daemon.register_hotkey());
        assert_eq!(h.daemon.broker.state(), BrokerState::Unregistered);
        assert!(h.notifications.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_rebind_on_reload_warns_and_unregisters() {
        let mut h = harness(CONFIG, RecordingSpawner::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        h.daemon.subscribe_hotkey(tx);
        assert!(h.daemon.register_hotkey());

        h.host.claimed.lock().unwrap().push("Ctrl+Shift+K".to_string());
        std::fs::write(&h.path, CONFIG.replace("Ctrl+Alt+P", "Ctrl+Shift+K")).unwrap();
        assert_eq!(h.daemon.handle_command(AppCommand::ReloadConfig).await, Flow::Continue);

        assert_eq!(h.daemon.broker.state(), BrokerState::Unregistered);
        assert_eq!(
            *h.notifications.lock().unwrap(),
            vec![
                (NotifyLevel::Warning, "Hotkey is already in use.".to_string()),
                (NotifyLevel::Info, "Configuration reloaded.".to_string()),
            ]
        );

        // Neither the old nor the new combination reaches the picker
        h.daemon.handle_key(&HotkeyBinding::parse_lenient("Ctrl+Alt+P"));
        h.daemon.handle_key(&HotkeyBinding::parse_lenient("Ctrl+Shift+K"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_reload_closes_open_picker() {
        let mut h = harness(CONFIG, RecordingSpawner::default());
        h.daemon.handle_command(AppCommand::OpenPicker).await;

        h.daemon.handle_command(AppCommand::ReloadConfig).await;
        assert_eq!(*h.surface.closed.lock().unwrap(), 1);

        h.daemon.handle_command(AppCommand::OpenPicker).await;
        assert_eq!(h.surface.opened.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_about_always_notifies() {
        let config = format!("show_notifications = false\n{}", CONFIG);
        let mut h = harness(&config, RecordingSpawner::default());
        h.daemon.handle_command(AppCommand::About).await;

        let notifications = h.notifications.lock().unwrap();
        assert_eq!(notifications.len(), 1);
        assert!(notifications[0].1.contains("(Ctrl+Alt+P)"));
    }

    #[tokio::test]
    async fn test_quit_and_shutdown() {
        let mut h = harness(CONFIG, RecordingSpawner::default());
        h.daemon.register_hotkey();
        h.daemon.handle_command(AppCommand::OpenPicker).await;

        assert_eq!(h.daemon.handle_command(AppCommand::Quit).await, Flow::Exit);

        let closed = Arc::clone(&h.surface.closed);
        h.daemon.shutdown().await;
        assert_eq!(*closed.lock().unwrap(), 1);
    }
}

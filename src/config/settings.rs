//! Configuration value and its enumerations

use serde::Serialize;

use super::sessions::SessionTable;
use crate::constants::defaults;

/// Requested color theme for the picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Auto,
    Light,
    Dark,
}

impl ThemeMode {
    /// Lenient parse: anything other than `light`/`dark` means auto
    pub fn from_config_str(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "dark" => Self::Dark,
            "light" => Self::Light,
            _ => Self::Auto,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// Which monitor the picker opens on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PickerMonitor {
    /// Monitor containing the mouse pointer
    #[default]
    Cursor,
    /// Primary monitor
    Primary,
}

impl PickerMonitor {
    pub fn from_config_str(value: &str) -> Self {
        if value.eq_ignore_ascii_case("primary") {
            Self::Primary
        } else {
            Self::Cursor
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cursor => "cursor",
            Self::Primary => "primary",
        }
    }
}

/// Final window state requested for a launched terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMode {
    Maximize,
    Fullscreen,
    /// Keep the centered nominal placement
    Normal,
}

impl WindowMode {
    /// Interpret the free-form `fullscreen_mode` value. Unknown values maximize.
    pub fn from_config_str(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "fullscreen" => Self::Fullscreen,
            "none" | "normal" | "off" => Self::Normal,
            _ => Self::Maximize,
        }
    }
}

/// Log file settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogSettings {
    pub enabled: bool,
    pub level: String,
    pub max_files: u32,
    pub max_size_kb: u64,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            enabled: defaults::log::ENABLED,
            level: defaults::log::LEVEL.to_string(),
            max_files: defaults::log::MAX_FILES,
            max_size_kb: defaults::log::MAX_SIZE_KB,
        }
    }
}

/// Complete application configuration.
///
/// Immutable once built; reloading produces a new value that replaces the old
/// one wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Configuration {
    pub hotkey: String,
    pub theme: ThemeMode,
    pub single_instance: bool,
    pub show_notifications: bool,

    pub putty_path: String,
    pub fullscreen_mode: String,
    pub putty_start_timeout_ms: u64,

    pub picker_topmost: bool,
    pub picker_monitor: PickerMonitor,
    pub picker_program: String,
    pub remember_last_selection: bool,

    pub run_at_startup: bool,

    pub logging: LogSettings,

    pub sessions: SessionTable,
}

impl Configuration {
    pub fn window_mode(&self) -> WindowMode {
        WindowMode::from_config_str(&self.fullscreen_mode)
    }

    /// Executable to spawn, falling back to the bare name when unset
    pub fn terminal_executable(&self) -> &str {
        if self.putty_path.trim().is_empty() {
            crate::constants::launch::DEFAULT_EXECUTABLE
        } else {
            &self.putty_path
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            hotkey: defaults::HOTKEY.to_string(),
            theme: ThemeMode::Auto,
            single_instance: defaults::SINGLE_INSTANCE,
            show_notifications: defaults::SHOW_NOTIFICATIONS,
            putty_path: String::new(),
            fullscreen_mode: defaults::FULLSCREEN_MODE.to_string(),
            putty_start_timeout_ms: defaults::START_TIMEOUT_MS,
            picker_topmost: defaults::PICKER_TOPMOST,
            picker_monitor: PickerMonitor::Cursor,
            picker_program: defaults::PICKER_PROGRAM.to_string(),
            remember_last_selection: defaults::REMEMBER_LAST_SELECTION,
            run_at_startup: defaults::RUN_AT_STARTUP,
            logging: LogSettings::default(),
            sessions: SessionTable::new(),
        }
    }
}

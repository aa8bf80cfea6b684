//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// Application identity
pub mod app {
    /// Name used for the tray id, notifications and autostart entry
    pub const NAME: &str = "session-launcher";

    /// Human-readable title
    pub const TITLE: &str = "Session Launcher";
}

/// X11 protocol constants
pub mod x11 {
    /// Size of PID property value in bytes
    pub const PID_PROPERTY_SIZE: usize = 4;

    /// Source indication for _NET_ACTIVE_WINDOW (2 = pager/direct user action)
    pub const ACTIVE_WINDOW_SOURCE_PAGER: u32 = 2;

    /// _NET_WM_STATE action: add/set property (1)
    pub const NET_WM_STATE_ADD: u32 = 1;

    /// Offset between Linux input key codes and X11 keycodes
    pub const EVDEV_KEYCODE_OFFSET: u16 = 8;
}

/// Input constants (Linux input-event-codes.h)
pub mod input {
    /// Key code for the P key, used when a hotkey names an unknown key
    pub const KEY_P: u16 = 25;
}

/// Terminal launch constants
pub mod launch {
    /// Executable used when `putty_path` is blank
    pub const DEFAULT_EXECUTABLE: &str = "putty";

    /// Flag selecting the SSH protocol
    pub const SSH_FLAG: &str = "-ssh";

    /// Flag preceding the port number
    pub const PORT_FLAG: &str = "-P";

    /// Interval between window lookups while waiting for the terminal
    pub const POLL_INTERVAL_MS: u64 = 50;

    /// Nominal size used for the initial placement before maximizing
    pub const NOMINAL_WIDTH: u32 = 800;
    pub const NOMINAL_HEIGHT: u32 = 600;
}

/// Session picker constants
pub mod picker {
    /// Separator between id and spec in a picker line
    pub const SEPARATOR: char = '—';

    /// Prompt shown by the menu program
    pub const PROMPT: &str = "session";

    /// rofi monitor argument: the monitor that shows the mouse pointer
    pub const MONITOR_POINTER: &str = "-5";

    /// rofi monitor argument: the primary output
    pub const MONITOR_PRIMARY: &str = "primary";

    /// Settings tool queried for the desktop color scheme
    pub const THEME_PROBE_PROGRAM: &str = "gsettings";

    /// Upper bound on the color-scheme query before falling back
    pub const THEME_PROBE_TIMEOUT_MS: u64 = 500;
}

/// System paths
pub mod paths {
    /// Opener used for "Open location"
    pub const OPENER: &str = "xdg-open";

    /// Lock file guarding against a second instance
    pub const LOCK_FILE: &str = "session-launcher.lock";

    /// Autostart directory under XDG config
    pub const AUTOSTART_DIR: &str = "autostart";

    /// Autostart desktop entry filename
    pub const AUTOSTART_FILE: &str = "session-launcher.desktop";
}

/// Configuration paths and filenames
pub mod config {
    /// Application directory name under XDG config/state
    pub const APP_DIR: &str = "session-launcher";

    /// Configuration filename
    pub const FILENAME: &str = "session-launcher.conf";

    /// Id of the example session written by the template
    pub const EXAMPLE_SESSION_ID: &str = "example";

    /// Spec of the example session written by the template
    pub const EXAMPLE_SESSION_SPEC: &str = "admin@10.0.0.15";
}

/// Log file constants
pub mod logging {
    /// Active log filename
    pub const FILENAME: &str = "session-launcher.log";

    /// Prefix of rotated log files
    pub const ROTATED_PREFIX: &str = "session-launcher_";

    /// Timestamp format appended to rotated files
    pub const ROTATED_TIMESTAMP: &str = "%Y%m%d_%H%M%S";
}

/// Desktop notification durations
pub mod notifications {
    pub const WARNING_TIMEOUT_MS: u32 = 3000;
    pub const INFO_TIMEOUT_MS: u32 = 2000;
    pub const ERROR_TIMEOUT_MS: u32 = 6000;
}

/// Default configuration values
/// These are used for missing or unparsable config fields
pub mod defaults {
    pub const HOTKEY: &str = "Ctrl+Alt+P";
    pub const SINGLE_INSTANCE: bool = true;
    pub const SHOW_NOTIFICATIONS: bool = true;
    pub const FULLSCREEN_MODE: &str = "maximize";
    pub const START_TIMEOUT_MS: u64 = 4000;
    pub const PICKER_TOPMOST: bool = true;
    pub const PICKER_PROGRAM: &str = "rofi";
    pub const REMEMBER_LAST_SELECTION: bool = true;
    pub const RUN_AT_STARTUP: bool = false;

    /// Log file settings
    pub mod log {
        pub const ENABLED: bool = true;
        pub const LEVEL: &str = "info";
        pub const MAX_FILES: u32 = 3;
        pub const MAX_SIZE_KB: u64 = 256;
    }
}

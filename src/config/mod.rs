//! Configuration management
//!
//! Handles the line-oriented configuration file: parsing, the commented
//! template, and the atomically swapped snapshot used by the daemon.

pub mod autostart;
pub mod hotkey_binding;
pub mod parser;
pub mod sessions;
pub mod settings;
pub mod store;
pub mod template;
pub mod theme;

pub use hotkey_binding::{HotkeyBinding, KeyPress};
pub use sessions::Session;
pub use settings::{Configuration, LogSettings, PickerMonitor, ThemeMode, WindowMode};
pub use store::{ConfigStore, LoadReport};
pub use template::generate_default_template;
pub use theme::{EnvironmentSnapshot, Theme, resolve_theme};

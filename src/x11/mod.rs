//! X11 utilities and cached state
//!
//! Provides the shared connection, window management helpers, and monitor
//! queries used by the hotkey backend, the launcher and the picker.

mod context;
pub mod monitors;
pub mod window;
mod window_system;

pub use context::X11Session;
pub use window_system::X11WindowSystem;

//! Global hotkey capture

pub mod backend;
pub mod broker;
pub mod x11_backend;

pub use backend::GrabHost;
pub use broker::HotkeyBroker;
pub use x11_backend::{X11GrabHost, spawn_listener};

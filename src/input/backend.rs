//! Hotkey host abstraction layer
//!
//! A host is whatever can claim a key combination system-wide on behalf of
//! this process. The broker only talks to this trait, which keeps the
//! register/rebind state machine independent of X11.

use thiserror::Error;

use crate::config::HotkeyBinding;

/// Why a grab could not be established or released
#[derive(Debug, Error)]
pub enum GrabError {
    /// Another client already owns the combination
    #[error("key combination {0} is already grabbed by another client")]
    AlreadyClaimed(String),

    /// The binding has no representation on this host
    #[error("key combination {0} cannot be mapped on this display")]
    Unmappable(String),

    /// Any other host failure
    #[error(transparent)]
    Host(#[from] anyhow::Error),
}

/// Hotkey host trait
pub trait GrabHost {
    /// Claim the combination exclusively. Must leave nothing grabbed on failure.
    fn grab(&mut self, binding: &HotkeyBinding) -> Result<(), GrabError>;

    /// Release a combination previously claimed with [`GrabHost::grab`]
    fn ungrab(&mut self, binding: &HotkeyBinding) -> Result<(), GrabError>;

    /// Get human-readable host name
    fn name(&self) -> &'static str;
}

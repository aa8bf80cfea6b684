//! Hotkey daemon - runs in background waiting for the picker hotkey

mod instance;
mod main_loop;
mod tray;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::config::ConfigStore;
use crate::launcher::{CancelToken, Launcher, SystemSpawner};
use crate::x11::{X11Session, X11WindowSystem};

pub use main_loop::{AppCommand, run_daemon};

/// Launch one session by id without starting the daemon
pub async fn launch_once(store: &ConfigStore, id: &str) -> Result<()> {
    let config = store.snapshot();
    let session = config
        .sessions
        .get(id)
        .with_context(|| format!("No session named '{}' in {:?}", id, store.path()))?;

    let x11 = X11Session::connect()?;
    let launcher = Launcher::new(
        Arc::new(X11WindowSystem::new(x11)),
        Arc::new(SystemSpawner),
    );

    let outcome = launcher
        .launch(&session.spec, &config, &CancelToken::new())
        .await?;

    info!(
        id = %session.id,
        pid = outcome.pid,
        placed = outcome.window.is_some(),
        elapsed_ms = outcome.elapsed.as_millis() as u64,
        "Launched session"
    );
    Ok(())
}

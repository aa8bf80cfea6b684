//! Single-instance guard
//!
//! An exclusive advisory lock on a file in the runtime directory. The lock is
//! released by the kernel when the process exits, so a crash never leaves a
//! stale lock behind.

use anyhow::{Context, Result};
use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::paths;

/// Held for the lifetime of the daemon
pub struct InstanceLock {
    _lock: Flock<File>,
    path: PathBuf,
}

impl InstanceLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Default lock location: `$XDG_RUNTIME_DIR`, else the temp directory
pub fn default_lock_path() -> PathBuf {
    dirs::runtime_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(paths::LOCK_FILE)
}

/// Take the lock. `Ok(None)` means another instance holds it.
pub fn acquire(path: &Path) -> Result<Option<InstanceLock>> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)
        .with_context(|| format!("Failed to open lock file {:?}", path))?;

    match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
        Ok(lock) => {
            debug!(path = %path.display(), "Acquired single-instance lock");
            Ok(Some(InstanceLock {
                _lock: lock,
                path: path.to_path_buf(),
            }))
        }
        Err((_, Errno::EWOULDBLOCK)) => Ok(None),
        Err((_, errno)) => {
            Err(errno).with_context(|| format!("Failed to lock {:?}", path))
        }
    }
}

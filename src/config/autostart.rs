//! XDG autostart entry for running at login
//!
//! Both operations swallow errors: callers only learn whether the entry is
//! present and whether a toggle succeeded.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::constants::{app, paths};

/// Path of the autostart desktop entry
pub fn entry_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(paths::AUTOSTART_DIR).join(paths::AUTOSTART_FILE))
}

/// Whether the autostart entry exists
pub fn is_enabled() -> bool {
    entry_path().is_some_and(|path| is_enabled_at(&path))
}

/// Create or remove the autostart entry. Returns false on any failure.
pub fn set_enabled(enable: bool) -> bool {
    let Some(path) = entry_path() else {
        warn!("No XDG config directory, cannot change autostart");
        return false;
    };
    let exe = match std::env::current_exe() {
        Ok(exe) => exe,
        Err(e) => {
            warn!(error = %e, "Failed to resolve own executable for autostart");
            return false;
        }
    };
    set_enabled_at(&path, &exe, enable)
}

fn is_enabled_at(path: &Path) -> bool {
    fs::read_to_string(path)
        .map(|contents| !contents.contains("Hidden=true"))
        .unwrap_or(false)
}

fn set_enabled_at(path: &Path, exe: &Path, enable: bool) -> bool {
    let result = if enable {
        path.parent()
            .map(fs::create_dir_all)
            .unwrap_or(Ok(()))
            .and_then(|_| fs::write(path, desktop_entry(exe)))
    } else {
        match fs::remove_file(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    };

    match result {
        Ok(()) => {
            debug!(path = %path.display(), enable, "Updated autostart entry");
            true
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to update autostart entry");
            false
        }
    }
}

fn desktop_entry(exe: &Path) -> String {
    format!(
        "[Desktop Entry]\nType=Application\nName={}\nExec=\"{}\"\nX-GNOME-Autostart-enabled=true\nNoDisplay=true\n",
        app::TITLE,
        exe.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_entry() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("autostart").join("launcher.desktop");
        let exe = Path::new("/usr/bin/session-launcher");

        assert!(!is_enabled_at(&path));

        assert!(set_enabled_at(&path, exe, true));
        assert!(is_enabled_at(&path));
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("Exec=\"/usr/bin/session-launcher\""));

        assert!(set_enabled_at(&path, exe, false));
        assert!(!is_enabled_at(&path));

        // Removing an absent entry is not a failure
        assert!(set_enabled_at(&path, exe, false));
    }

    #[test]
    fn test_hidden_entry_counts_as_disabled() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("launcher.desktop");
        fs::write(&path, "[Desktop Entry]\nHidden=true\n").unwrap();
        assert!(!is_enabled_at(&path));
    }
}

//! Theme resolution
//!
//! `auto` is resolved against a snapshot of the desktop environment. The
//! snapshot is captured separately so the resolution itself stays pure.

use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use super::settings::ThemeMode;
use crate::constants::picker::{THEME_PROBE_PROGRAM, THEME_PROBE_TIMEOUT_MS};

/// Concrete theme used for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

/// Desktop appearance hints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentSnapshot {
    /// `org.gnome.desktop.interface color-scheme`, e.g. `'prefer-dark'`
    pub color_scheme: Option<String>,
    /// `GTK_THEME` environment variable, e.g. `Adwaita:dark`
    pub gtk_theme: Option<String>,
}

impl EnvironmentSnapshot {
    /// Probe the running desktop. Returns `None` when nothing could be read.
    pub async fn capture() -> Option<Self> {
        let gtk_theme = std::env::var("GTK_THEME").ok();
        let color_scheme = query_color_scheme(
            THEME_PROBE_PROGRAM,
            Duration::from_millis(THEME_PROBE_TIMEOUT_MS),
        )
        .await;

        debug!(?color_scheme, ?gtk_theme, "Captured desktop theme hints");

        if color_scheme.is_none() && gtk_theme.is_none() {
            None
        } else {
            Some(Self {
                color_scheme,
                gtk_theme,
            })
        }
    }

    fn prefers_dark(&self) -> Option<bool> {
        if let Some(scheme) = &self.color_scheme {
            let scheme = scheme.trim_matches('\'').to_lowercase();
            if scheme.contains("dark") {
                return Some(true);
            }
            if scheme.contains("light") || scheme == "default" {
                return Some(false);
            }
        }
        self.gtk_theme.as_ref().map(|theme| {
            let theme = theme.to_lowercase();
            theme.ends_with(":dark") || theme.contains("-dark")
        })
    }
}

/// Ask the settings tool for the color scheme. A hung or missing tool yields `None`.
async fn query_color_scheme(program: &str, timeout: Duration) -> Option<String> {
    let query = Command::new(program)
        .args(["get", "org.gnome.desktop.interface", "color-scheme"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(timeout, query).await {
        Ok(Ok(output)) if output.status.success() => {
            let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
            (!value.is_empty()).then_some(value)
        }
        Ok(Ok(_)) => None,
        Ok(Err(e)) => {
            debug!(program = %program, error = %e, "Color scheme query failed");
            None
        }
        Err(_) => {
            debug!(program = %program, "Color scheme query timed out");
            None
        }
    }
}

/// Explicit modes win; `auto` follows the snapshot and defaults to light
pub fn resolve_theme(mode: ThemeMode, snapshot: Option<&EnvironmentSnapshot>) -> Theme {
    match mode {
        ThemeMode::Light => Theme::Light,
        ThemeMode::Dark => Theme::Dark,
        ThemeMode::Auto => match snapshot.and_then(EnvironmentSnapshot::prefers_dark) {
            Some(true) => Theme::Dark,
            _ => Theme::Light,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_modes_ignore_environment() {
        let dark_env = EnvironmentSnapshot {
            color_scheme: Some("'prefer-dark'".into()),
            gtk_theme: None,
        };
        assert_eq!(resolve_theme(ThemeMode::Light, Some(&dark_env)), Theme::Light);
        assert_eq!(resolve_theme(ThemeMode::Dark, None), Theme::Dark);
    }

    #[test]
    fn test_auto_without_probe_is_light() {
        assert_eq!(resolve_theme(ThemeMode::Auto, None), Theme::Light);
        assert_eq!(
            resolve_theme(ThemeMode::Auto, Some(&EnvironmentSnapshot::default())),
            Theme::Light
        );
    }

    #[test]
    fn test_auto_follows_color_scheme() {
        let env = EnvironmentSnapshot {
            color_scheme: Some("'prefer-dark'".into()),
            gtk_theme: Some("Adwaita".into()),
        };
        assert_eq!(resolve_theme(ThemeMode::Auto, Some(&env)), Theme::Dark);

        let env = EnvironmentSnapshot {
            color_scheme: Some("'default'".into()),
            gtk_theme: Some("Adwaita:dark".into()),
        };
        assert_eq!(resolve_theme(ThemeMode::Auto, Some(&env)), Theme::Light);
    }

    /// Executable script standing in for the settings tool
    fn fake_settings_tool(dir: &tempfile::TempDir, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.path().join("fake-gsettings");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn test_color_scheme_query_reads_output() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_settings_tool(&dir, "echo \"'prefer-dark'\"");

        let scheme = query_color_scheme(&tool, Duration::from_secs(5)).await;
        assert_eq!(scheme.as_deref(), Some("'prefer-dark'"));
    }

    #[tokio::test]
    async fn test_hung_color_scheme_query_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_settings_tool(&dir, "exec sleep 30");

        let started = std::time::Instant::now();
        let scheme = query_color_scheme(&tool, Duration::from_millis(100)).await;
        assert_eq!(scheme, None);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_failed_or_missing_query_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_settings_tool(&dir, "echo dark; exit 1");
        assert_eq!(query_color_scheme(&tool, Duration::from_secs(5)).await, None);

        let missing = query_color_scheme("/nonexistent/gsettings", Duration::from_secs(5)).await;
        assert_eq!(missing, None);
    }

    #[test]
    fn test_auto_falls_back_to_gtk_theme() {
        let env = EnvironmentSnapshot {
            color_scheme: None,
            gtk_theme: Some("Adwaita:dark".into()),
        };
        assert_eq!(resolve_theme(ThemeMode::Auto, Some(&env)), Theme::Dark);

        let env = EnvironmentSnapshot {
            color_scheme: None,
            gtk_theme: Some("Arc-Dark".into()),
        };
        assert_eq!(resolve_theme(ThemeMode::Auto, Some(&env)), Theme::Dark);
    }
}

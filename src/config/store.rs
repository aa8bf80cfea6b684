//! Configuration file persistence and the current snapshot
//!
//! Readers call [`ConfigStore::snapshot`] and always receive a complete
//! [`Configuration`]; [`ConfigStore::reload`] parses the file again and swaps
//! the snapshot atomically.

use arc_swap::ArcSwap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::parser::{ParseIssue, parse_with_issues};
use super::settings::Configuration;
use super::template::generate_default_template;

/// Where the loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    /// File existed and was parsed
    Loaded,
    /// File was missing; defaults were written as a template
    Created,
    /// File was missing and the template could not be written
    CreateFailed(String),
    /// File could not be read; all defaults are in effect
    Unreadable(String),
}

/// Outcome of reading the configuration file
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub path: PathBuf,
    pub source: LoadSource,
    pub issues: Vec<ParseIssue>,
}

impl LoadReport {
    /// Emit the report through tracing
    pub fn log(&self) {
        match &self.source {
            LoadSource::Loaded => info!(path = %self.path.display(), "Loaded configuration"),
            LoadSource::Created => {
                info!(path = %self.path.display(), "Config file not found, created default config")
            }
            LoadSource::CreateFailed(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "Config file not found and default could not be written, using defaults"
            ),
            LoadSource::Unreadable(e) => error!(
                path = %self.path.display(),
                error = %e,
                "Failed to read config, using defaults"
            ),
        }
        for issue in &self.issues {
            warn!(path = %self.path.display(), "Config: {}", issue);
        }
    }
}

pub struct ConfigStore {
    path: PathBuf,
    current: ArcSwap<Configuration>,
}

impl ConfigStore {
    /// Default configuration path under the XDG config directory
    pub fn default_path() -> PathBuf {
        #[cfg(not(test))]
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        #[cfg(test)]
        let mut path = std::env::temp_dir().join("session-launcher-test");

        path.push(crate::constants::config::APP_DIR);
        path.push(crate::constants::config::FILENAME);
        path
    }

    /// Read the file at `path`, creating it from the default template when missing.
    ///
    /// Never fails: every error degrades to defaults and is described in the report.
    pub fn load_or_create(path: impl Into<PathBuf>) -> (Self, LoadReport) {
        let path = path.into();
        let (config, report) = read_config(&path);
        let store = Self {
            path,
            current: ArcSwap::from_pointee(config),
        };
        (store, report)
    }

    /// Current configuration snapshot
    pub fn snapshot(&self) -> Arc<Configuration> {
        self.current.load_full()
    }

    /// Parse the file again and replace the snapshot wholesale.
    ///
    /// Returns the previous snapshot alongside the report.
    pub fn reload(&self) -> (Arc<Configuration>, LoadReport) {
        let (config, report) = read_config(&self.path);
        report.log();
        let previous = self.current.swap(Arc::new(config));
        (previous, report)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the configuration file
    pub fn directory(&self) -> PathBuf {
        self.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn read_config(path: &Path) -> (Configuration, LoadReport) {
    if !path.exists() {
        let config = Configuration::default();
        let source = match write_template(path, &config) {
            Ok(()) => LoadSource::Created,
            Err(e) => LoadSource::CreateFailed(format!("{:#}", e)),
        };
        return (
            config,
            LoadReport {
                path: path.to_path_buf(),
                source,
                issues: Vec::new(),
            },
        );
    }

    match fs::read_to_string(path) {
        Ok(text) => {
            let (config, issues) = parse_with_issues(&text);
            (
                config,
                LoadReport {
                    path: path.to_path_buf(),
                    source: LoadSource::Loaded,
                    issues,
                },
            )
        }
        Err(e) => (
            Configuration::default(),
            LoadReport {
                path: path.to_path_buf(),
                source: LoadSource::Unreadable(e.to_string()),
                issues: Vec::new(),
            },
        ),
    }
}

fn write_template(path: &Path, config: &Configuration) -> anyhow::Result<()> {
    use anyhow::Context;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {:?}", parent))?;
    }
    fs::write(path, generate_default_template(config))
        .with_context(|| format!("Failed to write config to {:?}", path))?;
    Ok(())
}

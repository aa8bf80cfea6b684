//! Logging setup
//!
//! Everything goes to stderr. When `log_enabled` is set, the same events are
//! also appended (without ANSI colors) to a size-rotated file in the state
//! directory.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LogSettings;
use crate::constants::{config, logging};

/// Directory for log files: `$XDG_STATE_HOME/session-launcher`
pub fn log_directory() -> Option<PathBuf> {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|dir| dir.join(config::APP_DIR))
}

/// Filter directive: `RUST_LOG` wins, then `--debug`, then the configured level
fn build_filter(settings: &LogSettings, debug: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let level = if debug { "debug" } else { settings.level.trim() };
    EnvFilter::try_new(level.to_lowercase()).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Returns the log file path when file logging is on.
pub fn init(settings: &LogSettings, debug: bool) -> Result<Option<PathBuf>> {
    let filter = build_filter(settings, debug);

    let stderr_layer = fmt::layer().with_writer(io::stderr).with_target(false);

    let mut file_path = None;
    let file_layer = if settings.enabled {
        match log_directory().map(|dir| RotatingWriter::open(&dir, settings)) {
            Some(Ok(writer)) => {
                file_path = Some(writer.active_path());
                Some(
                    fmt::layer()
                        .with_ansi(false)
                        .with_target(false)
                        .with_writer(Mutex::new(writer)),
                )
            }
            Some(Err(e)) => {
                eprintln!("Failed to open log file: {}", e);
                None
            }
            None => None,
        }
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to set tracing subscriber")?;

    Ok(file_path)
}

/// Append-only log file that is renamed with a timestamp once it grows past
/// the size limit. Only the newest `max_files` rotated files are kept.
pub struct RotatingWriter {
    directory: PathBuf,
    file: File,
    written: u64,
    max_bytes: u64,
    max_files: u32,
}

impl RotatingWriter {
    pub fn open(directory: &Path, settings: &LogSettings) -> io::Result<Self> {
        fs::create_dir_all(directory)?;
        let path = directory.join(logging::FILENAME);
        let file = open_append(&path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            directory: directory.to_path_buf(),
            file,
            written,
            max_bytes: settings.max_size_kb.saturating_mul(1024),
            max_files: settings.max_files,
        })
    }

    pub fn active_path(&self) -> PathBuf {
        self.directory.join(logging::FILENAME)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        let stamp = chrono::Local::now()
            .format(logging::ROTATED_TIMESTAMP)
            .to_string();
        let mut rotated = self
            .directory
            .join(format!("{}{}.log", logging::ROTATED_PREFIX, stamp));
        let mut counter = 1;
        while rotated.exists() {
            rotated = self
                .directory
                .join(format!("{}{}_{}.log", logging::ROTATED_PREFIX, stamp, counter));
            counter += 1;
        }

        let active = self.active_path();
        fs::rename(&active, &rotated)?;
        self.file = open_append(&active)?;
        self.written = 0;

        prune_rotated(&self.directory, self.max_files)
    }
}

impl Write for RotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.max_bytes > 0
            && self.written > 0
            && self.written + buf.len() as u64 > self.max_bytes
            && let Err(e) = self.rotate()
        {
            // Keep writing to the current file
            eprintln!("Log rotation failed: {}", e);
        }

        let written = self.file.write(buf)?;
        self.written += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Rotated files sorted oldest first
fn rotated_files(directory: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(directory)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| {
                    name.starts_with(logging::ROTATED_PREFIX) && name.ends_with(".log")
                })
        })
        .collect();
    files.sort();
    Ok(files)
}

fn prune_rotated(directory: &Path, max_files: u32) -> io::Result<()> {
    let files = rotated_files(directory)?;
    let excess = files.len().saturating_sub(max_files as usize);
    for path in &files[..excess] {
        fs::remove_file(path)?;
    }
    Ok(())
}

#![deny(unsafe_code)]

mod common;
mod config;
mod constants;
mod daemon;
mod input;
mod launcher;
mod logging;
mod picker;
mod x11;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use config::{ConfigStore, Configuration, generate_default_template};

#[derive(Parser)]
#[command(name = "session-launcher")]
#[command(version)]
#[command(about = "Open PuTTY SSH sessions from a global hotkey", long_about = None)]
struct Cli {
    /// Configuration file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(long)]
    debug: bool,

    /// Print the default configuration template and exit
    #[arg(long, conflicts_with_all = ["check", "launch"])]
    print_template: bool,

    /// Parse the configuration, print problems and the result, then exit
    #[arg(long, conflicts_with = "launch")]
    check: bool,

    /// Launch one session by id without starting the hotkey daemon
    #[arg(long, value_name = "ID")]
    launch: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_template {
        print!("{}", generate_default_template(&Configuration::default()));
        return Ok(());
    }

    let path = cli.config.clone().unwrap_or_else(ConfigStore::default_path);
    let (store, report) = ConfigStore::load_or_create(path);

    if cli.check {
        return print_check(&store, &report);
    }

    // Logging settings come from the file, so it is read before the subscriber exists
    let config = store.snapshot();
    let log_file = logging::init(&config.logging, cli.debug)?;
    report.log();
    if let Some(log_file) = log_file {
        info!(path = %log_file.display(), "Logging to file");
    }

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    match cli.launch {
        Some(id) => rt.block_on(daemon::launch_once(&store, &id)),
        None => {
            info!(version = env!("CARGO_PKG_VERSION"), "Starting session launcher");
            common::debug::log_system_info(&config);
            rt.block_on(daemon::run_daemon(store))
        }
    }
}

fn print_check(store: &ConfigStore, report: &config::LoadReport) -> Result<()> {
    println!("# {}", store.path().display());
    match &report.source {
        config::store::LoadSource::Loaded => {}
        other => println!("# {:?}", other),
    }
    for issue in &report.issues {
        println!("# {}", issue);
    }

    let json = serde_json::to_string_pretty(store.snapshot().as_ref())
        .context("Failed to serialize configuration")?;
    println!("{}", json);
    Ok(())
}

use std::process::Command;
use tracing::{info, warn};

use crate::config::Configuration;

/// Log system information for debugging purposes
pub fn log_system_info(config: &Configuration) {
    info!("=== System Information ===");

    if let Ok(kernel) = get_command_output("uname", &["-sr"]) {
        info!("Kernel: {}", kernel);
    }

    if let Ok(os_release) = std::fs::read_to_string("/etc/os-release") {
        for line in os_release.lines() {
            if line.starts_with("PRETTY_NAME=") {
                let name = line.trim_start_matches("PRETTY_NAME=").trim_matches('"');
                info!("OS: {}", name);
                break;
            }
        }
    }

    // Desktop Environment / Window Manager hints
    if let Ok(session) = std::env::var("XDG_SESSION_TYPE") {
        info!("Session Type: {}", session);
        if session.eq_ignore_ascii_case("wayland") {
            warn!("Running under Wayland: global hotkeys only reach XWayland clients");
        }
    }
    if let Ok(desktop) = std::env::var("XDG_CURRENT_DESKTOP") {
        info!("Desktop Environment: {}", desktop);
    }
    if let Ok(display_name) = std::env::var("DISPLAY") {
        info!("Display: {}", display_name);
    }

    // External programs the daemon depends on
    for program in [config.terminal_executable(), config.picker_program.as_str()] {
        match get_command_output("which", &[program]) {
            Ok(path) if !path.is_empty() => info!("Found {}: {}", program, path),
            _ => warn!("{} not found on PATH", program),
        }
    }

    info!("==========================");
}

fn get_command_output(cmd: &str, args: &[&str]) -> anyhow::Result<String> {
    let output = Command::new(cmd).args(args).output()?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

//! Commented configuration template
//!
//! Produces a human-editable document for a given [`Configuration`]. Comments
//! always sit on their own lines because the parser treats everything after
//! `=` as the value.

use std::fmt::Write;

use super::settings::Configuration;
use crate::constants::config::{EXAMPLE_SESSION_ID, EXAMPLE_SESSION_SPEC};

/// Render the configuration as a commented template, followed by an example session
pub fn generate_default_template(c: &Configuration) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_template(&mut out, c);
    out
}

fn write_template(out: &mut String, c: &Configuration) -> std::fmt::Result {
    writeln!(out, "# {} configuration", crate::constants::app::TITLE)?;
    writeln!(out, "#")?;
    writeln!(out, "# One `key = value` per line. Values may be quoted.")?;
    writeln!(out, "# Unknown keys are ignored, invalid numbers fall back to defaults.")?;
    writeln!(out)?;

    writeln!(out, "# --- Application ---")?;
    writeln!(out, "# Global hotkey, modifiers joined with '+': Ctrl, Alt, Shift, Win")?;
    writeln!(out, "hotkey = \"{}\"", c.hotkey)?;
    writeln!(out, "# auto | light | dark")?;
    writeln!(out, "theme = \"{}\"", c.theme.as_str())?;
    writeln!(out, "single_instance = {}", c.single_instance)?;
    writeln!(out, "show_notifications = {}", c.show_notifications)?;
    writeln!(out)?;

    writeln!(out, "# --- Terminal ---")?;
    writeln!(out, "# Path to the putty executable (empty = look up 'putty' on PATH)")?;
    writeln!(out, "putty_path = \"{}\"", c.putty_path)?;
    writeln!(out, "# maximize | fullscreen | none")?;
    writeln!(out, "fullscreen_mode = \"{}\"", c.fullscreen_mode)?;
    writeln!(out, "# How long to wait for the terminal window, in milliseconds")?;
    writeln!(out, "putty_start_timeout_ms = {}", c.putty_start_timeout_ms)?;
    writeln!(out)?;

    writeln!(out, "# --- Picker ---")?;
    writeln!(out, "picker_topmost = {}", c.picker_topmost)?;
    writeln!(out, "# cursor | primary")?;
    writeln!(out, "picker_monitor = \"{}\"", c.picker_monitor.as_str())?;
    writeln!(out, "# Menu program run in dmenu mode")?;
    writeln!(out, "picker_program = \"{}\"", c.picker_program)?;
    writeln!(out, "remember_last_selection = {}", c.remember_last_selection)?;
    writeln!(out)?;

    writeln!(out, "# --- Autostart ---")?;
    writeln!(out, "run_at_startup = {}", c.run_at_startup)?;
    writeln!(out)?;

    writeln!(out, "# --- Logging ---")?;
    writeln!(out, "log_enabled = {}", c.logging.enabled)?;
    writeln!(out, "# error | warn | info | debug | trace")?;
    writeln!(out, "log_level = \"{}\"", c.logging.level)?;
    writeln!(out, "log_max_files = {}", c.logging.max_files)?;
    writeln!(out, "log_max_size_kb = {}", c.logging.max_size_kb)?;
    writeln!(out)?;

    writeln!(out, "# --- Sessions ---")?;
    writeln!(out, "# id = \"user@host\" or id = \"user@host:port\"")?;
    writeln!(out, "[sessions]")?;
    for session in &c.sessions {
        writeln!(out, "{} = \"{}\"", session.id, session.spec)?;
    }
    if !c.sessions.contains(EXAMPLE_SESSION_ID) {
        writeln!(out, "{} = \"{}\"", EXAMPLE_SESSION_ID, EXAMPLE_SESSION_SPEC)?;
    }

    Ok(())
}

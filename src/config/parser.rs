//! Line-oriented configuration parser
//!
//! The format is forgiving by design of its callers: every problem is
//! recovered locally and parsing always yields a usable [`Configuration`].
//! Recovered problems are reported as [`ParseIssue`]s so they can be logged.

use std::fmt;

use super::settings::{Configuration, PickerMonitor, ThemeMode};
use crate::constants::defaults;

/// A recovered problem on a specific line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// 1-based line number
    pub line: usize,
    pub kind: IssueKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// Line has no `=` separator
    MissingSeparator,
    /// Section header other than `[sessions]`
    UnknownSection(String),
    /// Top-level key that is not recognized
    UnknownKey(String),
    /// Integer value that did not parse; default used instead
    InvalidInteger { key: String, value: String },
    /// Session line with an empty id
    EmptySessionId,
    /// Session id already defined earlier (compared case-insensitively)
    DuplicateSession(String),
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: ", self.line)?;
        match &self.kind {
            IssueKind::MissingSeparator => write!(f, "expected `key = value`, line skipped"),
            IssueKind::UnknownSection(name) => write!(f, "unknown section [{}]", name),
            IssueKind::UnknownKey(key) => write!(f, "unknown key '{}' ignored", key),
            IssueKind::InvalidInteger { key, value } => {
                write!(f, "'{}' is not a valid integer for {}, using default", value, key)
            }
            IssueKind::EmptySessionId => write!(f, "session without an id skipped"),
            IssueKind::DuplicateSession(id) => {
                write!(f, "duplicate session '{}' ignored, first definition kept", id)
            }
        }
    }
}

/// Parse configuration text. Never fails.
pub fn parse(text: &str) -> Configuration {
    parse_with_issues(text).0
}

/// Parse configuration text and return the problems that were recovered from
pub fn parse_with_issues(text: &str) -> (Configuration, Vec<ParseIssue>) {
    let mut config = Configuration::default();
    let mut issues = Vec::new();
    let mut in_sessions = false;

    for (idx, raw) in text.split('\n').enumerate() {
        let line_no = idx + 1;
        let line = raw.trim_end_matches('\r').trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') && line.len() >= 2 {
            let name = line[1..line.len() - 1].trim();
            in_sessions = name.eq_ignore_ascii_case("sessions");
            if !in_sessions {
                issues.push(ParseIssue {
                    line: line_no,
                    kind: IssueKind::UnknownSection(name.to_string()),
                });
            }
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            issues.push(ParseIssue {
                line: line_no,
                kind: IssueKind::MissingSeparator,
            });
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        if in_sessions {
            if key.is_empty() {
                issues.push(ParseIssue {
                    line: line_no,
                    kind: IssueKind::EmptySessionId,
                });
            } else if !config.sessions.insert_first(key, unquote(value)) {
                issues.push(ParseIssue {
                    line: line_no,
                    kind: IssueKind::DuplicateSession(key.to_string()),
                });
            }
            continue;
        }

        if let Some(kind) = apply_key(&mut config, key, value) {
            issues.push(ParseIssue {
                line: line_no,
                kind,
            });
        }
    }

    (config, issues)
}

/// Apply one top-level `key = value`, returning an issue when recovery was needed
fn apply_key(config: &mut Configuration, key: &str, value: &str) -> Option<IssueKind> {
    let mut issue = None;
    let mut int_or_default = |default: u64| -> u64 {
        parse_int(value).unwrap_or_else(|| {
            issue = Some(IssueKind::InvalidInteger {
                key: key.to_string(),
                value: value.to_string(),
            });
            default
        })
    };

    match key.to_lowercase().as_str() {
        "hotkey" => config.hotkey = unquote(value).to_string(),
        "theme" => config.theme = ThemeMode::from_config_str(unquote(value)),
        "single_instance" => config.single_instance = parse_bool(value),
        "show_notifications" => config.show_notifications = parse_bool(value),

        "putty_path" => config.putty_path = unquote(value).to_string(),
        "fullscreen_mode" => config.fullscreen_mode = unquote(value).to_string(),
        "putty_start_timeout_ms" => {
            config.putty_start_timeout_ms = int_or_default(defaults::START_TIMEOUT_MS)
        }

        "picker_topmost" => config.picker_topmost = parse_bool(value),
        "picker_monitor" => config.picker_monitor = PickerMonitor::from_config_str(unquote(value)),
        "picker_program" => config.picker_program = unquote(value).to_string(),
        "remember_last_selection" => config.remember_last_selection = parse_bool(value),

        "run_at_startup" => config.run_at_startup = parse_bool(value),

        "log_enabled" => config.logging.enabled = parse_bool(value),
        "log_level" => config.logging.level = unquote(value).to_string(),
        "log_max_files" => {
            config.logging.max_files = u32::try_from(int_or_default(
                defaults::log::MAX_FILES as u64,
            ))
            .unwrap_or(defaults::log::MAX_FILES)
        }
        "log_max_size_kb" => config.logging.max_size_kb = int_or_default(defaults::log::MAX_SIZE_KB),

        _ => return Some(IssueKind::UnknownKey(key.to_string())),
    }

    issue
}

/// Strip one pair of matching single or double quotes
pub fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn trim_quotes(value: &str) -> &str {
    value.trim().trim_matches(|c| c == '"' || c == '\'')
}

/// `true` only for the literal `true` (any case), quotes allowed
pub fn parse_bool(value: &str) -> bool {
    trim_quotes(value).eq_ignore_ascii_case("true")
}

/// Non-negative integer, quotes allowed
pub fn parse_int(value: &str) -> Option<u64> {
    trim_quotes(value).trim().parse().ok()
}

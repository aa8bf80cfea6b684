//! Hotkey binding text parsing and key code mapping

use evdev::KeyCode;
use std::str::FromStr;

use crate::constants::input::KEY_P;

/// A keyboard hotkey binding with modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HotkeyBinding {
    /// evdev key code (e.g., KEY_P = 25, KEY_F1 = 59)
    pub key_code: u16,

    /// Control key pressed
    pub ctrl: bool,

    /// Shift key pressed
    pub shift: bool,

    /// Alt key pressed
    pub alt: bool,

    /// Super/Windows key pressed
    pub super_key: bool,
}

/// A key press observed by a hotkey host, already translated to evdev codes
pub type KeyPress = HotkeyBinding;

impl HotkeyBinding {
    /// Create a new hotkey binding
    pub fn new(key_code: u16, ctrl: bool, shift: bool, alt: bool, super_key: bool) -> Self {
        Self {
            key_code,
            ctrl,
            shift,
            alt,
            super_key,
        }
    }

    /// Parse text such as `Ctrl+Alt+P`.
    ///
    /// Never fails. Tokens are split on `+` and matched case-insensitively
    /// against the modifier names; any other token names the key. A key name
    /// that cannot be resolved leaves the key unchanged, and the key starts out
    /// as `P`, so `Ctrl+Bogus` binds `Ctrl+P` and `Ctrl+Q+Bogus` binds `Ctrl+Q`.
    pub fn parse_lenient(text: &str) -> Self {
        let mut binding = Self::new(KEY_P, false, false, false, false);

        for token in text.split('+').map(str::trim).filter(|t| !t.is_empty()) {
            match token.to_lowercase().as_str() {
                "ctrl" | "control" => binding.ctrl = true,
                "alt" => binding.alt = true,
                "shift" => binding.shift = true,
                "win" | "windows" | "super" | "meta" => binding.super_key = true,
                _ => {
                    if let Some(code) = key_name_to_code(token) {
                        binding.key_code = code;
                    }
                }
            }
        }

        binding
    }

    /// Get human-readable display name for this binding
    pub fn display_name(&self) -> String {
        let mut parts = Vec::new();

        if self.ctrl {
            parts.push("Ctrl".to_string());
        }
        if self.shift {
            parts.push("Shift".to_string());
        }
        if self.alt {
            parts.push("Alt".to_string());
        }
        if self.super_key {
            parts.push("Super".to_string());
        }

        parts.push(key_code_to_name(self.key_code));

        parts.join("+")
    }

    /// Check if this binding matches an observed key press
    pub fn matches(&self, press: &KeyPress) -> bool {
        self == press
    }
}

/// Resolve a user-facing key name (`P`, `f5`, `Space`, `Escape`, `D1`,
/// `KEY_TAB`) to an evdev key code
pub fn key_name_to_code(name: &str) -> Option<u16> {
    let upper = name.trim().to_uppercase();
    let linux_name = if upper.starts_with("KEY_") {
        upper
    } else {
        format!("KEY_{}", key_alias(&upper).unwrap_or(upper))
    };

    KeyCode::from_str(&linux_name).ok().map(|key| key.code())
}

/// Map Windows-style key names to their evdev spelling
fn key_alias(upper: &str) -> Option<String> {
    let alias = match upper {
        "ESCAPE" => "ESC",
        "BACK" => "BACKSPACE",
        "RETURN" => "ENTER",
        "PRINTSCREEN" | "SNAPSHOT" => "SYSRQ",
        "PRIOR" => "PAGEUP",
        "NEXT" => "PAGEDOWN",
        "CAPITAL" => "CAPSLOCK",
        "SCROLL" => "SCROLLLOCK",
        "MULTIPLY" => "KPASTERISK",
        "ADD" => "KPPLUS",
        "SUBTRACT" => "KPMINUS",
        "DIVIDE" => "KPSLASH",
        "DECIMAL" => "KPDOT",
        _ => {
            // D0-D9 are the top-row digits, NumPad0-NumPad9 the keypad
            let digit = |rest: &str| {
                (rest.len() == 1 && rest.as_bytes()[0].is_ascii_digit()).then(|| rest.to_string())
            };
            if let Some(rest) = upper.strip_prefix("NUMPAD") {
                return digit(rest).map(|d| format!("KP{}", d));
            }
            return upper.strip_prefix('D').and_then(digit);
        }
    };
    Some(alias.to_string())
}

/// Convert evdev key code to human-readable name
pub fn key_code_to_name(code: u16) -> String {
    let linux_name = format!("{:?}", KeyCode(code));
    let name = linux_name.strip_prefix("KEY_").unwrap_or(&linux_name);

    match name {
        "ESC" => "Esc".to_string(),
        "ENTER" => "Enter".to_string(),
        "SPACE" => "Space".to_string(),
        "BACKSPACE" => "Backspace".to_string(),
        "PAGEUP" => "Page Up".to_string(),
        "PAGEDOWN" => "Page Down".to_string(),
        "SYSRQ" => "Print Screen".to_string(),

        // Single letters/numbers and function keys are already clean
        s if s.len() == 1 => s.to_string(),
        s if s.starts_with('F') && s.len() <= 3 => s.to_string(),

        s => {
            let mut chars = s.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.as_str().to_lowercase().chars())
                    .collect(),
            }
        }
    }
}

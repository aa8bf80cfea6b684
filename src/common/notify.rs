//! Desktop notification delivery
//!
//! Fire-and-forget: notifications are shown from a blocking task so a slow
//! notification daemon never stalls the event loop, and failures are only
//! logged.

use tracing::warn;

use crate::constants::{app, notifications};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Warning,
    Error,
}

impl NotifyLevel {
    fn timeout_ms(self) -> u32 {
        match self {
            Self::Info => notifications::INFO_TIMEOUT_MS,
            Self::Warning => notifications::WARNING_TIMEOUT_MS,
            Self::Error => notifications::ERROR_TIMEOUT_MS,
        }
    }

    fn icon(self) -> &'static str {
        match self {
            Self::Info => "dialog-information",
            Self::Warning => "dialog-warning",
            Self::Error => "dialog-error",
        }
    }
}

/// Whether a notification at `level` should be shown. Errors always are.
pub fn should_show(level: NotifyLevel, show_notifications: bool) -> bool {
    level == NotifyLevel::Error || show_notifications
}

/// Show a notification without waiting for it. Must be called inside a tokio runtime.
pub fn notify(level: NotifyLevel, body: impl Into<String>) {
    let body = body.into();
    tokio::task::spawn_blocking(move || deliver_desktop_notification(level, &body));
}

fn deliver_desktop_notification(level: NotifyLevel, body: &str) {
    use notify_rust::Notification;

    if let Err(e) = Notification::new()
        .appname(app::NAME)
        .summary(app::TITLE)
        .body(body)
        .icon(level.icon())
        .timeout(notify_rust::Timeout::Milliseconds(level.timeout_ms()))
        .show()
    {
        warn!(error = %e, "Failed to send desktop notification");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_show() {
        assert!(should_show(NotifyLevel::Info, true));
        assert!(!should_show(NotifyLevel::Info, false));
        assert!(!should_show(NotifyLevel::Warning, false));
        assert!(should_show(NotifyLevel::Error, false));
    }
}

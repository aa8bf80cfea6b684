//! Monitor layout and pointer queries

use anyhow::{Context, Result};
use tracing::debug;
use x11rb::protocol::randr::ConnectionExt as _;
use x11rb::protocol::xproto::ConnectionExt as _;

use crate::common::geometry::{Position, Rect};

use super::X11Session;

/// A physical output as reported by RandR
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Monitor {
    pub rect: Rect,
    pub primary: bool,
}

/// List active monitors. Falls back to the whole screen when RandR is
/// unavailable so callers always get at least one entry.
pub fn list_monitors(session: &X11Session) -> Result<Vec<Monitor>> {
    let reply = session
        .conn
        .randr_get_monitors(session.root, true)
        .context("Failed to send RandR GetMonitors request")
        .and_then(|cookie| cookie.reply().context("Failed to get RandR monitor list"));

    let monitors: Vec<Monitor> = match reply {
        Ok(reply) => reply
            .monitors
            .iter()
            .map(|m| Monitor {
                rect: Rect::new(
                    i32::from(m.x),
                    i32::from(m.y),
                    u32::from(m.width),
                    u32::from(m.height),
                ),
                primary: m.primary,
            })
            .collect(),
        Err(e) => {
            debug!(error = %e, "RandR unavailable, using screen bounds");
            Vec::new()
        }
    };

    if monitors.is_empty() {
        let screen = session.screen();
        return Ok(vec![Monitor {
            rect: Rect::new(
                0,
                0,
                u32::from(screen.width_in_pixels),
                u32::from(screen.height_in_pixels),
            ),
            primary: true,
        }]);
    }

    Ok(monitors)
}

/// Current pointer position in root coordinates
pub fn pointer_position(session: &X11Session) -> Result<Position> {
    let reply = session
        .conn
        .query_pointer(session.root)
        .context("Failed to send QueryPointer request")?
        .reply()
        .context("Failed to get pointer position")?;

    Ok(Position::new(i32::from(reply.root_x), i32::from(reply.root_y)))
}

/// Pick the monitor that contains `point`, else the primary, else the first
pub fn monitor_at(monitors: &[Monitor], point: Position) -> Option<Monitor> {
    monitors
        .iter()
        .find(|m| m.rect.contains(point))
        .or_else(|| monitors.iter().find(|m| m.primary))
        .or_else(|| monitors.first())
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Vec<Monitor> {
        vec![
            Monitor {
                rect: Rect::new(0, 0, 1920, 1080),
                primary: false,
            },
            Monitor {
                rect: Rect::new(1920, 0, 2560, 1440),
                primary: true,
            },
        ]
    }

    #[test]
    fn test_monitor_at_pointer() {
        let monitors = layout();
        assert_eq!(
            monitor_at(&monitors, Position::new(100, 100)).map(|m| m.rect),
            Some(Rect::new(0, 0, 1920, 1080))
        );
        assert_eq!(
            monitor_at(&monitors, Position::new(3000, 1300)).map(|m| m.rect),
            Some(Rect::new(1920, 0, 2560, 1440))
        );
    }

    #[test]
    fn test_monitor_at_dead_zone_uses_primary() {
        // Below the shorter left monitor
        let monitors = layout();
        let found = monitor_at(&monitors, Position::new(100, 1200)).unwrap();
        assert!(found.primary);
    }

    #[test]
    fn test_monitor_at_empty() {
        assert_eq!(monitor_at(&[], Position::new(0, 0)), None);
    }
}

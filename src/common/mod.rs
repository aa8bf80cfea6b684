//! Shared helpers used across the daemon

pub mod debug;
pub mod geometry;
pub mod notify;

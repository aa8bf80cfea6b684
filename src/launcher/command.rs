//! Terminal command line construction

use std::fmt;

use super::target::ConnectionTarget;
use crate::config::Configuration;
use crate::constants::launch::{PORT_FLAG, SSH_FLAG};

/// Program and argument vector for one terminal launch.
///
/// Arguments are handed to the OS as discrete entries, so a host string
/// containing spaces or quotes needs no escaping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl LaunchCommand {
    pub fn build(target: &ConnectionTarget, config: &Configuration) -> Self {
        let mut args = vec![SSH_FLAG.to_string(), target.user_host.clone()];
        if let Some(port) = target.port {
            args.push(PORT_FLAG.to_string());
            args.push(port.to_string());
        }

        Self {
            program: config.terminal_executable().to_string(),
            args,
        }
    }
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

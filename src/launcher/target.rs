//! Connection spec parsing

use std::fmt;

/// Where a session connects to: `user@host` plus an optional port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    pub user_host: String,
    pub port: Option<u16>,
}

impl ConnectionTarget {
    /// Split `user@host[:port]`.
    ///
    /// The last `:` is a port separator only when it follows the last `@`
    /// (or there is no `@`), is not the first character, and the remainder
    /// is a valid port. Anything else stays part of the host.
    pub fn parse(spec: &str) -> Self {
        let at = spec.rfind('@');

        if let Some(colon) = spec.rfind(':')
            && colon > 0
            && at.is_none_or(|at| colon > at)
            && let Ok(port) = spec[colon + 1..].parse::<u16>()
        {
            return Self {
                user_host: spec[..colon].to_string(),
                port: Some(port),
            };
        }

        Self {
            user_host: spec.to_string(),
            port: None,
        }
    }
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", self.user_host, port),
            None => f.write_str(&self.user_host),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(spec: &str) -> (String, Option<u16>) {
        let target = ConnectionTarget::parse(spec);
        (target.user_host, target.port)
    }

    #[test]
    fn test_port_extracted() {
        assert_eq!(
            parts("admin@10.0.0.15:22"),
            ("admin@10.0.0.15".to_string(), Some(22))
        );
        assert_eq!(parts("root@bastion:2222"), ("root@bastion".to_string(), Some(2222)));
    }

    #[test]
    fn test_no_port() {
        assert_eq!(parts("admin@10.0.0.15"), ("admin@10.0.0.15".to_string(), None));
    }

    #[test]
    fn test_unparsable_port_stays_in_host() {
        assert_eq!(
            parts("admin@10.0.0.15:abc"),
            ("admin@10.0.0.15:abc".to_string(), None)
        );
        assert_eq!(parts("host:70000"), ("host:70000".to_string(), None));
        assert_eq!(parts("host:"), ("host:".to_string(), None));
        assert_eq!(parts("host:-1"), ("host:-1".to_string(), None));
    }

    #[test]
    fn test_colon_before_at_is_not_a_port() {
        assert_eq!(
            parts("us:22@host"),
            ("us:22@host".to_string(), None)
        );
    }

    #[test]
    fn test_bare_host_with_port() {
        assert_eq!(parts("bastion:22"), ("bastion".to_string(), Some(22)));
    }

    #[test]
    fn test_leading_colon_is_not_a_port() {
        assert_eq!(parts(":22"), (":22".to_string(), None));
    }

    #[test]
    fn test_display() {
        assert_eq!(ConnectionTarget::parse("a@b:22").to_string(), "a@b:22");
        assert_eq!(ConnectionTarget::parse("a@b").to_string(), "a@b");
    }
}

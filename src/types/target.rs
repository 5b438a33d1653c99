// ABOUTME: Validated remote endpoint for SSH connections.
// ABOUTME: Rejects empty hosts and ports outside 1..=65535 at construction time.

use std::fmt;
use thiserror::Error;

pub const DEFAULT_SSH_PORT: u16 = 22;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("host cannot be empty")]
    EmptyHost,

    #[error("invalid port: {0} (expected 1-65535)")]
    InvalidPort(u32),

    #[error("invalid port: {0}")]
    UnparsablePort(String),

    #[error("unterminated `[` in address: {0}")]
    UnclosedBracket(String),
}

/// Host and port of a single remote endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionTarget {
    host: String,
    port: u16,
}

impl ConnectionTarget {
    pub fn new(host: impl Into<String>, port: u32) -> Result<Self, TargetError> {
        let host = host.into();
        if host.trim().is_empty() {
            return Err(TargetError::EmptyHost);
        }
        if port == 0 || port > u32::from(u16::MAX) {
            return Err(TargetError::InvalidPort(port));
        }
        Ok(Self {
            host,
            port: port as u16,
        })
    }

    /// Target on the standard SSH port.
    pub fn with_default_port(host: impl Into<String>) -> Result<Self, TargetError> {
        Self::new(host, u32::from(DEFAULT_SSH_PORT))
    }

    /// Parse `host`, `host:port`, `[v6addr]` or `[v6addr]:port`.
    ///
    /// An unbracketed address with more than one `:` is an IPv6 literal and
    /// takes the default port.
    pub fn parse(s: &str) -> Result<Self, TargetError> {
        let s = s.trim();

        if let Some(rest) = s.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| TargetError::UnclosedBracket(s.to_string()))?;
            return match tail {
                "" => Self::with_default_port(host),
                _ => match tail.strip_prefix(':') {
                    Some(port_str) => Self::new(host, parse_port(port_str)?),
                    None => Err(TargetError::UnparsablePort(tail.to_string())),
                },
            };
        }

        match s.split_once(':') {
            Some((host, port_str)) if !port_str.contains(':') => {
                Self::new(host, parse_port(port_str)?)
            }
            _ => Self::with_default_port(s),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

fn parse_port(port_str: &str) -> Result<u32, TargetError> {
    port_str
        .parse::<u32>()
        .map_err(|_| TargetError::UnparsablePort(port_str.to_string()))
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

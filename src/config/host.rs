// ABOUTME: Per-host connection overrides.
// ABOUTME: Parses formats like "host", "host:port" and "[v6addr]:port".

use crate::types::{ConnectionTarget, DEFAULT_SSH_PORT};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    DEFAULT_SSH_PORT
}

impl HostConfig {
    /// Parse the same address forms as [`ConnectionTarget::parse`].
    pub fn parse(s: &str) -> Result<Self, String> {
        let target = ConnectionTarget::parse(s).map_err(|e| e.to_string())?;
        Ok(HostConfig {
            host: target.host().to_string(),
            port: target.port(),
        })
    }
}

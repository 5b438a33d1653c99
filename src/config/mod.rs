// ABOUTME: Optional YAML configuration for netrc-shell.
// ABOUTME: Credential file location, ports, host key policy and drain-loop polling.

mod host;

pub use host::HostConfig;

use crate::error::{Error, Result};
use crate::netrc::CredentialStore;
use crate::ssh::{PollPolicy, TransportOptions};
use crate::types::{ConnectionTarget, DEFAULT_SSH_PORT};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// First command run after logging in.
pub const DEFAULT_BOOTSTRAP_COMMAND: &str = "ls -la ~";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Credential file. Defaults to the platform netrc location.
    #[serde(default)]
    pub credentials: Option<PathBuf>,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default, deserialize_with = "deserialize_hosts")]
    pub hosts: Vec<HostConfig>,

    #[serde(default = "default_bootstrap_command")]
    pub bootstrap_command: String,

    #[serde(default)]
    pub poll: PollPolicy,

    #[serde(default = "default_trust_on_first_use")]
    pub trust_on_first_use: bool,

    #[serde(default)]
    pub known_hosts: Option<PathBuf>,

    #[serde(default = "default_inactivity_timeout", with = "humantime_serde")]
    pub inactivity_timeout: Duration,
}

fn default_port() -> u16 {
    DEFAULT_SSH_PORT
}

fn default_bootstrap_command() -> String {
    DEFAULT_BOOTSTRAP_COMMAND.to_string()
}

fn default_trust_on_first_use() -> bool {
    true
}

fn default_inactivity_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Default for Config {
    fn default() -> Self {
        Config {
            credentials: None,
            port: default_port(),
            hosts: Vec::new(),
            bootstrap_command: default_bootstrap_command(),
            poll: PollPolicy::default(),
            trust_on_first_use: default_trust_on_first_use(),
            known_hosts: None,
            inactivity_timeout: default_inactivity_timeout(),
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load `path` when given, built-in defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Credential store for the configured file, or the platform default.
    pub fn credential_store(&self) -> CredentialStore {
        match &self.credentials {
            Some(path) => CredentialStore::new(path),
            None => CredentialStore::with_default_path(),
        }
    }

    /// Port for `host`: its override if listed, the default port otherwise.
    pub fn port_for(&self, host: &str) -> u16 {
        self.hosts
            .iter()
            .find(|entry| entry.host == host)
            .map(|entry| entry.port)
            .unwrap_or(self.port)
    }

    pub fn target_for(&self, host: &str) -> Result<ConnectionTarget> {
        ConnectionTarget::new(host, u32::from(self.port_for(host)))
            .map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    pub fn transport_options(&self) -> TransportOptions {
        let options = TransportOptions::new()
            .trust_on_first_use(self.trust_on_first_use)
            .inactivity_timeout(Some(self.inactivity_timeout))
            .poll(self.poll);
        match &self.known_hosts {
            Some(path) => options.known_hosts_path(path),
            None => options,
        }
    }
}

fn deserialize_hosts<'de, D>(deserializer: D) -> std::result::Result<Vec<HostConfig>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let values: Vec<HostEntry> = Vec::deserialize(deserializer)?;
    values
        .into_iter()
        .map(|entry| entry.into_host_config())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(serde::de::Error::custom)
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HostEntry {
    Simple(String),
    Detailed(HostConfig),
}

impl HostEntry {
    fn into_host_config(self) -> std::result::Result<HostConfig, String> {
        match self {
            HostEntry::Simple(s) => HostConfig::parse(&s),
            HostEntry::Detailed(c) => Ok(c),
        }
    }
}

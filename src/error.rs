// ABOUTME: Application-wide error types for netrc-shell.
// ABOUTME: Uses thiserror for ergonomic error handling.

use crate::netrc::CredentialError;
use crate::types::TargetError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error("SSH error: {0}")]
    Ssh(#[from] crate::ssh::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

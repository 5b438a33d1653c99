// ABOUTME: Error types for credential file loading.
// ABOUTME: Missing files are reported, never fatal; reading before parsing is a contract violation.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read credential file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("credential store used before it was loaded or parsed")]
    NotLoaded,
}

pub type Result<T> = std::result::Result<T, CredentialError>;

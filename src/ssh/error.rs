// ABOUTME: SSH-specific error types.
// ABOUTME: Covers connection, password authentication, channel and timeout failures.

use crate::types::TargetError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid target: {0}")]
    InvalidTarget(#[from] TargetError),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("authentication failed for user {user}")]
    AuthenticationFailed { user: String },

    #[error("channel requested before authentication")]
    NotAuthenticated,

    #[error("not connected")]
    NotConnected,

    #[error("failed to open channel: {0}")]
    ChannelOpen(String),

    #[error("command execution failed: {0}")]
    CommandFailed(String),

    #[error("command timed out after {0:?}")]
    CommandTimeout(std::time::Duration),

    #[error("SSH protocol error: {0}")]
    Protocol(#[from] russh::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

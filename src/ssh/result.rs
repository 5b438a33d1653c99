// ABOUTME: Outcome of running one remote command on a channel.
// ABOUTME: Holds raw stdout/stderr chunks in arrival order plus an error message.

use crate::decode::decode_text;
use bytes::Bytes;

pub const NO_SESSION: &str = "No session";

/// Output of a single `execute` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Empty when the command ran to completion.
    pub error_message: String,
    pub stdout_chunks: Vec<Bytes>,
    pub stderr_chunks: Vec<Bytes>,
    /// Remote exit code; `None` when the channel closed without reporting one.
    pub exit_status: Option<u32>,
}

impl ExecutionResult {
    /// Result for a session that has no channel left.
    pub fn no_session() -> Self {
        Self::failed(NO_SESSION)
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error_message: message.into(),
            ..Default::default()
        }
    }

    /// True when no error was recorded. A non-zero exit code still counts as success
    /// here: the remote side reported completion.
    pub fn is_ok(&self) -> bool {
        self.error_message.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.stdout_chunks.is_empty() && self.stderr_chunks.is_empty()
    }

    /// Stdout with every chunk decoded independently.
    pub fn stdout_text(&self) -> String {
        join_decoded(&self.stdout_chunks)
    }

    /// Stderr with every chunk decoded independently.
    pub fn stderr_text(&self) -> String {
        join_decoded(&self.stderr_chunks)
    }
}

fn join_decoded(chunks: &[Bytes]) -> String {
    chunks.iter().map(|chunk| decode_text(chunk)).collect()
}

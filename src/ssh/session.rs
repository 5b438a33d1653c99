// ABOUTME: Single-command session over one SSH channel.
// ABOUTME: Runs the command, drains stdout/stderr until exit status, then closes the channel.

use super::channel::PollableChannel;
use super::error::Error;
use super::poll::{CHUNK_SIZE, PollPolicy};
use super::result::ExecutionResult;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Lifecycle of a [`CommandSession`]. Only `Idle` accepts a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Drained,
    Closed,
}

/// Owns one channel and runs exactly one command on it.
///
/// The protocol does not allow a second exec on the same channel, so after the
/// first [`execute`](Self::execute) the session is `Closed` and every further
/// call returns a "No session" result.
#[derive(Debug)]
pub struct CommandSession<C> {
    channel: Option<C>,
    command: Option<String>,
    state: SessionState,
    policy: PollPolicy,
}

impl<C: PollableChannel> CommandSession<C> {
    pub fn new(channel: C, policy: PollPolicy) -> Self {
        Self {
            channel: Some(channel),
            command: None,
            state: SessionState::Idle,
            policy,
        }
    }

    /// A session with no channel behind it.
    pub fn detached(policy: PollPolicy) -> Self {
        Self {
            channel: None,
            command: None,
            state: SessionState::Closed,
            policy,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The command this session ran, once it ran one.
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Run `command` and collect its output.
    ///
    /// Never fails outright: a missing channel, a refused exec request or a
    /// timeout all come back as a result with a non-empty `error_message`.
    pub async fn execute(&mut self, command: &str) -> ExecutionResult {
        if self.state != SessionState::Idle {
            debug!(state = ?self.state, "execute on a session that is not idle");
            return ExecutionResult::no_session();
        }
        let Some(mut channel) = self.channel.take() else {
            self.state = SessionState::Closed;
            return ExecutionResult::no_session();
        };

        self.command = Some(command.to_string());
        self.state = SessionState::Running;
        debug!(command = %command, "executing remote command");

        let start = Instant::now();
        let result = match channel.exec(command).await {
            Ok(()) => {
                let result = drain(&mut channel, &self.policy).await;
                self.state = SessionState::Drained;
                result
            }
            Err(e) => {
                warn!(command = %command, error = %e, "exec request failed");
                ExecutionResult::failed(e.to_string())
            }
        };

        if let Err(e) = channel.close().await {
            debug!(error = %e, "channel close failed");
        }
        drop(channel);
        self.state = SessionState::Closed;

        debug!(
            command = %command,
            exit_status = ?result.exit_status,
            stdout_chunks = result.stdout_chunks.len(),
            stderr_chunks = result.stderr_chunks.len(),
            duration = ?start.elapsed(),
            "remote command completed"
        );

        result
    }
}

/// Poll until the exit status is ready, reading at most one chunk per stream per poll.
///
/// Bytes still buffered when the exit status posts are dropped unless the
/// policy asks for `flush_on_exit`.
async fn drain<C: PollableChannel>(channel: &mut C, policy: &PollPolicy) -> ExecutionResult {
    let deadline = policy.timeout.map(|timeout| (Instant::now() + timeout, timeout));
    let mut result = ExecutionResult::default();

    while !channel.exit_status_ready() {
        if channel.recv_ready() {
            result.stdout_chunks.push(channel.recv(CHUNK_SIZE));
        }
        if channel.recv_stderr_ready() {
            result.stderr_chunks.push(channel.recv_stderr(CHUNK_SIZE));
        }

        if let Some((deadline, timeout)) = deadline
            && Instant::now() >= deadline
        {
            warn!(timeout = ?timeout, "command timed out");
            result.error_message = Error::CommandTimeout(timeout).to_string();
            return result;
        }

        policy.pause().await;
    }

    if policy.flush_on_exit {
        while channel.recv_ready() {
            result.stdout_chunks.push(channel.recv(CHUNK_SIZE));
        }
        while channel.recv_stderr_ready() {
            result.stderr_chunks.push(channel.recv_stderr(CHUNK_SIZE));
        }
    }

    result.exit_status = channel.exit_status();
    result
}

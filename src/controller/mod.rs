// ABOUTME: Interactive session flow: authenticate, run a bootstrap command, then loop on input.
// ABOUTME: Each command gets its own channel; the connection is always closed at the end.

mod input;
mod resolve;

pub use input::{CommandSource, PROMPT, StdinSource, TERMINATOR};
pub use resolve::{DEFAULT_HOST, INVALID_HOST_SENTINEL, ResolvedHost, resolve_credentials};

use crate::config::DEFAULT_BOOTSTRAP_COMMAND;
use crate::diagnostics::{Diagnostics, WarningKind};
use crate::output::Output;
use crate::ssh::{self, ExecutionResult, RemoteShell, Transport, TransportOptions};
use crate::types::ConnectionTarget;
use tracing::{debug, info};

/// Outcome of one interactive run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Authenticated and ran until the terminator or end of input.
    Completed,
    /// The endpoint rejected the credentials.
    AuthenticationRejected,
}

impl SessionOutcome {
    /// True for a clean termination, false when the login was rejected.
    pub fn succeeded(self) -> bool {
        self == SessionOutcome::Completed
    }
}

/// Drives one connection from authentication to disconnect.
pub struct SessionController {
    bootstrap_command: String,
    transport_options: TransportOptions,
    output: Output,
}

impl SessionController {
    pub fn new(transport_options: TransportOptions, output: Output) -> Self {
        Self {
            bootstrap_command: DEFAULT_BOOTSTRAP_COMMAND.to_string(),
            transport_options,
            output,
        }
    }

    pub fn bootstrap_command(mut self, command: impl Into<String>) -> Self {
        self.bootstrap_command = command.into();
        self
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    /// Connect to `target` and run the interactive loop.
    ///
    /// Connection failures are returned as errors. A rejected login is not an
    /// error: it is reported and yields [`SessionOutcome::AuthenticationRejected`].
    pub async fn run<S: CommandSource>(
        &self,
        target: ConnectionTarget,
        login: &str,
        secret: &str,
        source: &mut S,
    ) -> ssh::Result<SessionOutcome> {
        let mut transport = Transport::open(target, self.transport_options.clone()).await?;
        self.drive(&mut transport, login, secret, source).await
    }

    /// Run the interactive loop over an already connected shell.
    pub async fn drive<R, S>(
        &self,
        shell: &mut R,
        login: &str,
        secret: &str,
        source: &mut S,
    ) -> ssh::Result<SessionOutcome>
    where
        R: RemoteShell,
        S: CommandSource,
    {
        match shell.authenticate(login, secret).await {
            Ok(()) => {}
            Err(ssh::Error::AuthenticationFailed { .. }) => {
                self.output
                    .error(&format!("Failed to connect to: {}", shell.target().host()));
                if let Err(e) = shell.close().await {
                    debug!(error = %e, "close after rejected login failed");
                }
                return Ok(SessionOutcome::AuthenticationRejected);
            }
            Err(e) => {
                if let Err(close_err) = shell.close().await {
                    debug!(error = %close_err, "close after failed authentication failed");
                }
                return Err(e);
            }
        }

        let mut diagnostics = Diagnostics::default();
        let loop_result = self.command_loop(shell, source, &mut diagnostics).await;

        if let Err(e) = shell.close().await {
            diagnostics.record(
                WarningKind::SshDisconnect,
                format!("failed to disconnect from {}: {}", shell.target(), e),
            );
        }

        for warning in diagnostics.warnings() {
            self.output.warning(&warning.to_string());
        }

        loop_result.map(|()| SessionOutcome::Completed)
    }

    async fn command_loop<R, S>(
        &self,
        shell: &mut R,
        source: &mut S,
        diagnostics: &mut Diagnostics,
    ) -> ssh::Result<()>
    where
        R: RemoteShell,
        S: CommandSource,
    {
        info!(host = %shell.target().host(), "interactive session started");

        if !self.bootstrap_command.is_empty() {
            let result = self.run_command(shell, &self.bootstrap_command, diagnostics).await?;
            self.output.result(&self.bootstrap_command, &result);
        }

        while let Some(line) = source.next_command().await {
            let command = line.trim();
            if command == TERMINATOR {
                break;
            }
            if command.is_empty() {
                continue;
            }
            let result = self.run_command(shell, command, diagnostics).await?;
            self.output.result(command, &result);
        }

        info!(host = %shell.target().host(), "interactive session finished");
        Ok(())
    }

    async fn run_command<R: RemoteShell>(
        &self,
        shell: &mut R,
        command: &str,
        diagnostics: &mut Diagnostics,
    ) -> ssh::Result<ExecutionResult> {
        let mut session = match shell.open_channel().await {
            Ok(session) => session,
            Err(ssh::Error::ChannelOpen(reason)) => {
                diagnostics.record(
                    WarningKind::ChannelOpen,
                    format!("could not open channel for `{}`: {}", command, reason),
                );
                return Ok(ExecutionResult::no_session());
            }
            Err(e) => return Err(e),
        };
        debug!(command = %command, "executing");
        Ok(session.execute(command).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputMode;
    use crate::ssh::testing::{ScriptedShell, Step};
    use std::collections::VecDeque;

    fn controller() -> SessionController {
        SessionController::new(TransportOptions::default(), Output::new(OutputMode::Quiet))
    }

    fn lines(values: &[&str]) -> VecDeque<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn echo_script() -> Vec<Step> {
        vec![Step::Stdout(b"ok\n".to_vec()), Step::Exit(0)]
    }

    #[tokio::test]
    async fn runs_bootstrap_then_commands_until_terminator() {
        let mut shell = ScriptedShell::new("alice", "pw", echo_script());
        let mut source = lines(&["uptime", "whoami", ".", "never"]);

        let outcome = controller()
            .drive(&mut shell, "alice", "pw", &mut source)
            .await
            .unwrap();

        assert_eq!(outcome, SessionOutcome::Completed);
        assert_eq!(shell.commands(), vec!["ls -la ~", "uptime", "whoami"]);
        assert_eq!(shell.channels_opened, 3);
        assert_eq!(shell.closes, 1);
        assert_eq!(source, lines(&["never"]));
    }

    #[tokio::test]
    async fn end_of_input_finishes_the_session() {
        let mut shell = ScriptedShell::new("alice", "pw", echo_script());
        let mut source = lines(&["date"]);

        let outcome = controller()
            .drive(&mut shell, "alice", "pw", &mut source)
            .await
            .unwrap();

        assert!(outcome.succeeded());
        assert_eq!(shell.commands(), vec!["ls -la ~", "date"]);
        assert_eq!(shell.closes, 1);
    }

    #[tokio::test]
    async fn blank_lines_are_skipped() {
        let mut shell = ScriptedShell::new("alice", "pw", echo_script());
        let mut source = lines(&["", "   ", " pwd ", "."]);

        controller()
            .drive(&mut shell, "alice", "pw", &mut source)
            .await
            .unwrap();

        assert_eq!(shell.commands(), vec!["ls -la ~", "pwd"]);
    }

    #[tokio::test]
    async fn rejected_login_runs_nothing() {
        let mut shell = ScriptedShell::new("alice", "pw", echo_script());
        let mut source = lines(&["uptime"]);

        let outcome = controller()
            .drive(&mut shell, "alice", "wrong", &mut source)
            .await
            .unwrap();

        assert_eq!(outcome, SessionOutcome::AuthenticationRejected);
        assert!(!outcome.succeeded());
        assert!(shell.commands().is_empty());
        assert_eq!(shell.channels_opened, 0);
        assert_eq!(shell.closes, 1);
        assert_eq!(source.len(), 1);
    }

    #[tokio::test]
    async fn refused_channels_do_not_end_the_session() {
        let mut shell = ScriptedShell::new("alice", "pw", echo_script()).refuse_channels();
        let mut source = lines(&["uptime", "."]);

        let outcome = controller()
            .drive(&mut shell, "alice", "pw", &mut source)
            .await
            .unwrap();

        assert_eq!(outcome, SessionOutcome::Completed);
        assert!(shell.commands().is_empty());
        assert!(source.is_empty());
        assert_eq!(shell.closes, 1);
    }

    #[tokio::test]
    async fn custom_bootstrap_command_runs_first() {
        let mut shell = ScriptedShell::new("alice", "pw", echo_script());
        let mut source = lines(&["."]);

        controller()
            .bootstrap_command("hostname")
            .drive(&mut shell, "alice", "pw", &mut source)
            .await
            .unwrap();

        assert_eq!(shell.commands(), vec!["hostname"]);
    }

    #[tokio::test]
    async fn empty_bootstrap_command_is_skipped() {
        let mut shell = ScriptedShell::new("alice", "pw", echo_script());
        let mut source = lines(&["id", "."]);

        controller()
            .bootstrap_command("")
            .drive(&mut shell, "alice", "pw", &mut source)
            .await
            .unwrap();

        assert_eq!(shell.commands(), vec!["id"]);
    }

    #[tokio::test]
    async fn transport_failure_during_login_is_returned_after_closing() {
        let mut shell = ScriptedShell::new("alice", "pw", echo_script())
            .drop_during_auth()
            .fail_close();
        let mut source = lines(&["uptime"]);

        let err = controller()
            .drive(&mut shell, "alice", "pw", &mut source)
            .await
            .unwrap_err();

        assert!(matches!(err, ssh::Error::Connection(_)), "got {err:?}");
        assert_eq!(shell.closes, 1);
        assert!(shell.commands().is_empty());
    }

    #[tokio::test]
    async fn failed_disconnect_does_not_fail_the_session() {
        let mut shell = ScriptedShell::new("alice", "pw", echo_script()).fail_close();
        let mut source = lines(&["."]);

        let outcome = controller()
            .drive(&mut shell, "alice", "pw", &mut source)
            .await
            .unwrap();

        assert!(outcome.succeeded());
        assert_eq!(shell.closes, 1);
    }
}

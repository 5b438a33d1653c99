// ABOUTME: In-memory channel double for drain-loop and controller tests.
// ABOUTME: Each exit-status poll advances one scripted step of remote behaviour.

use super::channel::{PollableChannel, take_up_to};
use super::error::{Error, Result};
use super::poll::PollPolicy;
use super::session::CommandSession;
use super::transport::RemoteShell;
use crate::types::ConnectionTarget;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Commands seen by scripted channels, in execution order.
pub(crate) type CommandLog = Arc<Mutex<Vec<String>>>;

/// Something the remote side does between two polls.
#[derive(Debug, Clone)]
pub(crate) enum Step {
    Stdout(Vec<u8>),
    Stderr(Vec<u8>),
    Exit(u32),
    Close,
    Idle,
    /// Several events delivered before the next poll.
    Batch(Vec<Step>),
}

#[derive(Debug)]
pub(crate) struct ScriptedChannel {
    steps: VecDeque<Step>,
    stdout: BytesMut,
    stderr: BytesMut,
    exit_status: Option<u32>,
    closed: bool,
    refuse_exec: bool,
    closes: Arc<AtomicUsize>,
    log: Option<CommandLog>,
}

impl ScriptedChannel {
    pub(crate) fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: steps.into(),
            stdout: BytesMut::new(),
            stderr: BytesMut::new(),
            exit_status: None,
            closed: false,
            refuse_exec: false,
            closes: Arc::new(AtomicUsize::new(0)),
            log: None,
        }
    }

    pub(crate) fn with_log(mut self, log: CommandLog) -> Self {
        self.log = Some(log);
        self
    }

    pub(crate) fn refuse_exec(mut self) -> Self {
        self.refuse_exec = true;
        self
    }

    pub(crate) fn close_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.closes)
    }

    fn apply(&mut self, step: Step) {
        match step {
            Step::Stdout(data) => self.stdout.extend_from_slice(&data),
            Step::Stderr(data) => self.stderr.extend_from_slice(&data),
            Step::Exit(code) => self.exit_status = Some(code),
            Step::Close => self.closed = true,
            Step::Idle => {}
            Step::Batch(steps) => steps.into_iter().for_each(|s| self.apply(s)),
        }
    }
}

#[async_trait]
impl PollableChannel for ScriptedChannel {
    async fn exec(&mut self, command: &str) -> Result<()> {
        if let Some(log) = &self.log {
            log.lock().unwrap().push(command.to_string());
        }
        if self.refuse_exec {
            return Err(Error::CommandFailed("refused".to_string()));
        }
        Ok(())
    }

    fn exit_status_ready(&mut self) -> bool {
        if let Some(step) = self.steps.pop_front() {
            self.apply(step);
        }
        self.exit_status.is_some() || self.closed
    }

    fn recv_ready(&mut self) -> bool {
        !self.stdout.is_empty()
    }

    fn recv(&mut self, max: usize) -> Bytes {
        take_up_to(&mut self.stdout, max)
    }

    fn recv_stderr_ready(&mut self) -> bool {
        !self.stderr.is_empty()
    }

    fn recv_stderr(&mut self, max: usize) -> Bytes {
        take_up_to(&mut self.stderr, max)
    }

    fn exit_status(&self) -> Option<u32> {
        self.exit_status
    }

    async fn close(&mut self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.closed = true;
        Ok(())
    }
}

/// Remote shell double that accepts one login/secret pair and hands out
/// scripted channels.
#[derive(Debug)]
pub(crate) struct ScriptedShell {
    target: ConnectionTarget,
    login: String,
    secret: String,
    script: Vec<Step>,
    authenticated: bool,
    refuse_channels: bool,
    drop_during_auth: bool,
    fail_close: bool,
    log: CommandLog,
    pub(crate) channels_opened: usize,
    pub(crate) closes: usize,
}

impl ScriptedShell {
    pub(crate) fn new(login: &str, secret: &str, script: Vec<Step>) -> Self {
        Self {
            target: ConnectionTarget::with_default_port("scripted.test").unwrap(),
            login: login.to_string(),
            secret: secret.to_string(),
            script,
            authenticated: false,
            refuse_channels: false,
            drop_during_auth: false,
            fail_close: false,
            log: CommandLog::default(),
            channels_opened: 0,
            closes: 0,
        }
    }

    pub(crate) fn refuse_channels(mut self) -> Self {
        self.refuse_channels = true;
        self
    }

    /// Lose the connection while authenticating.
    pub(crate) fn drop_during_auth(mut self) -> Self {
        self.drop_during_auth = true;
        self
    }

    pub(crate) fn fail_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub(crate) fn commands(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteShell for ScriptedShell {
    type Channel = ScriptedChannel;

    fn target(&self) -> &ConnectionTarget {
        &self.target
    }

    async fn authenticate(&mut self, login: &str, secret: &str) -> Result<()> {
        if self.drop_during_auth {
            return Err(Error::Connection("connection reset by peer".to_string()));
        }
        if login == self.login && secret == self.secret {
            self.authenticated = true;
            Ok(())
        } else {
            Err(Error::AuthenticationFailed {
                user: login.to_string(),
            })
        }
    }

    async fn open_channel(&mut self) -> Result<CommandSession<ScriptedChannel>> {
        if !self.authenticated {
            return Err(Error::NotAuthenticated);
        }
        if self.refuse_channels {
            return Err(Error::ChannelOpen("administratively prohibited".to_string()));
        }
        self.channels_opened += 1;
        let channel = ScriptedChannel::new(self.script.clone()).with_log(Arc::clone(&self.log));
        Ok(CommandSession::new(channel, PollPolicy::busy()))
    }

    async fn close(&mut self) -> Result<()> {
        self.closes += 1;
        self.authenticated = false;
        if self.fail_close {
            return Err(Error::NotConnected);
        }
        Ok(())
    }
}

// ABOUTME: Encrypted connection to one SSH endpoint using russh.
// ABOUTME: Handles host key checks, password authentication and opening command channels.

use super::channel::{PollableChannel, RusshChannel};
use super::error::{Error, Result};
use super::poll::PollPolicy;
use super::session::CommandSession;
use crate::types::ConnectionTarget;
use async_trait::async_trait;
use russh::Disconnect;
use russh::client::{self, Config, Handle};
use russh::keys::known_hosts::{
    check_known_hosts, check_known_hosts_path, learn_known_hosts, learn_known_hosts_path,
};
use russh::keys::ssh_key;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Connection options that do not depend on the target.
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Whether to accept unknown hosts (Trust On First Use).
    /// If false, connection to unknown hosts will fail.
    pub trust_on_first_use: bool,
    /// Optional path to known_hosts file.
    /// If None, uses the default ~/.ssh/known_hosts.
    pub known_hosts_path: Option<PathBuf>,
    /// Drop the connection after this much silence.
    pub inactivity_timeout: Option<Duration>,
    /// Drain-loop policy handed to every channel.
    pub poll: PollPolicy,
}

impl TransportOptions {
    pub fn new() -> Self {
        Self {
            trust_on_first_use: false,
            known_hosts_path: None,
            inactivity_timeout: Some(Duration::from_secs(30)),
            poll: PollPolicy::default(),
        }
    }

    pub fn trust_on_first_use(mut self, tofu: bool) -> Self {
        self.trust_on_first_use = tofu;
        self
    }

    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    pub fn inactivity_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.inactivity_timeout = timeout;
        self
    }

    pub fn poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// SSH client handler for russh.
pub(crate) struct SshHandler {
    host: String,
    port: u16,
    trust_on_first_use: bool,
    known_hosts_path: Option<PathBuf>,
}

impl SshHandler {
    fn new(target: &ConnectionTarget, options: &TransportOptions) -> Self {
        Self {
            host: target.host().to_string(),
            port: target.port(),
            trust_on_first_use: options.trust_on_first_use,
            known_hosts_path: options.known_hosts_path.clone(),
        }
    }
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &ssh_key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        let check_result = match &self.known_hosts_path {
            Some(path) => check_known_hosts_path(&self.host, self.port, server_public_key, path),
            None => check_known_hosts(&self.host, self.port, server_public_key),
        };

        match check_result {
            Ok(true) => Ok(true),
            Ok(false) => {
                if !self.trust_on_first_use {
                    warn!(host = %self.host, port = self.port, "unknown host key rejected");
                    return Ok(false);
                }
                warn!(
                    host = %self.host,
                    port = self.port,
                    "trust-on-first-use: accepting unknown host key"
                );
                let learn_result = match &self.known_hosts_path {
                    Some(path) => {
                        learn_known_hosts_path(&self.host, self.port, server_public_key, path)
                    }
                    None => learn_known_hosts(&self.host, self.port, server_public_key),
                };
                if let Err(e) = learn_result {
                    warn!(error = %e, "failed to save host key to known_hosts");
                }
                Ok(true)
            }
            Err(russh::keys::Error::KeyChanged { .. }) => {
                warn!(host = %self.host, port = self.port, "host key changed, refusing connection");
                Ok(false)
            }
            // Unreadable known_hosts counts as an unknown host.
            Err(_) => Ok(self.trust_on_first_use),
        }
    }
}

/// The connection side of a remote shell: authenticate once, then hand out
/// one [`CommandSession`] per command.
#[async_trait]
pub trait RemoteShell: Send {
    type Channel: PollableChannel;

    fn target(&self) -> &ConnectionTarget;

    /// Password authentication. A rejection leaves the connection open.
    async fn authenticate(&mut self, login: &str, secret: &str) -> Result<()>;

    /// Open a fresh channel. Only valid after authentication.
    async fn open_channel(&mut self) -> Result<CommandSession<Self::Channel>>;

    /// Release the connection. Calling it twice is harmless.
    async fn close(&mut self) -> Result<()>;
}

/// An encrypted connection to one endpoint.
pub struct Transport {
    target: ConnectionTarget,
    options: TransportOptions,
    handle: Option<Handle<SshHandler>>,
    authenticated: bool,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("target", &self.target)
            .field("options", &self.options)
            .field("connected", &self.handle.is_some())
            .field("authenticated", &self.authenticated)
            .finish()
    }
}

impl Transport {
    /// Connect and complete the key exchange, without authenticating.
    pub async fn open(target: ConnectionTarget, options: TransportOptions) -> Result<Self> {
        info!(host = %target.host(), port = target.port(), "connecting to SSH");

        let russh_config = Config {
            inactivity_timeout: options.inactivity_timeout,
            ..Default::default()
        };
        let handler = SshHandler::new(&target, &options);

        let handle = client::connect(
            Arc::new(russh_config),
            (target.host(), target.port()),
            handler,
        )
        .await
        .map_err(|e| {
            if e.to_string().contains("Connection refused") {
                Error::Connection(format!("connection refused to {}", target))
            } else {
                Error::Connection(e.to_string())
            }
        })?;

        debug!(endpoint = %target, "SSH handshake completed");

        Ok(Self {
            target,
            options,
            handle: Some(handle),
            authenticated: false,
        })
    }

    pub fn target(&self) -> &ConnectionTarget {
        &self.target
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    /// Password authentication. Rejection is reported, never retried.
    pub async fn authenticate(&mut self, login: &str, secret: &str) -> Result<()> {
        let handle = self.handle.as_mut().ok_or(Error::NotConnected)?;

        let result = handle
            .authenticate_password(login, secret)
            .await
            .map_err(Error::Protocol)?;

        if !result.success() {
            warn!(host = %self.target.host(), user = %login, "password authentication rejected");
            self.authenticated = false;
            return Err(Error::AuthenticationFailed {
                user: login.to_string(),
            });
        }

        info!(host = %self.target.host(), user = %login, "SSH authenticated");
        self.authenticated = true;
        Ok(())
    }

    /// Open a session channel wrapped in a ready-to-run [`CommandSession`].
    pub async fn open_channel(&mut self) -> Result<CommandSession<RusshChannel>> {
        let handle = self.handle.as_ref().ok_or(Error::NotConnected)?;
        if !self.authenticated {
            return Err(Error::NotAuthenticated);
        }

        let channel = handle
            .channel_open_session()
            .await
            .map_err(|e| Error::ChannelOpen(e.to_string()))?;

        debug!(channel = ?channel.id(), "opened session channel");
        Ok(CommandSession::new(
            RusshChannel::new(channel),
            self.options.poll,
        ))
    }

    /// Disconnect. Idempotent.
    pub async fn close(&mut self) -> Result<()> {
        self.authenticated = false;
        if let Some(handle) = self.handle.take() {
            handle
                .disconnect(Disconnect::ByApplication, "", "en")
                .await
                .map_err(Error::Protocol)?;
            info!(host = %self.target.host(), "SSH disconnected");
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteShell for Transport {
    type Channel = RusshChannel;

    fn target(&self) -> &ConnectionTarget {
        Transport::target(self)
    }

    async fn authenticate(&mut self, login: &str, secret: &str) -> Result<()> {
        Transport::authenticate(self, login, secret).await
    }

    async fn open_channel(&mut self) -> Result<CommandSession<RusshChannel>> {
        Transport::open_channel(self).await
    }

    async fn close(&mut self) -> Result<()> {
        Transport::close(self).await
    }
}

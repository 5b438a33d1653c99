// ABOUTME: Pollable view of an SSH session channel.
// ABOUTME: Buffers stdout/stderr/exit-status messages so readiness can be checked without blocking.

use super::error::{Error, Result};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::FutureExt;
use russh::{Channel, ChannelMsg, client};

/// Extended-data stream number carrying stderr.
const STDERR_STREAM: u32 = 1;

/// A channel that can run one command and be polled for its output.
///
/// Readiness checks never block. They may pull messages the remote side has
/// already delivered, which is why they take `&mut self`.
#[async_trait]
pub trait PollableChannel: Send {
    /// Ask the remote side to run `command`.
    async fn exec(&mut self, command: &str) -> Result<()>;

    /// True once the exit status arrived or the channel was closed.
    fn exit_status_ready(&mut self) -> bool;

    fn recv_ready(&mut self) -> bool;

    /// Take up to `max` bytes of stdout.
    fn recv(&mut self, max: usize) -> Bytes;

    fn recv_stderr_ready(&mut self) -> bool;

    /// Take up to `max` bytes of stderr.
    fn recv_stderr(&mut self, max: usize) -> Bytes;

    /// Exit code, when the remote side sent one.
    fn exit_status(&self) -> Option<u32>;

    /// Release the channel.
    async fn close(&mut self) -> Result<()>;
}

/// [`PollableChannel`] over a russh client channel.
pub struct RusshChannel {
    channel: Channel<client::Msg>,
    stdout: BytesMut,
    stderr: BytesMut,
    exit_status: Option<u32>,
    closed: bool,
}

impl std::fmt::Debug for RusshChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RusshChannel")
            .field("id", &self.channel.id())
            .field("stdout_buffered", &self.stdout.len())
            .field("stderr_buffered", &self.stderr.len())
            .field("exit_status", &self.exit_status)
            .field("closed", &self.closed)
            .finish()
    }
}

impl RusshChannel {
    pub fn new(channel: Channel<client::Msg>) -> Self {
        Self {
            channel,
            stdout: BytesMut::new(),
            stderr: BytesMut::new(),
            exit_status: None,
            closed: false,
        }
    }

    /// Move every message already queued for this channel into the buffers.
    fn pump(&mut self) {
        while !self.closed {
            match self.channel.wait().now_or_never() {
                Some(Some(msg)) => self.absorb(msg),
                Some(None) => self.closed = true,
                None => break,
            }
        }
    }

    fn absorb(&mut self, msg: ChannelMsg) {
        match msg {
            ChannelMsg::Data { data } => self.stdout.extend_from_slice(&data),
            ChannelMsg::ExtendedData { data, ext } if ext == STDERR_STREAM => {
                self.stderr.extend_from_slice(&data)
            }
            ChannelMsg::ExitStatus { exit_status } => self.exit_status = Some(exit_status),
            ChannelMsg::Close => self.closed = true,
            _ => {}
        }
    }
}

pub(super) fn take_up_to(buffer: &mut BytesMut, max: usize) -> Bytes {
    let n = buffer.len().min(max);
    buffer.split_to(n).freeze()
}

#[async_trait]
impl PollableChannel for RusshChannel {
    async fn exec(&mut self, command: &str) -> Result<()> {
        self.channel
            .exec(true, command)
            .await
            .map_err(|e| Error::CommandFailed(format!("failed to exec command: {}", e)))
    }

    fn exit_status_ready(&mut self) -> bool {
        self.pump();
        self.exit_status.is_some() || self.closed
    }

    fn recv_ready(&mut self) -> bool {
        self.pump();
        !self.stdout.is_empty()
    }

    fn recv(&mut self, max: usize) -> Bytes {
        take_up_to(&mut self.stdout, max)
    }

    fn recv_stderr_ready(&mut self) -> bool {
        self.pump();
        !self.stderr.is_empty()
    }

    fn recv_stderr(&mut self, max: usize) -> Bytes {
        take_up_to(&mut self.stderr, max)
    }

    fn exit_status(&self) -> Option<u32> {
        self.exit_status
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.channel.close().await.map_err(Error::Protocol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_up_to_splits_at_limit() {
        let mut buffer = BytesMut::from(&b"abcdef"[..]);
        assert_eq!(take_up_to(&mut buffer, 4), Bytes::from_static(b"abcd"));
        assert_eq!(take_up_to(&mut buffer, 4), Bytes::from_static(b"ef"));
        assert!(take_up_to(&mut buffer, 4).is_empty());
    }
}

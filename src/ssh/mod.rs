// ABOUTME: SSH client module for running commands on a remote host.
// ABOUTME: Password authentication, known_hosts verification and a polled drain loop per command.

mod channel;
mod error;
mod poll;
mod result;
mod session;
#[cfg(test)]
pub(crate) mod testing;
mod transport;

pub use channel::{PollableChannel, RusshChannel};
pub use error::{Error, Result};
pub use poll::{CHUNK_SIZE, PollPolicy};
pub use result::{ExecutionResult, NO_SESSION};
pub use session::{CommandSession, SessionState};
pub use transport::{RemoteShell, Transport, TransportOptions};

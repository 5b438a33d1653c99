// ABOUTME: Non-fatal problems noticed while a shell session runs.
// ABOUTME: Gathered during the session and reported once it has ended.

use std::fmt;

/// Kind of problem. None of them end the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// A channel could not be opened, so one command never ran.
    ChannelOpen,
    /// The connection did not shut down cleanly.
    SshDisconnect,
}

impl WarningKind {
    fn label(self) -> &'static str {
        match self {
            WarningKind::ChannelOpen => "channel",
            WarningKind::SshDisconnect => "disconnect",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind.label())
    }
}

/// Warnings for one session, in the order they happened.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Note a problem. It is logged right away and kept for the final report.
    pub fn record(&mut self, kind: WarningKind, message: impl Into<String>) {
        let warning = Warning {
            kind,
            message: message.into(),
        };
        tracing::warn!(kind = kind.label(), "{}", warning.message);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }
}

// ABOUTME: Maps the command-line host argument to host, login and secret.
// ABOUTME: Failures come back as an `@`-prefixed sentinel host instead of an error.

use crate::netrc::CredentialStore;
use tracing::{debug, warn};

/// Host used when no argument is given.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Sentinel returned for a host missing from the credential file.
pub const INVALID_HOST_SENTINEL: &str = "@invalid";

/// Outcome of credential resolution.
///
/// `host` is one of: a real host name, an `@`-prefixed sentinel (nothing to
/// connect to, echo it), or empty (invalid usage or unreadable credential file).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedHost {
    pub host: String,
    pub login: String,
    pub secret: String,
}

impl ResolvedHost {
    pub fn sentinel(value: impl Into<String>) -> Self {
        Self {
            host: value.into(),
            ..Default::default()
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.host.starts_with('@')
    }

    /// True when there is neither a host nor a sentinel.
    pub fn is_empty(&self) -> bool {
        self.host.is_empty()
    }
}

/// Resolve zero or one host argument against `store`.
///
/// More than one argument yields an empty result. An argument starting with `@`
/// is passed through untouched without reading the credential file. The store
/// is loaded on demand; when that fails its message explains why and the result
/// is empty.
pub fn resolve_credentials(args: &[String], store: &mut CredentialStore) -> ResolvedHost {
    if args.len() > 1 {
        debug!(count = args.len(), "too many host arguments");
        return ResolvedHost::default();
    }

    let host = args.first().map(String::as_str).unwrap_or(DEFAULT_HOST);
    if host.starts_with('@') {
        return ResolvedHost::sentinel(host);
    }

    if !store.is_loaded() && store.load().is_err() {
        return ResolvedHost::default();
    }

    match store.credential(host) {
        Some(credential) => ResolvedHost {
            host: host.to_string(),
            login: credential.login.to_string(),
            secret: credential.secret.to_string(),
        },
        None => {
            warn!("Invalid host: {}", host);
            ResolvedHost::sentinel(INVALID_HOST_SENTINEL)
        }
    }
}

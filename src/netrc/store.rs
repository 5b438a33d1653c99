// ABOUTME: Credential store backed by a plain-text netrc file.
// ABOUTME: Maps host names to login/secret pairs; load failures leave an empty store and a message.

use super::error::{CredentialError, Result};
use super::lexer::{build_records, relevant_lines, tokenize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[cfg(windows)]
const DEFAULT_FILENAME: &str = "_netrc";
#[cfg(not(windows))]
const DEFAULT_FILENAME: &str = ".netrc";

/// A parsed credential-file entry for one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub host: String,
    /// Every word after the host, in file order.
    pub raw_tokens: Vec<String>,
    /// Value following the last `login` keyword, empty when absent.
    pub login: String,
    /// Value following the last `password` keyword, empty when absent.
    pub secret: String,
}

/// Host-keyed records that remember file order.
///
/// Re-inserting a host replaces its record in place, so the position is that of
/// the first occurrence and the contents are those of the last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Machines {
    records: Vec<CredentialRecord>,
    index: HashMap<String, usize>,
}

impl Machines {
    fn insert(&mut self, record: CredentialRecord) {
        match self.index.get(&record.host) {
            Some(&position) => self.records[position] = record,
            None => {
                self.index.insert(record.host.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    pub fn get(&self, host: &str) -> Option<&CredentialRecord> {
        self.index.get(host).map(|&position| &self.records[position])
    }

    pub fn contains_key(&self, host: &str) -> bool {
        self.index.contains_key(host)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.host.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CredentialRecord> {
        self.records.iter()
    }
}

/// Login and secret for one host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credential<'a> {
    pub login: &'a str,
    pub secret: &'a str,
}

/// Plain-text credential store.
#[derive(Debug)]
pub struct CredentialStore {
    source_path: PathBuf,
    machines: Option<Machines>,
    tokens: Vec<String>,
    message: String,
}

impl CredentialStore {
    /// Create a store reading from `path`. Nothing is read until [`load`](Self::load).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: path.into(),
            machines: None,
            tokens: Vec::new(),
            message: String::new(),
        }
    }

    /// Create a store reading from the platform's conventional location.
    pub fn with_default_path() -> Self {
        Self::new(Self::default_path())
    }

    /// `$HOME/.netrc`, or `%USERPROFILE%\_netrc` on Windows.
    /// A missing or empty home variable falls back to `/`.
    pub fn default_path() -> PathBuf {
        let var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
        let home = std::env::var(var)
            .ok()
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| "/".to_string());
        PathBuf::from(home).join(DEFAULT_FILENAME)
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Whether a load or parse pass has completed, successfully or not.
    pub fn is_loaded(&self) -> bool {
        self.machines.is_some()
    }

    /// Read and parse the source file.
    ///
    /// An empty path means "no file": the store becomes empty without touching
    /// the filesystem. On failure the store becomes empty but usable and
    /// [`message`](Self::message) describes what went wrong.
    pub fn load(&mut self) -> Result<()> {
        if self.source_path.as_os_str().is_empty() {
            debug!("no credential file requested");
            self.parse("");
            return Ok(());
        }

        debug!(path = %self.source_path.display(), "loading credential file");

        match std::fs::read_to_string(&self.source_path) {
            Ok(content) => {
                self.parse(&content);
                Ok(())
            }
            Err(e) => {
                let err = if e.kind() == std::io::ErrorKind::NotFound {
                    CredentialError::FileNotFound {
                        path: self.source_path.clone(),
                    }
                } else {
                    CredentialError::Read {
                        path: self.source_path.clone(),
                        source: e,
                    }
                };
                warn!(error = %err, "credential file unavailable");
                self.message = err.to_string();
                self.machines = Some(Machines::default());
                self.tokens.clear();
                Err(err)
            }
        }
    }

    /// Parse credential text, replacing any previous contents.
    ///
    /// Malformed input never fails: incomplete records keep whatever attributes
    /// were found. Hosts seen twice keep the later record.
    pub fn parse(&mut self, raw: &str) -> &Machines {
        let text = relevant_lines(raw);
        let tokens = tokenize(&text);

        let mut machines = Machines::default();
        for record in build_records(&tokens) {
            machines.insert(record);
        }

        debug!(records = machines.len(), "parsed credential records");

        self.tokens = tokens.iter().map(|t| t.as_str().to_string()).collect();
        self.message.clear();
        self.machines.insert(machines)
    }

    /// All parsed records.
    pub fn machines(&self) -> Result<&Machines> {
        self.machines.as_ref().ok_or(CredentialError::NotLoaded)
    }

    /// Login and secret for `host`, or `None` when the host is unknown.
    pub fn credential(&self, host: &str) -> Option<Credential<'_>> {
        let record = self.machines.as_ref()?.get(host)?;
        Some(Credential {
            login: &record.login,
            secret: &record.secret,
        })
    }

    /// Flat token stream of the last parse, markers included.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Last error, empty when there is none.
    pub fn message(&self) -> &str {
        &self.message
    }
}

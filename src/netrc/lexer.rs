// ABOUTME: Tokenizer and record builder for netrc-style credential files.
// ABOUTME: Splits on the `machine ` marker, then walks the words with a two-state machine.

use super::store::CredentialRecord;

/// Text that introduces a record. Only recognised when followed by a single space.
pub const MACHINE_MARKER: &str = "machine ";
pub const LOGIN_KEYWORD: &str = "login";
pub const PASSWORD_KEYWORD: &str = "password";

/// One element of the flat token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// A `machine ` marker: the previous record ends here.
    Machine,
    /// Any other whitespace-separated word.
    Word(&'a str),
}

impl Token<'_> {
    pub fn as_str(&self) -> &str {
        match self {
            Token::Machine => "machine",
            Token::Word(word) => word,
        }
    }
}

/// Keep only the lines that carry data.
///
/// Trailing whitespace is removed from every line; lines that end up empty or
/// that start with `#` are dropped. Survivors are joined with `\n`.
pub fn relevant_lines(raw: &str) -> String {
    raw.lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split text into markers and words.
///
/// The marker is the literal `machine ` anywhere in the text, so `mymachine x`
/// yields `my`, a marker, then `x`. `machine` followed by a tab or newline is an
/// ordinary word.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    for (index, segment) in text.split(MACHINE_MARKER).enumerate() {
        if index > 0 {
            tokens.push(Token::Machine);
        }
        tokens.extend(segment.split_whitespace().map(Token::Word));
    }
    tokens
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attribute {
    Login,
    Password,
}

impl Attribute {
    fn from_word(word: &str) -> Option<Self> {
        match word {
            LOGIN_KEYWORD => Some(Attribute::Login),
            PASSWORD_KEYWORD => Some(Attribute::Password),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct PendingRecord {
    host: String,
    raw_tokens: Vec<String>,
    login: String,
    secret: String,
    awaiting: Option<Attribute>,
}

impl PendingRecord {
    fn new(host: &str) -> Self {
        Self {
            host: host.to_string(),
            raw_tokens: Vec::new(),
            login: String::new(),
            secret: String::new(),
            awaiting: None,
        }
    }

    fn accept(&mut self, word: &str) {
        self.raw_tokens.push(word.to_string());

        // The word after a keyword is its value, even when that word is itself a
        // keyword. Every sighting overwrites, so the last `login`/`password` wins.
        match self.awaiting.take() {
            Some(Attribute::Login) => self.login = word.to_string(),
            Some(Attribute::Password) => self.secret = word.to_string(),
            None => {}
        }
        self.awaiting = Attribute::from_word(word);
    }

    fn finish(self) -> CredentialRecord {
        CredentialRecord {
            host: self.host,
            raw_tokens: self.raw_tokens,
            login: self.login,
            secret: self.secret,
        }
    }
}

#[derive(Debug)]
enum State {
    ExpectHost,
    ScanAttributes(PendingRecord),
}

/// Build records from a token stream, in file order.
///
/// Words seen before the first marker form a record of their own, keyed by
/// the first of them. A keyword with no following word leaves its value empty.
pub fn build_records(tokens: &[Token<'_>]) -> Vec<CredentialRecord> {
    let mut records = Vec::new();
    let mut state = State::ExpectHost;

    for token in tokens {
        state = match (state, token) {
            (State::ExpectHost, Token::Machine) => State::ExpectHost,
            (State::ScanAttributes(pending), Token::Machine) => {
                records.push(pending.finish());
                State::ExpectHost
            }
            (State::ExpectHost, Token::Word(host)) => {
                State::ScanAttributes(PendingRecord::new(host))
            }
            (State::ScanAttributes(mut pending), Token::Word(word)) => {
                pending.accept(word);
                State::ScanAttributes(pending)
            }
        };
    }

    if let State::ScanAttributes(pending) = state {
        records.push(pending.finish());
    }

    records
}

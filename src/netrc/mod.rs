// ABOUTME: Reader for netrc-style plain-text credential files.
// ABOUTME: Records are introduced by `machine`; `login` and `password` carry the values.

mod error;
mod lexer;
mod store;

pub use error::{CredentialError, Result};
pub use lexer::{LOGIN_KEYWORD, MACHINE_MARKER, PASSWORD_KEYWORD, Token, tokenize};
pub use store::{Credential, CredentialRecord, CredentialStore, Machines};

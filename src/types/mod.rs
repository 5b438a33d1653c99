// ABOUTME: Validated domain types.
// ABOUTME: Invalid values are rejected when constructed, not when used.

mod target;

pub use target::{ConnectionTarget, DEFAULT_SSH_PORT, TargetError};

// ABOUTME: Library root for netrc-shell - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod controller;
pub mod decode;
pub mod diagnostics;
pub mod error;
pub mod netrc;
pub mod output;
pub mod ssh;
pub mod types;

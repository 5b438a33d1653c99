// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: One optional host argument plus flags overriding the YAML configuration.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "netrc-shell")]
#[command(about = "Interactive remote shell using credentials from a netrc file")]
#[command(version)]
pub struct Cli {
    /// Host to connect to (default 127.0.0.1). Arguments starting with `@` are echoed back.
    #[arg(value_name = "HOST")]
    pub args: Vec<String>,

    /// YAML configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Credential file (default ~/.netrc, or ~/_netrc on Windows)
    #[arg(long, value_name = "PATH")]
    pub netrc: Option<PathBuf>,

    /// SSH port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Poll the channel without sleeping between checks
    #[arg(long)]
    pub busy_poll: bool,

    /// Give up on a command after this long (e.g. "30s", "5m")
    #[arg(long, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Emit one JSON object per command result
    #[arg(long, conflicts_with = "quiet")]
    pub json: bool,

    /// Only print remote output and errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

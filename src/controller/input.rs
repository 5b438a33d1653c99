// ABOUTME: Source of interactive command lines.
// ABOUTME: Reads stdin line by line, printing a prompt before each read.

use async_trait::async_trait;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Line that ends the interactive loop.
pub const TERMINATOR: &str = ".";

pub const PROMPT: &str = "Enter command ... ";

/// Supplies command lines to the controller. `None` means end of input.
#[async_trait]
pub trait CommandSource: Send {
    async fn next_command(&mut self) -> Option<String>;
}

/// Reads commands from standard input.
pub struct StdinSource {
    lines: Lines<BufReader<Stdin>>,
    show_prompt: bool,
}

impl StdinSource {
    pub fn new(show_prompt: bool) -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            show_prompt,
        }
    }
}

#[async_trait]
impl CommandSource for StdinSource {
    async fn next_command(&mut self) -> Option<String> {
        if self.show_prompt {
            print!("{PROMPT}");
            let _ = std::io::stdout().flush();
        }
        match self.lines.next_line().await {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read command");
                None
            }
        }
    }
}

/// Commands from memory, mostly for scripted runs.
#[async_trait]
impl CommandSource for std::collections::VecDeque<String> {
    async fn next_command(&mut self) -> Option<String> {
        self.pop_front()
    }
}

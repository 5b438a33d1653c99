// ABOUTME: Output formatting for CLI feedback and remote command results.
// ABOUTME: Supports normal, quiet (scripts), and JSON output modes.

use crate::ssh::ExecutionResult;
use serde::Serialize;
use std::time::Instant;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Only remote output and errors
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Text destined for the two local streams.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Rendered {
    pub stdout: String,
    pub stderr: String,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => {}
            OutputMode::Json => self.emit_stdout("success", message),
        }
    }

    /// Print a warning message.
    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Warning: {message}"),
            OutputMode::Json => self.emit_stderr("warning", message),
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Error: {message}"),
            OutputMode::Json => self.emit_stderr("error", message),
        }
    }

    /// Print the outcome of one remote command.
    pub fn result(&self, command: &str, result: &ExecutionResult) {
        let rendered = self.render_result(command, result);
        if !rendered.stdout.is_empty() {
            print!("{}", rendered.stdout);
        }
        if !rendered.stderr.is_empty() {
            eprint!("{}", rendered.stderr);
        }
    }

    /// Format a command result without printing it.
    pub fn render_result(&self, command: &str, result: &ExecutionResult) -> Rendered {
        match self.mode {
            OutputMode::Json => {
                let event = ResultEvent {
                    event: "result",
                    command,
                    error: (!result.is_ok()).then_some(result.error_message.as_str()),
                    exit_status: result.exit_status,
                    stdout: result.stdout_text(),
                    stderr: result.stderr_text(),
                };
                Rendered {
                    stdout: serde_json::to_string(&event)
                        .map(|json| format!("{json}\n"))
                        .unwrap_or_default(),
                    stderr: String::new(),
                }
            }
            OutputMode::Normal | OutputMode::Quiet => {
                let mut rendered = Rendered {
                    stdout: result.stdout_text(),
                    stderr: result.stderr_text(),
                };
                if !result.is_ok() {
                    rendered
                        .stderr
                        .push_str(&format!("Error: {}\n", result.error_message));
                } else if self.mode == OutputMode::Normal && result.is_empty() {
                    rendered.stdout.push_str("(no output)\n");
                }
                rendered
            }
        }
    }

    fn event_json(&self, event: &str, message: &str) -> Option<String> {
        let event = JsonEvent {
            event,
            message,
            duration_secs: self.start_time.map(|_| self.elapsed_secs()),
        };
        serde_json::to_string(&event).ok()
    }

    fn emit_stdout(&self, event: &str, message: &str) {
        if let Some(json) = self.event_json(event, message) {
            println!("{json}");
        }
    }

    fn emit_stderr(&self, event: &str, message: &str) {
        if let Some(json) = self.event_json(event, message) {
            eprintln!("{json}");
        }
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

#[derive(Serialize)]
struct ResultEvent<'a> {
    event: &'a str,
    command: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exit_status: Option<u32>,
    stdout: String,
    stderr: String,
}

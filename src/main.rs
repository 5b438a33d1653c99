// ABOUTME: Entry point for the netrc-shell CLI application.
// ABOUTME: Resolves credentials for the host argument and runs the interactive session.

mod cli;

use clap::Parser;
use cli::Cli;
use netrc_shell::config::Config;
use netrc_shell::controller::{SessionController, SessionOutcome, StdinSource, resolve_credentials};
use netrc_shell::error::Result;
use netrc_shell::netrc::CredentialStore;
use netrc_shell::output::{Output, OutputMode};
use netrc_shell::ssh::PollPolicy;
use netrc_shell::types::ConnectionTarget;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const EXIT_FAILURE: u8 = 1;
const EXIT_USAGE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut output = Output::new(mode);

    let config = apply_overrides(Config::load_or_default(cli.config.as_deref())?, &cli);

    let mut store = match &cli.netrc {
        Some(path) => CredentialStore::new(path),
        None => config.credential_store(),
    };
    let resolved = resolve_credentials(&cli.args, &mut store);

    if resolved.is_empty() {
        if !store.message().is_empty() {
            eprintln!("{}", store.message());
        }
        eprintln!("Wrong usage");
        return Ok(ExitCode::from(EXIT_USAGE));
    }

    if resolved.is_sentinel() {
        println!("{}", resolved.host);
        return Ok(ExitCode::SUCCESS);
    }

    let target = match cli.port {
        Some(port) => ConnectionTarget::new(&resolved.host, u32::from(port))?,
        None => config.target_for(&resolved.host)?,
    };

    output.start_timer();
    output.progress(&format!("Connecting to {target} as {}", resolved.login));
    let controller = SessionController::new(config.transport_options(), output)
        .bootstrap_command(config.bootstrap_command.clone());
    let mut source = StdinSource::new(mode == OutputMode::Normal);

    let outcome = controller
        .run(target, &resolved.login, &resolved.secret, &mut source)
        .await?;

    Ok(match outcome {
        SessionOutcome::Completed => {
            controller.output().success("Session closed");
            ExitCode::SUCCESS
        }
        SessionOutcome::AuthenticationRejected => ExitCode::from(EXIT_FAILURE),
    })
}

/// Command-line flags win over the configuration file.
fn apply_overrides(mut config: Config, cli: &Cli) -> Config {
    if cli.busy_poll {
        config.poll = PollPolicy::busy().flush_on_exit(config.poll.flush_on_exit);
    }
    if let Some(timeout) = cli.timeout {
        config.poll = config.poll.timeout(Some(timeout));
    }
    config
}

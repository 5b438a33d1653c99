// ABOUTME: Test support utilities.
// ABOUTME: Tracing setup and live SSH endpoint settings for integration tests.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("netrc_shell=debug".parse().unwrap())
            .add_directive("russh=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// A reachable SSH server with password authentication, described by
/// `NETRC_SHELL_TEST_{HOST,PORT,USER,PASSWORD}`.
#[allow(dead_code)]
pub struct LiveEndpoint {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

#[allow(dead_code)]
impl LiveEndpoint {
    /// Read the endpoint from the environment. Panics with a hint when unset,
    /// which only happens in `--ignored` runs.
    pub fn from_env() -> Self {
        let var = |name: &str| {
            std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set for live SSH tests"))
        };
        let port = std::env::var("NETRC_SHELL_TEST_PORT")
            .ok()
            .map(|p| p.parse().expect("NETRC_SHELL_TEST_PORT must be a port number"))
            .unwrap_or(22);
        Self {
            host: var("NETRC_SHELL_TEST_HOST"),
            port,
            user: var("NETRC_SHELL_TEST_USER"),
            password: var("NETRC_SHELL_TEST_PASSWORD"),
        }
    }
}

// ABOUTME: Integration tests for the netrc-shell binary.
// ABOUTME: Validates argument handling, credential errors and exit codes without a live server.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn shell_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("netrc-shell"))
}

#[test]
fn help_shows_usage() {
    shell_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("HOST"))
        .stdout(predicate::str::contains("--netrc"))
        .stdout(predicate::str::contains("--busy-poll"));
}

#[test]
fn at_argument_is_echoed() {
    let temp_dir = tempfile::tempdir().unwrap();

    shell_cmd()
        .env("HOME", temp_dir.path())
        .arg("@offline")
        .assert()
        .success()
        .stdout("@offline\n");
}

#[test]
fn too_many_arguments_is_wrong_usage() {
    shell_cmd()
        .args(["one", "two"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Wrong usage"));
}

#[test]
fn missing_credential_file_is_reported() {
    let temp_dir = tempfile::tempdir().unwrap();

    shell_cmd()
        .env("HOME", temp_dir.path())
        .env("USERPROFILE", temp_dir.path())
        .arg("box")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("credential file not found"))
        .stderr(predicate::str::contains("Wrong usage"));
}

#[test]
fn explicit_netrc_path_is_used() {
    let temp_dir = tempfile::tempdir().unwrap();
    let netrc = temp_dir.path().join("creds");

    shell_cmd()
        .arg("--netrc")
        .arg(&netrc)
        .arg("box")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("creds"));
}

#[test]
fn unknown_host_prints_sentinel() {
    let temp_dir = tempfile::tempdir().unwrap();
    let netrc = temp_dir.path().join("netrc");
    fs::write(&netrc, "machine known login me password pw\n").unwrap();

    shell_cmd()
        .arg("--netrc")
        .arg(&netrc)
        .arg("stranger")
        .assert()
        .success()
        .stdout("@invalid\n")
        .stderr(predicate::str::contains("Invalid host: stranger"));
}

#[test]
fn unreachable_host_fails() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let temp_dir = tempfile::tempdir().unwrap();
    let netrc = temp_dir.path().join("netrc");
    fs::write(&netrc, "machine 127.0.0.1 login me password pw\n").unwrap();

    shell_cmd()
        .arg("--netrc")
        .arg(&netrc)
        .arg("--port")
        .arg(port.to_string())
        .write_stdin(".\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn bad_config_file_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = temp_dir.path().join("shell.yml");
    fs::write(&config, "port: [not, a, port]\n").unwrap();

    shell_cmd()
        .arg("--config")
        .arg(&config)
        .arg("@x")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("YAML"));
}

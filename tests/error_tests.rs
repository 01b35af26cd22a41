//! Error scenario integration tests

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn composer_bin(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("voice-composer").expect("binary is built");
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env("HOME", config_home.path());
    cmd
}

#[test]
fn invalid_max_duration_is_a_usage_error() {
    let home = TempDir::new().unwrap();
    composer_bin(&home)
        .args(["--max-duration", "forever"])
        .write_stdin("quit\n")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid max-duration"));
}

#[test]
fn invalid_discard_policy_is_rejected_by_clap() {
    let home = TempDir::new().unwrap();
    composer_bin(&home)
        .args(["--discard-policy", "sometimes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn config_get_unknown_key() {
    let home = TempDir::new().unwrap();
    composer_bin(&home)
        .args(["config", "get", "api_key"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown key"));
}

#[test]
fn config_set_unknown_key() {
    let home = TempDir::new().unwrap();
    composer_bin(&home)
        .args(["config", "set", "unknown_key", "value"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Valid keys"));
}

#[test]
fn config_set_invalid_duration() {
    let home = TempDir::new().unwrap();
    composer_bin(&home)
        .args(["config", "set", "max_duration", "invalid"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid duration"));
}

#[test]
fn config_set_invalid_boolean() {
    let home = TempDir::new().unwrap();
    composer_bin(&home)
        .args(["config", "set", "audio_cues", "maybe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'true' or 'false'"));
}

#[test]
fn config_set_invalid_policy() {
    let home = TempDir::new().unwrap();
    composer_bin(&home)
        .args(["config", "set", "discard_policy", "sometimes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("keep-committed"));
}

#[test]
fn config_init_twice_fails() {
    let home = TempDir::new().unwrap();
    composer_bin(&home).args(["config", "init"]).assert().success();
    composer_bin(&home)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn unparseable_config_file_falls_back_to_defaults() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join("voice-composer");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "max_duration = [").unwrap();

    composer_bin(&home).write_stdin("quit\n").assert().success();
}

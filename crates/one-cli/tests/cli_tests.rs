//! Integration tests for the one CLI binary.
//!
//! These tests exercise the actual compiled binary using assert_cmd. None of
//! them reach a registry: they either fail before acquisition or run in
//! bypass mode against a local package directory.

use assert_cmd::Command;
use one_test_utils::TestHome;
use predicates::prelude::*;

/// Get a Command for the one binary, isolated in `home`
fn one_cmd(home: &TestHome) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("one"));
    cmd.env("HOME", home.home())
        .env("ONE_CLI_SKIP_UPDATE_CHECK", "1")
        .env_remove("CLI_HOME")
        .env_remove("CLI_TARGET_PATH")
        .env_remove("LOG_LEVEL")
        .env_remove("ONE_CLI_REGISTRY")
        .env_remove("RUST_LOG");
    cmd
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_help_output() {
    let home = TestHome::new();
    one_cmd(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("installed on demand"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn test_version_output() {
    let home = TestHome::new();
    one_cmd(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("one"));
}

#[test]
fn test_no_command_shows_help_hint() {
    let home = TestHome::new();
    one_cmd(&home)
        .assert()
        .success()
        .stdout(predicate::str::contains("one --help"));
}

// ============================================================================
// Dispatch Tests
// ============================================================================

#[test]
fn test_unknown_command_lists_known_commands() {
    let home = TestHome::new();
    one_cmd(&home)
        .arg("frobnicate")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unknown command 'frobnicate'"))
        .stderr(predicate::str::contains("available commands: init"));
}

#[test]
fn test_settings_commands_are_listed() {
    let home = TestHome::new();
    home.write_settings("[commands]\npublish = \"@acme/publish\"\n");
    one_cmd(&home)
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("available commands: init, publish"));
}

#[test]
fn test_invalid_settings_file_fails() {
    let home = TestHome::new();
    home.write_settings("registry = [not toml");
    one_cmd(&home)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid settings file"));
}

#[test]
fn test_missing_home_fails() {
    let home = TestHome::new();
    one_cmd(&home)
        .env("HOME", home.home().join("does-not-exist"))
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("user home directory does not exist"));
}

#[test]
fn test_target_path_without_manifest_is_no_entry_point() {
    let home = TestHome::new();
    let target = home.mkdir("empty");
    one_cmd(&home)
        .args(["--target-path"])
        .arg(&target)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no entry point"));
}

#[cfg(unix)]
#[test]
fn test_target_path_runs_local_package_and_propagates_exit_code() {
    use one_test_utils::fixtures::write_script;

    let home = TestHome::new();
    let target = home.mkdir("local-init");
    let out = home.home().join("args.txt");
    std::fs::write(target.join("package.json"), r#"{"main":"bin/init"}"#).unwrap();
    write_script(
        &target.join("bin/init"),
        &format!(
            "printf '%s\\n' \"$*|$LOG_LEVEL|$CLI_TARGET_PATH\" > '{}'\nexit 5",
            out.display()
        ),
    );

    one_cmd(&home)
        .args(["-d", "init", "myProject", "--force", "--tp"])
        .arg(&target)
        .assert()
        .code(5);

    let written = std::fs::read_to_string(&out).unwrap();
    assert_eq!(
        written.trim(),
        format!(
            "-d init myProject --force --tp {}|verbose|{}",
            target.display(),
            target.display()
        )
    );
    assert!(!home.store_dir().exists());
}

#[cfg(unix)]
#[test]
fn test_target_path_from_env_file() {
    use one_test_utils::fixtures::write_script;

    let home = TestHome::new();
    let target = home.mkdir("from-env");
    std::fs::write(target.join("package.json"), r#"{"main":"run.sh"}"#).unwrap();
    write_script(&target.join("run.sh"), "exit 0");
    home.write_env(&format!("CLI_TARGET_PATH={}\n", target.display()));

    one_cmd(&home).arg("init").assert().success();
}

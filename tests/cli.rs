mod common;

use assert_cmd::Command;
use common::{build_zip, PROJECT_FILES};
use predicates::prelude::*;
use tempfile::TempDir;

/// The binary with a private HOME and no credentials leaking in from the
/// environment.
fn autogit(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("autogit").unwrap();
    cmd.env_remove("GITHUB_TOKEN")
        .env_remove("GITHUB_USERNAME")
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .current_dir(home.path());
    cmd
}

#[test]
fn test_help_lists_flags() {
    let home = TempDir::new().unwrap();
    autogit(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--private"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_missing_archive_file() {
    let home = TempDir::new().unwrap();
    autogit(&home)
        .args(["missing.zip", "--username", "octocat", "--token", "t"])
        .args(["--output-format", "plain"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Selected archive file does not exist."));
}

#[test]
fn test_missing_username_and_token() {
    let home = TempDir::new().unwrap();
    let archive = build_zip(&home.path().join("project.zip"), PROJECT_FILES);

    autogit(&home)
        .arg(&archive)
        .args(["--output-format", "plain"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Please enter your GitHub username."));

    autogit(&home)
        .arg(&archive)
        .args(["--username", "octocat", "--output-format", "plain"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Please enter your GitHub token."));
}

#[test]
fn test_dry_run_prints_plan_and_remembers_username() {
    let home = TempDir::new().unwrap();
    let archive = build_zip(&home.path().join("my project.zip"), PROJECT_FILES);

    autogit(&home)
        .arg(&archive)
        .args(["--username", "octocat", "--token", "secret", "--dry-run"])
        .args(["--output-format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""repository":"my-project""#))
        .stdout(predicate::str::contains("secret").not());

    // The remembered username satisfies validation on the next run.
    autogit(&home)
        .arg(&archive)
        .args(["--token", "secret", "--dry-run", "--output-format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""username":"octocat""#));
}

#[test]
fn test_invalid_config_exits_with_config_code() {
    let home = TempDir::new().unwrap();
    let archive = build_zip(&home.path().join("project.zip"), PROJECT_FILES);

    autogit(&home)
        .arg(&archive)
        .args(["--api-url", "not a url", "--dry-run"])
        .assert()
        .code(7);
}

#[test]
fn test_generate_config() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("custom.toml");

    autogit(&home)
        .args(["--generate-config", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated sample configuration file"));

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("api_url = \"https://api.github.com\""));
}

//! CLI surface smoke tests: argument parsing, help text, and exit codes
//! for the failure classes that never reach a backend.

use assert_cmd::Command;
use predicates::prelude::*;

fn coinforge() -> Command {
    let mut cmd = Command::cargo_bin("coinforge").unwrap();
    // Keep the test's store and kit output away from any real home
    cmd.env("COINFORGE_HOME", std::env::temp_dir().join("coinforge-smoke"));
    cmd.env_remove("ANTHROPIC_API_KEY");
    cmd
}

#[test]
fn help_lists_the_commands() {
    coinforge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("launch"))
        .stdout(predicate::str::contains("projects"))
        .stdout(predicate::str::contains("explain"));
}

#[test]
fn missing_plan_is_a_config_error() {
    let td = tempfile::TempDir::new().unwrap();
    coinforge()
        .current_dir(td.path())
        .args(["launch", "no-such-plan.toml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no-such-plan.toml"));
}

#[test]
fn invalid_ticker_is_a_validation_error() {
    let td = tempfile::TempDir::new().unwrap();
    std::fs::write(
        td.path().join("plan.toml"),
        "name = \"NovaCoin\"\nticker = \"nvc\"\n",
    )
    .unwrap();
    coinforge()
        .current_dir(td.path())
        .args(["launch", "plan.toml"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Ticker 'nvc' is invalid"));
}

#[test]
fn launch_without_api_key_fails_before_any_task() {
    let td = tempfile::TempDir::new().unwrap();
    std::fs::write(
        td.path().join("plan.toml"),
        "name = \"NovaCoin\"\nticker = \"NVC\"\n",
    )
    .unwrap();
    std::fs::write(
        td.path().join("coinforge.toml"),
        "[llm.anthropic]\nmodel = \"claude-sonnet-4-5\"\n",
    )
    .unwrap();
    coinforge()
        .current_dir(td.path())
        .args(["launch", "plan.toml"])
        .assert()
        .code(70)
        .stderr(predicate::str::contains("ANTHROPIC_API_KEY"));
}

#[test]
fn verify_checks_kit_files_against_the_manifest() {
    let td = tempfile::TempDir::new().unwrap();
    std::fs::write(td.path().join("whitepaper.md"), "# NovaCoin\n").unwrap();
    std::fs::write(
        td.path().join("manifest.json"),
        format!(
            "{{\"project\":\"novacoin\",\"generated_at\":\"2026-08-26T00:00:00Z\",\
             \"files\":[{{\"field\":\"whitepaper\",\"file\":\"whitepaper.md\",\
             \"bytes\":11,\"blake3\":\"{}\"}}]}}",
            blake3::hash(b"# NovaCoin\n").to_hex()
        ),
    )
    .unwrap();

    let dir = td.path().to_str().unwrap().to_string();
    coinforge()
        .args(["verify", &dir])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 files intact"));

    std::fs::write(td.path().join("whitepaper.md"), "# Edited later\n").unwrap();
    coinforge()
        .args(["verify", &dir])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("failed verification"))
        .stderr(predicate::str::contains("whitepaper.md (modified)"));
}

#[test]
fn listing_an_unknown_owner_is_empty_not_an_error() {
    coinforge()
        .args(["projects", "list", "--owner", "nobody"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved projects"));
}

#[test]
fn showing_a_missing_project_is_a_store_error() {
    coinforge()
        .args(["projects", "show", "ghost", "--owner", "nobody"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("not found"));
}

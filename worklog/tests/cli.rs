//! End-to-end tests for the worklog CLI.
//!
//! Each test runs the binary against its own temporary XDG tree so state
//! never leaks between tests or into the developer's real data directory.

use assert_cmd::Command;
use tempfile::TempDir;

fn worklog(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("worklog").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env("XDG_DATA_HOME", home.path().join(".local/share"))
        .env("XDG_STATE_HOME", home.path().join(".local/state"));
    cmd
}

#[test]
fn test_status_with_fresh_state() {
    let home = TempDir::new().unwrap();
    worklog(&home)
        .arg("status")
        .assert()
        .success()
        .stdout(predicates::str::contains("No session running."));
}

#[test]
fn test_session_lifecycle() {
    let home = TempDir::new().unwrap();

    worklog(&home)
        .arg("start")
        .assert()
        .success()
        .stdout(predicates::str::contains("Started work session."));

    worklog(&home)
        .arg("status")
        .assert()
        .success()
        .stdout(predicates::str::contains("Session running"));

    worklog(&home)
        .arg("stop")
        .assert()
        .success()
        .stdout(predicates::str::contains("Stopped after"));

    worklog(&home)
        .arg("stop")
        .assert()
        .success()
        .stdout(predicates::str::contains("No session running."));
}

#[test]
fn test_save_auto_starts_and_records() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("main.rs");
    std::fs::write(&file, "fn main() {\n    println!(\"hi\");\n}\n").unwrap();

    worklog(&home)
        .arg("save")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicates::str::contains("Recorded"))
        .stdout(predicates::str::contains("3 lines, Rust"));

    worklog(&home)
        .arg("status")
        .assert()
        .success()
        .stdout(predicates::str::contains("Session running"))
        .stdout(predicates::str::contains("1 saves"));
}

#[test]
fn test_save_reports_delta_since_last_save() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("main.rs");
    std::fs::write(&file, "fn main() {}\n").unwrap();
    worklog(&home).arg("save").arg(&file).assert().success();

    std::fs::write(&file, "fn main() {\n    work();\n}\n").unwrap();
    worklog(&home)
        .arg("save")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicates::str::contains("+2 since last save"));
}

#[test]
fn test_history_lists_cached_days() {
    let home = TempDir::new().unwrap();

    worklog(&home)
        .arg("history")
        .assert()
        .success()
        .stdout(predicates::str::contains("No cached activity"));

    // a save plus a status query caches today's rollup
    let file = home.path().join("main.rs");
    std::fs::write(&file, "fn main() {}\n").unwrap();
    worklog(&home).arg("save").arg(&file).assert().success();
    worklog(&home).arg("status").assert().success();

    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    worklog(&home)
        .arg("history")
        .assert()
        .success()
        .stdout(predicates::str::contains(today));
}

#[test]
fn test_summary_json_is_well_formed() {
    let home = TempDir::new().unwrap();
    let output = worklog(&home)
        .args(["summary", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert!(value.get("date").is_some());
    assert_eq!(value["save_count"], 0);
}

#[test]
fn test_summary_rejects_bad_date() {
    let home = TempDir::new().unwrap();
    worklog(&home)
        .args(["summary", "--date", "not-a-date"])
        .assert()
        .failure();
}

#[test]
fn test_reset_requires_confirmation() {
    let home = TempDir::new().unwrap();
    worklog(&home)
        .arg("reset")
        .assert()
        .failure()
        .stderr(predicates::str::contains("--yes"));

    worklog(&home)
        .args(["reset", "--yes"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Reset"));
}

#[test]
fn test_post_without_webhook_fails() {
    let home = TempDir::new().unwrap();
    worklog(&home)
        .arg("post")
        .assert()
        .failure()
        .stderr(predicates::str::contains("webhook"));
}

//! End-to-end CLI tests
//!
//! Drives the compiled binary against a temporary data directory.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn costbook(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("costbook").unwrap();
    cmd.env("COSTBOOK_DATA_DIR", data_dir.path());
    cmd
}

#[test]
fn test_init_creates_data_files() {
    let data_dir = TempDir::new().unwrap();

    costbook(&data_dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialization complete!"));

    assert!(data_dir.path().join("data").join("projects.json").exists());
    assert!(data_dir.path().join("data").join("ledgers.json").exists());
    assert!(data_dir.path().join("data").join("events.json").exists());
    assert!(data_dir.path().join("data").join("backstops.json").exists());
}

#[test]
fn test_project_lifecycle() {
    let data_dir = TempDir::new().unwrap();
    costbook(&data_dir).arg("init").assert().success();

    costbook(&data_dir)
        .args(["project", "add", "Riverside Office Park"])
        .args(["--client", "Meridian Holdings"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created project"));

    costbook(&data_dir)
        .args(["project", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Riverside Office Park"));

    costbook(&data_dir)
        .args(["project", "show", "Riverside Office Park"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Meridian Holdings"))
        .stdout(predicate::str::contains("still estimating"));

    costbook(&data_dir)
        .args(["project", "baseline", "Riverside Office Park"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Baselined project"));
}

#[test]
fn test_build_hierarchy_and_record_invoice() {
    let data_dir = TempDir::new().unwrap();
    costbook(&data_dir).arg("init").assert().success();
    costbook(&data_dir)
        .args(["project", "add", "Riverside"])
        .assert()
        .success();

    costbook(&data_dir)
        .args(["item", "add-category", "Riverside", "Concrete Works"])
        .args(["--start", "2025-08-01", "--due", "2025-09-30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created category: 1"));

    costbook(&data_dir)
        .args(["item", "add-line", "Riverside", "1", "Foundation"])
        .args(["--vendor", "Acme Concrete"])
        .args(["--cost", "6000.00"])
        .args(["--start", "2025-08-01", "--due", "2025-08-15"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created vendor line: 1.1"));

    costbook(&data_dir)
        .args(["record", "invoice", "Riverside", "1.1", "6200.00"])
        .args(["--date", "2025-08-10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded Invoice"))
        .stdout(predicate::str::contains("$6200.00"));

    // The category aggregates the recorded cost
    costbook(&data_dir)
        .args(["item", "show", "Riverside", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Actual Cost:   $6200.00"));
}

#[test]
fn test_category_rejects_direct_events() {
    let data_dir = TempDir::new().unwrap();
    costbook(&data_dir).arg("init").assert().success();
    costbook(&data_dir)
        .args(["project", "add", "Riverside"])
        .assert()
        .success();
    costbook(&data_dir)
        .args(["item", "add-category", "Riverside", "Concrete Works"])
        .assert()
        .success();

    costbook(&data_dir)
        .args(["record", "invoice", "Riverside", "1", "100.00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("category"));
}

#[test]
fn test_backstop_eval_reports_reached_rule() {
    let data_dir = TempDir::new().unwrap();
    costbook(&data_dir).arg("init").assert().success();
    costbook(&data_dir)
        .args(["project", "add", "Riverside"])
        .assert()
        .success();
    costbook(&data_dir)
        .args(["item", "add-category", "Riverside", "Concrete Works"])
        .assert()
        .success();
    costbook(&data_dir)
        .args(["item", "add-line", "Riverside", "1", "Foundation"])
        .args(["--cost", "6000.00"])
        .assert()
        .success();

    costbook(&data_dir)
        .args(["backstop", "add", "Riverside"])
        .args(["--scope", "item-line", "--code", "1.1"])
        .args(["--amount", "6000.00"])
        .args(["--severity", "high"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created backstop"));

    costbook(&data_dir)
        .args(["record", "invoice", "Riverside", "1.1", "6200.00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Warning: 1 backstop(s) reached"));

    costbook(&data_dir)
        .args(["backstop", "eval", "Riverside"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[REACHED]"))
        .stdout(predicate::str::contains("1 reached"));
}

#[test]
fn test_report_export_writes_csv() {
    let data_dir = TempDir::new().unwrap();
    costbook(&data_dir).arg("init").assert().success();
    costbook(&data_dir)
        .args(["project", "add", "Riverside"])
        .assert()
        .success();
    costbook(&data_dir)
        .args(["item", "add-category", "Riverside", "Concrete Works"])
        .assert()
        .success();

    let csv_path = data_dir.path().join("evs.csv");
    costbook(&data_dir)
        .args(["report", "export", "Riverside"])
        .arg("--output")
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("exported to"));

    let contents = std::fs::read_to_string(&csv_path).unwrap();
    assert!(contents.contains("Code,Name,Type"));
    assert!(contents.contains("Concrete Works"));
}

#[test]
fn test_unknown_project_fails_with_not_found() {
    let data_dir = TempDir::new().unwrap();
    costbook(&data_dir).arg("init").assert().success();

    costbook(&data_dir)
        .args(["item", "list", "Nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_overview_report() {
    let data_dir = TempDir::new().unwrap();
    costbook(&data_dir).arg("init").assert().success();
    costbook(&data_dir)
        .args(["project", "add", "Riverside"])
        .assert()
        .success();
    costbook(&data_dir)
        .args(["item", "add-category", "Riverside", "Concrete Works"])
        .assert()
        .success();
    costbook(&data_dir)
        .args(["item", "add-line", "Riverside", "1", "Foundation"])
        .args(["--cost", "6000.00", "--revenue", "7000.00"])
        .assert()
        .success();

    costbook(&data_dir)
        .args(["report", "overview", "Riverside"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Project Overview: Riverside"))
        .stdout(predicate::str::contains("$6000.00"))
        .stdout(predicate::str::contains("$7000.00"))
        .stdout(predicate::str::contains("1 categories, 1 vendor lines"));
}

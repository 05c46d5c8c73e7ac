use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn junksweep() -> Command {
    Command::cargo_bin("junksweep").unwrap()
}

/// A home directory whose config points at a catalog matching only the
/// synthetic `.junkx` extension. Keeps every assertion deterministic even
/// though the system temp/log roots are always scanned too.
fn isolated_home() -> TempDir {
    let home = TempDir::new().unwrap();
    let app_dir = home.path().join(".junksweep");
    std::fs::create_dir_all(&app_dir).unwrap();

    let catalog_path = app_dir.join("catalog.toml");
    std::fs::write(
        &catalog_path,
        r#"
[[rules]]
label = "Test junk"
extension = ".junkx"
category = "temp_file"
"#,
    )
    .unwrap();

    std::fs::write(
        app_dir.join("config.toml"),
        format!("catalog_path = {:?}\n", catalog_path),
    )
    .unwrap();

    home
}

fn junksweep_in(home: &Path) -> Command {
    let mut cmd = junksweep();
    cmd.env("HOME", home);
    cmd
}

// ─── Help & version ──────────────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    junksweep()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("clean"))
        .stdout(predicate::str::contains("history"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_version_flag() {
    junksweep()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("junksweep"));
}

#[test]
fn test_no_subcommand_shows_help() {
    junksweep()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

// ─── Scan command ────────────────────────────────────────────────────────────

#[test]
fn test_scan_empty_dir() {
    let home = isolated_home();
    let dir = TempDir::new().unwrap();
    junksweep_in(home.path())
        .args(["scan", dir.path().to_str().unwrap()])
        .assert()
        .success();
}

#[test]
fn test_scan_finds_planted_junk() {
    let home = isolated_home();
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("scratch.junkx"), b"aaaa").unwrap();

    junksweep_in(home.path())
        .args(["scan", dir.path().to_str().unwrap(), "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("scratch.junkx"));
}

#[test]
fn test_scan_json_output() {
    let home = isolated_home();
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("scratch.junkx"), b"bb").unwrap();

    let output = junksweep_in(home.path())
        .args(["scan", dir.path().to_str().unwrap(), "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let doc: serde_json::Value = serde_json::from_slice(&output).expect("valid JSON");
    assert_eq!(doc.get("partial").unwrap().as_bool(), Some(false));
    assert_eq!(doc.get("total_size").unwrap().as_u64(), Some(2));
    let matches = doc.get("matches").unwrap().as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(
        matches[0].get("category").unwrap().as_str(),
        Some("temp_file")
    );
}

#[test]
fn test_scan_category_filter_excludes_other_categories() {
    let home = isolated_home();
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("scratch.junkx"), b"bb").unwrap();

    // the catalog only defines temp_file rules, so a log-only scan is empty
    junksweep_in(home.path())
        .args([
            "scan",
            dir.path().to_str().unwrap(),
            "--categories",
            "log",
            "--no-color",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("scratch.junkx").not());
}

#[test]
fn test_scan_min_size_filter() {
    let home = isolated_home();
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("big.junkx"), vec![0u8; 4096]).unwrap();
    std::fs::write(dir.path().join("small.junkx"), b"x").unwrap();

    junksweep_in(home.path())
        .args([
            "scan",
            dir.path().to_str().unwrap(),
            "--min-size",
            "1000",
            "--no-color",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("big.junkx"))
        .stdout(predicate::str::contains("small.junkx").not());
}

// ─── Clean command ───────────────────────────────────────────────────────────

#[test]
fn test_clean_dry_run_deletes_nothing() {
    let home = isolated_home();
    let dir = TempDir::new().unwrap();
    let junk = dir.path().join("old.junkx");
    std::fs::write(&junk, b"bb").unwrap();

    junksweep_in(home.path())
        .args(["clean", dir.path().to_str().unwrap(), "--dry-run"])
        .assert()
        .success();

    assert!(junk.exists(), "dry run must not delete");
}

#[test]
fn test_clean_with_yes_deletes() {
    let home = isolated_home();
    let dir = TempDir::new().unwrap();
    let junk = dir.path().join("old.junkx");
    std::fs::write(&junk, b"bb").unwrap();

    junksweep_in(home.path())
        .args(["clean", dir.path().to_str().unwrap(), "-y", "--no-color"])
        .assert()
        .success();

    assert!(!junk.exists(), "confirmed clean removes the file");
}

#[test]
fn test_clean_declined_prompt_deletes_nothing() {
    let home = isolated_home();
    let dir = TempDir::new().unwrap();
    let junk = dir.path().join("old.junkx");
    std::fs::write(&junk, b"bb").unwrap();

    junksweep_in(home.path())
        .args(["clean", dir.path().to_str().unwrap(), "--no-color"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing deleted"));

    assert!(junk.exists());
}

#[test]
fn test_clean_json_requires_yes_or_dry_run() {
    let home = isolated_home();
    let dir = TempDir::new().unwrap();
    junksweep_in(home.path())
        .args(["clean", dir.path().to_str().unwrap(), "--format", "json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));
}

#[test]
fn test_clean_json_outcome_shape() {
    let home = isolated_home();
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("old.junkx"), b"bb").unwrap();

    let output = junksweep_in(home.path())
        .args([
            "clean",
            dir.path().to_str().unwrap(),
            "-y",
            "--format",
            "json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let doc: serde_json::Value = serde_json::from_slice(&output).expect("valid JSON");
    assert_eq!(doc.get("deleted").unwrap().as_u64(), Some(1));
    assert_eq!(doc.get("failed").unwrap().as_u64(), Some(0));
    assert!(doc.get("bytes_freed").is_some());
}

#[test]
fn test_confirmed_clean_writes_journal() {
    let home = isolated_home();
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("old.junkx"), b"bb").unwrap();

    junksweep_in(home.path())
        .args(["clean", dir.path().to_str().unwrap(), "-y"])
        .assert()
        .success();

    junksweep_in(home.path())
        .args(["history", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("deleted 1 item"));
}

// ─── History & config ────────────────────────────────────────────────────────

#[test]
fn test_history_empty() {
    let home = isolated_home();
    junksweep_in(home.path())
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("No cleanup sessions"));
}

#[test]
fn test_config_show() {
    let home = isolated_home();
    junksweep_in(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("catalog_path"));
}

#[test]
fn test_config_init() {
    let home = TempDir::new().unwrap();
    junksweep_in(home.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized config"));
    assert!(home.path().join(".junksweep/config.toml").exists());
}

// ─── Completions ─────────────────────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    junksweep()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("junksweep"));
}

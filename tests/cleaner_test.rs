use std::path::PathBuf;

use tempfile::TempDir;

use junksweep::catalog::{Catalog, Platform};
use junksweep::cleaner::{self, journal, CleanOptions, ItemOutcome, SkipReason};
use junksweep::common::cancel::CancelToken;
use junksweep::report::ScanResult;
use junksweep::scanner::{self, ScanOptions};
use junksweep::selection::{SelectionError, SelectionSet};

fn scan(roots: &[PathBuf]) -> ScanResult {
    let opts = ScanOptions {
        concurrency: 2,
        system_roots: Some(Vec::new()),
    };
    scanner::run_scan(
        roots,
        &Catalog::builtin_for(Platform::MacOs),
        &opts,
        &CancelToken::new(),
        |_| {},
    )
    .unwrap()
}

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(".DS_Store"), vec![0u8; 12]).unwrap();
    std::fs::write(dir.path().join("build.log"), vec![0u8; 80]).unwrap();
    let trash = dir.path().join(".Trash");
    std::fs::create_dir_all(trash.join("old")).unwrap();
    std::fs::write(trash.join("old/file.bin"), vec![0u8; 40]).unwrap();
    dir
}

// ─── Scan → select → clean pipeline ───────────────────────────────────────────

#[test]
fn full_pipeline_deletes_everything_selected() {
    let dir = fixture();
    let result = scan(&[dir.path().to_path_buf()]);
    assert_eq!(result.len(), 3);

    let mut selection = SelectionSet::new();
    selection.select_all(&result.view());
    let marked = selection.marked(&result);

    let outcome = cleaner::clean(
        &marked,
        true,
        &CleanOptions::default(),
        &CancelToken::new(),
        |_| {},
    )
    .unwrap();

    assert_eq!(outcome.deleted, 3);
    assert_eq!(outcome.failed, 0);
    assert_eq!(outcome.bytes_freed, 132);

    // a fresh scan confirms the junk is gone
    let rescan = scan(&[dir.path().to_path_buf()]);
    assert!(rescan.is_empty());
}

#[test]
fn partial_selection_leaves_the_rest_alone() {
    let dir = fixture();
    let result = scan(&[dir.path().to_path_buf()]);

    let mut selection = SelectionSet::new();
    let log_path = result
        .matches()
        .iter()
        .find(|m| m.path.ends_with("build.log"))
        .unwrap()
        .path
        .clone();
    selection.toggle(&result, &log_path).unwrap();

    let outcome = cleaner::clean(
        &selection.marked(&result),
        true,
        &CleanOptions::default(),
        &CancelToken::new(),
        |_| {},
    )
    .unwrap();

    assert_eq!(outcome.deleted, 1);
    assert!(!log_path.exists());
    assert!(dir.path().join(".DS_Store").exists());
    assert!(dir.path().join(".Trash").exists());
}

#[test]
fn confirmation_gate_holds_for_any_selection() {
    let dir = fixture();
    let result = scan(&[dir.path().to_path_buf()]);

    let mut selection = SelectionSet::new();
    selection.select_all(&result.view());

    let outcome = cleaner::clean(
        &selection.marked(&result),
        false,
        &CleanOptions::default(),
        &CancelToken::new(),
        |_| {},
    )
    .unwrap();

    assert_eq!(outcome.attempted, 0);
    assert_eq!(outcome.deleted, 0);
    assert!(dir.path().join(".DS_Store").exists());
    assert!(dir.path().join("build.log").exists());
    assert!(dir.path().join(".Trash").exists());
}

#[test]
fn clean_is_idempotent_via_skips() {
    let dir = fixture();
    let result = scan(&[dir.path().to_path_buf()]);

    let mut selection = SelectionSet::new();
    selection.select_all(&result.view());
    let marked = selection.marked(&result);

    let first = cleaner::clean(
        &marked,
        true,
        &CleanOptions::default(),
        &CancelToken::new(),
        |_| {},
    )
    .unwrap();
    assert_eq!(first.deleted, 3);

    // same stale selection again: everything is already gone
    let second = cleaner::clean(
        &marked,
        true,
        &CleanOptions::default(),
        &CancelToken::new(),
        |_| {},
    )
    .unwrap();
    assert_eq!(second.deleted, 0);
    assert_eq!(second.skipped, 3);
    assert!(second
        .items
        .iter()
        .all(|i| i.outcome == ItemOutcome::Skipped(SkipReason::AlreadyGone)));
}

#[test]
fn selecting_dir_and_inner_path_skips_the_inner_one() {
    let dir = TempDir::new().unwrap();
    let trash = dir.path().join(".Trash");
    std::fs::create_dir_all(&trash).unwrap();
    std::fs::write(trash.join("junk.log"), vec![0u8; 9]).unwrap();

    // scan once with Trash enabled for the directory match, and once with a
    // catalog that sees the inner file, to select both identities
    let result = scan(&[dir.path().to_path_buf()]);
    assert_eq!(result.len(), 1);
    let dir_match = &result.matches()[0];

    let inner_catalog =
        Catalog::builtin_for(Platform::MacOs).without_categories(&[junksweep::catalog::Category::Trash]);
    let inner_result = scanner::run_scan(
        &[dir.path().to_path_buf()],
        &inner_catalog,
        &ScanOptions {
            concurrency: 1,
            system_roots: Some(Vec::new()),
        },
        &CancelToken::new(),
        |_| {},
    )
    .unwrap();
    let inner_match = &inner_result.matches()[0];
    assert!(inner_match.path.ends_with("junk.log"));

    let outcome = cleaner::clean(
        &[inner_match, dir_match],
        true,
        &CleanOptions::default(),
        &CancelToken::new(),
        |_| {},
    )
    .unwrap();

    assert!(!trash.exists());
    let dir_report = outcome.items.iter().find(|i| i.path == dir_match.path).unwrap();
    assert_eq!(dir_report.outcome, ItemOutcome::Deleted);
    let inner_report = outcome
        .items
        .iter()
        .find(|i| i.path == inner_match.path)
        .unwrap();
    assert_eq!(
        inner_report.outcome,
        ItemOutcome::Skipped(SkipReason::CoveredByParent)
    );
}

// ─── Selection invariants against real results ────────────────────────────────

#[test]
fn stale_selection_from_prior_scan_is_rejected() {
    let dir = fixture();
    let first = scan(&[dir.path().to_path_buf()]);

    let mut selection = SelectionSet::new();
    selection.select_all(&first.view());

    // delete everything, then rescan
    cleaner::clean(
        &selection.marked(&first),
        true,
        &CleanOptions::default(),
        &CancelToken::new(),
        |_| {},
    )
    .unwrap();
    let fresh = scan(&[dir.path().to_path_buf()]);

    // rebinding drops every stale path instead of silently applying it
    selection.rebind(&fresh);
    assert!(selection.is_empty());

    let stale_path = first.matches()[0].path.clone();
    assert!(matches!(
        selection.toggle(&fresh, &stale_path),
        Err(SelectionError::UnknownPath(_))
    ));
}

// ─── Journal ──────────────────────────────────────────────────────────────────

#[test]
fn confirmed_clean_can_be_journaled() {
    let dir = fixture();
    let journal_dir = TempDir::new().unwrap();
    let result = scan(&[dir.path().to_path_buf()]);

    let mut selection = SelectionSet::new();
    selection.select_all(&result.view());

    let outcome = cleaner::clean(
        &selection.marked(&result),
        true,
        &CleanOptions::default(),
        &CancelToken::new(),
        |_| {},
    )
    .unwrap();

    let path = journal::record_in(&outcome, journal_dir.path()).unwrap();
    assert!(path.exists());

    let records = journal::list_in(journal_dir.path()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].deleted, 3);
    assert_eq!(records[0].bytes_freed, outcome.bytes_freed);
    assert_eq!(records[0].items.len(), 3);
}

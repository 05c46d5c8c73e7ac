use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::Category;
use crate::common::config::Config;

use super::engine::{CleanOutcome, FailureKind, ItemOutcome};

/// Audit record written after every confirmed cleanup. One JSON file per
/// session under the logs directory; failures to write are warnings for the
/// caller, never a reason to fail the clean itself.
#[derive(Debug, Serialize, Deserialize)]
pub struct JournalRecord {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub attempted: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub bytes_freed: u64,
    pub cancelled: bool,
    pub items: Vec<JournalItem>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JournalItem {
    pub path: PathBuf,
    pub category: Category,
    pub size_bytes: u64,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

fn status_of(outcome: &ItemOutcome) -> (String, Option<String>) {
    match outcome {
        ItemOutcome::Deleted => ("deleted".into(), None),
        ItemOutcome::Skipped(reason) => ("skipped".into(), Some(reason.to_string())),
        ItemOutcome::Failed(FailureKind::Other(msg)) => ("failed".into(), Some(msg.clone())),
        ItemOutcome::Failed(kind) => ("failed".into(), Some(kind.to_string())),
    }
}

impl JournalRecord {
    pub fn from_outcome(outcome: &CleanOutcome) -> Self {
        JournalRecord {
            session_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            attempted: outcome.attempted,
            deleted: outcome.deleted,
            skipped: outcome.skipped,
            failed: outcome.failed,
            bytes_freed: outcome.bytes_freed,
            cancelled: outcome.cancelled,
            items: outcome
                .items
                .iter()
                .map(|i| {
                    let (status, detail) = status_of(&i.outcome);
                    JournalItem {
                        path: i.path.clone(),
                        category: i.category,
                        size_bytes: i.size_bytes,
                        status,
                        detail,
                    }
                })
                .collect(),
        }
    }
}

/// Write the outcome to the journal directory, returning the record path
pub fn record(outcome: &CleanOutcome) -> Result<PathBuf> {
    record_in(outcome, &Config::logs_dir())
}

pub fn record_in(outcome: &CleanOutcome, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create journal dir: {}", dir.display()))?;

    let rec = JournalRecord::from_outcome(outcome);
    let path = dir.join(format!("clean-{}.json", rec.session_id));
    let json = serde_json::to_string_pretty(&rec).context("Failed to serialize journal record")?;
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write journal record: {}", path.display()))?;
    Ok(path)
}

/// Load every journal record, newest first
pub fn list() -> Result<Vec<JournalRecord>> {
    list_in(&Config::logs_dir())
}

pub fn list_in(dir: &Path) -> Result<Vec<JournalRecord>> {
    let mut records = Vec::new();
    if !dir.exists() {
        return Ok(records);
    }

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().is_some_and(|e| e == "json") {
            match std::fs::read_to_string(&path)
                .map_err(anyhow::Error::from)
                .and_then(|s| serde_json::from_str::<JournalRecord>(&s).map_err(Into::into))
            {
                Ok(rec) => records.push(rec),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "unreadable journal record")
                }
            }
        }
    }

    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::engine::ItemReport;
    use tempfile::TempDir;

    fn outcome_with_one_deletion() -> CleanOutcome {
        let mut outcome = CleanOutcome::default();
        outcome.attempted = 1;
        outcome.deleted = 1;
        outcome.bytes_freed = 42;
        outcome.items.push(ItemReport {
            path: PathBuf::from("/tmp/x/.DS_Store"),
            category: Category::SystemFile,
            size_bytes: 42,
            outcome: ItemOutcome::Deleted,
        });
        outcome
    }

    #[test]
    fn record_then_list_roundtrip() {
        let dir = TempDir::new().unwrap();
        let outcome = outcome_with_one_deletion();

        let path = record_in(&outcome, dir.path()).unwrap();
        assert!(path.exists());

        let records = list_in(dir.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].deleted, 1);
        assert_eq!(records[0].bytes_freed, 42);
        assert_eq!(records[0].items[0].status, "deleted");
    }

    #[test]
    fn list_ignores_garbage_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("not-a-record.json"), "{{nope").unwrap();
        record_in(&outcome_with_one_deletion(), dir.path()).unwrap();

        let records = list_in(dir.path()).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn empty_dir_lists_nothing() {
        let dir = TempDir::new().unwrap();
        assert!(list_in(dir.path()).unwrap().is_empty());
    }
}

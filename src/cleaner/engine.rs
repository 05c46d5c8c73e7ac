use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::catalog::Category;
use crate::common::cancel::CancelToken;
use crate::common::safety;
use crate::report::Match;

/// Why a selected item was not attempted, or not counted as a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The path was already gone when we got to it
    AlreadyGone,
    /// A selected ancestor directory covers this path; deleting the parent
    /// makes this deletion redundant, not erroneous
    CoveredByParent,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::AlreadyGone => write!(f, "already removed"),
            SkipReason::CoveredByParent => write!(f, "covered by selected parent"),
        }
    }
}

/// Classified deletion failure. Always per-item, never abortive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    PermissionDenied,
    InUse,
    Protected,
    Other(String),
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::PermissionDenied => write!(f, "permission denied"),
            FailureKind::InUse => write!(f, "file is in use"),
            FailureKind::Protected => write!(f, "protected path"),
            FailureKind::Other(msg) => write!(f, "{}", msg),
        }
    }
}

/// Terminal state of one selected item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Deleted,
    Skipped(SkipReason),
    Failed(FailureKind),
}

#[derive(Debug, Clone)]
pub struct ItemReport {
    pub path: PathBuf,
    pub category: Category,
    pub size_bytes: u64,
    pub outcome: ItemOutcome,
}

/// Consolidated result of one cleanup invocation. Immutable once returned.
#[derive(Debug, Default)]
pub struct CleanOutcome {
    pub items: Vec<ItemReport>,
    pub attempted: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub bytes_freed: u64,
    /// True when cancellation stopped the run before every item was tried
    pub cancelled: bool,
}

impl CleanOutcome {
    fn empty() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemReport> {
        self.items
            .iter()
            .filter(|i| matches!(i.outcome, ItemOutcome::Failed(_)))
    }

    fn push(&mut self, report: ItemReport) {
        self.attempted += 1;
        match &report.outcome {
            ItemOutcome::Deleted => {
                self.deleted += 1;
                self.bytes_freed += report.size_bytes;
            }
            ItemOutcome::Skipped(_) => self.skipped += 1,
            ItemOutcome::Failed(_) => self.failed += 1,
        }
        self.items.push(report);
    }
}

/// Incremental cleanup progress
#[derive(Debug, Clone, Copy)]
pub struct CleanProgress {
    pub done: usize,
    pub total: usize,
    pub bytes_freed: u64,
}

#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    /// Worker pool size for parallel deletion. 0 means one worker per core.
    pub concurrency: usize,
}

/// Delete the selected matches and report per-item outcomes.
///
/// `confirmed == false` is a hard no-op gate: nothing is attempted and an
/// empty outcome is returned, whatever the selection holds. Each deletion is
/// isolated — one failure never aborts the rest. A selected path covered by
/// a selected ancestor is skipped up front; the remaining paths are disjoint
/// and deleted in parallel.
pub fn clean(
    selection: &[&Match],
    confirmed: bool,
    options: &CleanOptions,
    cancel: &CancelToken,
    mut on_progress: impl FnMut(CleanProgress),
) -> Result<CleanOutcome> {
    if !confirmed {
        tracing::warn!("cleanup invoked without confirmation; nothing deleted");
        return Ok(CleanOutcome::empty());
    }

    let mut outcome = CleanOutcome::empty();
    let selected_paths: HashSet<&Path> = selection.iter().map(|m| m.path.as_path()).collect();

    // Descendants of selected directories are redundant, not failures
    let mut primary = Vec::new();
    for m in selection {
        if has_selected_ancestor(&m.path, &selected_paths) {
            outcome.push(ItemReport {
                path: m.path.clone(),
                category: m.category(),
                size_bytes: m.size_bytes,
                outcome: ItemOutcome::Skipped(SkipReason::CoveredByParent),
            });
        } else {
            primary.push(*m);
        }
    }

    let total = selection.len();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.concurrency)
        .thread_name(|i| format!("junksweep-clean-{i}"))
        .build()
        .context("Failed to build cleanup worker pool")?;

    let (tx, rx) = crossbeam_channel::unbounded::<ItemReport>();

    std::thread::scope(|s| {
        let primary = &primary;
        let pool = &pool;
        s.spawn(move || {
            pool.scope(|scope| {
                for m in primary {
                    if cancel.is_cancelled() {
                        break;
                    }
                    let tx = tx.clone();
                    scope.spawn(move |_| {
                        let result = delete_match(m);
                        let _ = tx.send(ItemReport {
                            path: m.path.clone(),
                            category: m.category(),
                            size_bytes: m.size_bytes,
                            outcome: result,
                        });
                    });
                }
            });
        });

        for report in rx {
            if let ItemOutcome::Failed(reason) = &report.outcome {
                tracing::debug!(path = %report.path.display(), %reason, "deletion failed");
            }
            outcome.push(report);
            on_progress(CleanProgress {
                done: outcome.attempted,
                total,
                bytes_freed: outcome.bytes_freed,
            });
        }
    });

    outcome.cancelled = cancel.is_cancelled();
    tracing::info!(
        deleted = outcome.deleted,
        skipped = outcome.skipped,
        failed = outcome.failed,
        bytes = outcome.bytes_freed,
        "cleanup finished"
    );
    Ok(outcome)
}

fn has_selected_ancestor(path: &Path, selected: &HashSet<&Path>) -> bool {
    path.ancestors().skip(1).any(|a| selected.contains(a))
}

/// Attempt one deletion. Every outcome is determined independently; the
/// caller never sees an error bubble out of here.
fn delete_match(m: &Match) -> ItemOutcome {
    if safety::is_protected(&m.path) {
        return ItemOutcome::Failed(FailureKind::Protected);
    }

    let result = if m.is_dir {
        std::fs::remove_dir_all(&m.path)
    } else {
        std::fs::remove_file(&m.path)
    };

    match result {
        Ok(()) => ItemOutcome::Deleted,
        Err(e) => classify_error(e),
    }
}

fn classify_error(e: std::io::Error) -> ItemOutcome {
    use std::io::ErrorKind;

    match e.kind() {
        // Removed externally between scan and clean: success-equivalent
        ErrorKind::NotFound => ItemOutcome::Skipped(SkipReason::AlreadyGone),
        ErrorKind::PermissionDenied => ItemOutcome::Failed(FailureKind::PermissionDenied),
        _ => {
            if is_in_use(&e) {
                ItemOutcome::Failed(FailureKind::InUse)
            } else {
                ItemOutcome::Failed(FailureKind::Other(e.to_string()))
            }
        }
    }
}

#[cfg(unix)]
fn is_in_use(e: &std::io::Error) -> bool {
    matches!(e.raw_os_error(), Some(libc::EBUSY) | Some(libc::ETXTBSY))
}

#[cfg(windows)]
fn is_in_use(e: &std::io::Error) -> bool {
    // ERROR_SHARING_VIOLATION / ERROR_LOCK_VIOLATION
    matches!(e.raw_os_error(), Some(32) | Some(33))
}

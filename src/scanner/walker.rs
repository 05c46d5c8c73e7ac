use std::path::{Path, PathBuf};

use chrono::Utc;
use crossbeam_channel::Sender;
use walkdir::WalkDir;

use crate::catalog::Catalog;
use crate::common::cancel::CancelToken;
use crate::report::{Match, SkippedDir};

/// Event stream from traversal workers into the single consuming aggregator
#[derive(Debug)]
pub(crate) enum WalkEvent {
    Found(Match),
    Skipped(SkippedDir),
}

/// Walk one directory, classifying entries against the catalog and spawning
/// subdirectory tasks into the bounded pool. Symbolic links are never
/// followed; an unreadable directory becomes a non-fatal skip record.
pub(crate) fn walk_dir<'s>(
    scope: &rayon::Scope<'s>,
    dir: PathBuf,
    catalog: &'s Catalog,
    cancel: &'s CancelToken,
    tx: Sender<WalkEvent>,
) {
    if cancel.is_cancelled() {
        return;
    }

    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(path = %dir.display(), error = %e, "skipping unreadable directory");
            let _ = tx.send(WalkEvent::Skipped(SkippedDir {
                path: dir,
                reason: e.to_string(),
            }));
            return;
        }
    };

    for entry in entries.filter_map(|e| e.ok()) {
        if cancel.is_cancelled() {
            return;
        }

        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(_) => continue,
        };

        // Never follow symlinks; they can loop or escape the scan scope
        if file_type.is_symlink() {
            continue;
        }

        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();

        if file_type.is_dir() {
            match catalog.evaluate(&name, true) {
                Some(rule) if rule.subtree => {
                    // The whole subtree is one match; do not descend
                    let size = dir_size(&path);
                    let modified = entry.metadata().ok().and_then(|m| m.modified().ok());
                    let _ = tx.send(WalkEvent::Found(Match {
                        path,
                        rule: rule.clone(),
                        size_bytes: size,
                        is_dir: true,
                        modified,
                        discovered: Utc::now(),
                    }));
                }
                matched => {
                    if let Some(rule) = matched {
                        let modified = entry.metadata().ok().and_then(|m| m.modified().ok());
                        let _ = tx.send(WalkEvent::Found(Match {
                            path: path.clone(),
                            rule: rule.clone(),
                            size_bytes: 0,
                            is_dir: true,
                            modified,
                            discovered: Utc::now(),
                        }));
                    }
                    let tx = tx.clone();
                    scope.spawn(move |scope| walk_dir(scope, path, catalog, cancel, tx));
                }
            }
        } else if file_type.is_file() {
            if let Some(rule) = catalog.evaluate(&name, false) {
                let metadata = match entry.metadata() {
                    Ok(m) => m,
                    Err(_) => continue,
                };
                let _ = tx.send(WalkEvent::Found(Match {
                    path,
                    rule: rule.clone(),
                    size_bytes: metadata.len(),
                    is_dir: false,
                    modified: metadata.modified().ok(),
                    discovered: Utc::now(),
                }));
            }
        }
    }
}

/// Total size of all regular files under a directory, symlinks excluded
pub fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.metadata().map(|m| m.len()).unwrap_or(0))
        .sum()
}

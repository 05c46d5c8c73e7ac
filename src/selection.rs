use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::report::{Match, ScanResult, View};

/// Referencing a path outside the current scan result is a caller bug,
/// not a runtime condition to recover from.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("path is not in the current scan result: {0}")]
    UnknownPath(PathBuf),
}

/// Paths marked for deletion. Keyed by path identity and decoupled from any
/// sort or filter view, so re-sorting a display never moves a selection.
/// Lives only for the duration of an interactive session.
#[derive(Debug, Default)]
pub struct SelectionSet {
    paths: HashSet<PathBuf>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the selection state of one path. Returns the new state.
    pub fn toggle(&mut self, result: &ScanResult, path: &Path) -> Result<bool, SelectionError> {
        if !result.contains_path(path) {
            return Err(SelectionError::UnknownPath(path.to_path_buf()));
        }
        if self.paths.remove(path) {
            Ok(false)
        } else {
            self.paths.insert(path.to_path_buf());
            Ok(true)
        }
    }

    /// Mark every match visible in the given view
    pub fn select_all(&mut self, view: &View<'_>) {
        for m in view.iter() {
            self.paths.insert(m.path.clone());
        }
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    pub fn selected(&self) -> &HashSet<PathBuf> {
        &self.paths
    }

    pub fn is_selected(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Drop every selection that is not present in the given result.
    /// Call after a re-scan: stale references must never be carried over.
    pub fn rebind(&mut self, result: &ScanResult) {
        self.paths.retain(|p| result.contains_path(p));
    }

    /// Resolve the selection back to matches for the cleanup executor
    pub fn marked<'a>(&self, result: &'a ScanResult) -> Vec<&'a Match> {
        result
            .matches()
            .iter()
            .filter(|m| self.paths.contains(&m.path))
            .collect()
    }
}

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use chrono::{DateTime, Utc};

use crate::catalog::{Category, Rule};

// ─── Matches ──────────────────────────────────────────────────────────────────

/// A filesystem entry matched by a catalog rule. Fixed at discovery time;
/// re-scanning produces new matches, never in-place updates.
#[derive(Debug, Clone)]
pub struct Match {
    /// Resolved absolute path, unique within one scan result
    pub path: PathBuf,
    /// Back-reference to the rule that claimed this entry
    pub rule: Arc<Rule>,
    /// For subtree matches this is the recursively summed size
    pub size_bytes: u64,
    pub is_dir: bool,
    pub modified: Option<SystemTime>,
    pub discovered: DateTime<Utc>,
}

impl Match {
    pub fn category(&self) -> Category {
        self.rule.category
    }

    pub fn label(&self) -> &str {
        &self.rule.label
    }
}

/// A directory the walker could not list. Non-fatal; the scan continues.
#[derive(Debug, Clone)]
pub struct SkippedDir {
    pub path: PathBuf,
    pub reason: String,
}

// ─── Scan result ──────────────────────────────────────────────────────────────

/// Ordered collection of matches from one scan, in discovery order.
/// Statistics are computed on demand from the full collection and are
/// unaffected by any active sort or filter view.
#[derive(Debug)]
pub struct ScanResult {
    matches: Vec<Match>,
    paths: HashSet<PathBuf>,
    pub skipped: Vec<SkippedDir>,
    /// True when the scan was cancelled before finishing
    pub partial: bool,
    pub duration_secs: f64,
}

impl ScanResult {
    pub fn new(matches: Vec<Match>, skipped: Vec<SkippedDir>, partial: bool) -> Self {
        let paths = matches.iter().map(|m| m.path.clone()).collect::<HashSet<_>>();
        debug_assert_eq!(paths.len(), matches.len(), "duplicate match paths");
        ScanResult {
            matches,
            paths,
            skipped,
            partial,
            duration_secs: 0.0,
        }
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn contains_path(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    pub fn total_size(&self) -> u64 {
        self.matches.iter().map(|m| m.size_bytes).sum()
    }

    pub fn count_by_category(&self) -> HashMap<Category, usize> {
        let mut counts = HashMap::new();
        for m in &self.matches {
            *counts.entry(m.category()).or_insert(0) += 1;
        }
        counts
    }

    pub fn size_by_category(&self) -> HashMap<Category, u64> {
        let mut sizes = HashMap::new();
        for m in &self.matches {
            *sizes.entry(m.category()).or_insert(0) += m.size_bytes;
        }
        sizes
    }

    /// A view over every match, in discovery order
    pub fn view(&self) -> View<'_> {
        View {
            result: self,
            order: (0..self.matches.len()).collect(),
        }
    }
}

// ─── Views ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Size,
    Category,
    Path,
    Discovery,
}

impl SortKey {
    /// Size reads best largest-first; everything else ascending
    pub fn default_direction(self) -> SortDirection {
        match self {
            SortKey::Size => SortDirection::Descending,
            _ => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Filter predicates a front-end can apply to a view
#[derive(Debug, Clone)]
pub enum Filter {
    Category(Category),
    MinSize(u64),
    PathPrefix(PathBuf),
}

impl Filter {
    pub fn matches(&self, m: &Match) -> bool {
        match self {
            Filter::Category(cat) => m.category() == *cat,
            Filter::MinSize(min) => m.size_bytes >= *min,
            Filter::PathPrefix(prefix) => m.path.starts_with(prefix),
        }
    }
}

/// An ordering/subsetting projection over a [`ScanResult`]. Views never copy
/// or mutate match data; sorting and filtering compose by producing new views
/// over the same underlying collection.
#[derive(Debug, Clone)]
pub struct View<'a> {
    result: &'a ScanResult,
    order: Vec<usize>,
}

impl<'a> View<'a> {
    pub fn sorted(mut self, key: SortKey, direction: SortDirection) -> View<'a> {
        let matches = &self.result.matches;
        self.order.sort_by(|&a, &b| {
            let (ma, mb) = (&matches[a], &matches[b]);
            let ord = match key {
                SortKey::Size => ma.size_bytes.cmp(&mb.size_bytes),
                SortKey::Category => ma
                    .category()
                    .cmp(&mb.category())
                    .then_with(|| ma.path.cmp(&mb.path)),
                SortKey::Path => ma.path.cmp(&mb.path),
                SortKey::Discovery => a.cmp(&b),
            };
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
        self
    }

    pub fn filtered(mut self, filter: &Filter) -> View<'a> {
        self.order
            .retain(|&i| filter.matches(&self.result.matches[i]));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Match> + '_ {
        let matches = &self.result.matches;
        self.order.iter().map(move |&i| &matches[i])
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

pub mod walker;

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::catalog::{Catalog, Platform};
use crate::common::cancel::CancelToken;
use crate::report::ScanResult;
use walker::WalkEvent;

/// Incremental scan progress, delivered on every accepted match
#[derive(Debug, Clone, Copy)]
pub struct ScanProgress {
    pub items_found: usize,
    pub bytes_found: u64,
}

/// Options for one scan invocation
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Worker pool size. 0 means one worker per core.
    pub concurrency: usize,

    /// Platform auxiliary roots (system temp/log directories). These are
    /// scanned IN ADDITION to the caller's roots — results outside the
    /// requested roots are documented behavior, not a bug. `None` uses the
    /// fixed per-platform set; embedders and tests may substitute their own.
    pub system_roots: Option<Vec<PathBuf>>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            concurrency: 0,
            system_roots: None,
        }
    }
}

/// The fixed auxiliary roots scanned on every run
pub fn system_roots(platform: Platform) -> Vec<PathBuf> {
    let paths: &[&str] = match platform {
        Platform::MacOs => &[
            "/var/log",
            "/var/logs",
            "/private/var/log",
            "/private/var/logs",
            "/Library/Logs",
        ],
        Platform::Windows => &["C:/Windows/Temp", "C:/Windows/Logs"],
        Platform::Linux => &["/var/log"],
    };
    paths.iter().map(PathBuf::from).collect()
}

/// Default scan root when the caller names none
pub fn default_root(platform: Platform) -> PathBuf {
    match platform {
        Platform::MacOs => PathBuf::from("/Users"),
        Platform::Windows => PathBuf::from("C:/Users"),
        Platform::Linux => PathBuf::from("/home"),
    }
}

/// Run one scan. Each invocation is a fresh traversal with no memory of
/// prior runs. A bounded worker pool walks subtrees in parallel and streams
/// matches to this thread, which aggregates them into the result; progress
/// is reported incrementally through `on_progress`.
pub fn run_scan(
    roots: &[PathBuf],
    catalog: &Catalog,
    options: &ScanOptions,
    cancel: &CancelToken,
    mut on_progress: impl FnMut(ScanProgress),
) -> Result<ScanResult> {
    let start = Instant::now();
    let roots = assemble_roots(roots, options);
    tracing::info!(roots = roots.len(), "starting scan");

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.concurrency)
        .thread_name(|i| format!("junksweep-scan-{i}"))
        .build()
        .context("Failed to build scan worker pool")?;

    let (tx, rx) = crossbeam_channel::unbounded();

    let mut matches = Vec::new();
    let mut skipped = Vec::new();

    std::thread::scope(|s| {
        let roots = &roots;
        let pool = &pool;
        s.spawn(move || {
            pool.scope(|scope| {
                for root in roots {
                    let tx = tx.clone();
                    scope.spawn(move |scope| {
                        walker::walk_dir(scope, root.clone(), catalog, cancel, tx)
                    });
                }
            });
            // dropping the last sender here ends the aggregation loop
        });

        // Single consuming aggregator: dedup by resolved path, then collect.
        // No lock is needed on the collection during traversal.
        let mut seen = HashSet::new();
        let mut bytes_found = 0u64;
        for event in rx {
            match event {
                WalkEvent::Found(m) => {
                    if seen.insert(m.path.clone()) {
                        bytes_found += m.size_bytes;
                        matches.push(m);
                        on_progress(ScanProgress {
                            items_found: matches.len(),
                            bytes_found,
                        });
                    }
                }
                WalkEvent::Skipped(skip) => skipped.push(skip),
            }
        }
    });

    let mut result = ScanResult::new(matches, skipped, cancel.is_cancelled());
    result.duration_secs = start.elapsed().as_secs_f64();
    tracing::info!(
        matches = result.len(),
        bytes = result.total_size(),
        partial = result.partial,
        "scan finished"
    );
    Ok(result)
}

/// Resolve and combine caller roots with the auxiliary system roots.
/// Roots that no longer exist are dropped with a warning; a root covered by
/// another root is dropped so overlapping roots cannot double-count.
fn assemble_roots(user_roots: &[PathBuf], options: &ScanOptions) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    for root in user_roots {
        match root.canonicalize() {
            Ok(resolved) => candidates.push(resolved),
            Err(e) => {
                tracing::warn!(path = %root.display(), error = %e, "scan root not accessible")
            }
        }
    }

    let aux = options
        .system_roots
        .clone()
        .unwrap_or_else(|| system_roots(Platform::current()));
    for root in aux {
        if let Ok(resolved) = root.canonicalize() {
            candidates.push(resolved);
        }
    }

    candidates.sort();
    candidates.dedup();

    let mut roots: Vec<PathBuf> = Vec::new();
    for candidate in candidates {
        if !roots.iter().any(|r| candidate.starts_with(r)) {
            roots.push(candidate);
        }
    }
    roots
}

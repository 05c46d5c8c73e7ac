use colored::*;
use serde::Serialize;
use std::io::Write;
use std::time::SystemTime;

use crate::catalog::Category;
use crate::cleaner::{CleanOutcome, ItemOutcome};
use crate::common::format;
use crate::report::{ScanResult, View};

fn category_key(category: Category) -> &'static str {
    match category {
        Category::SystemFile => "system_file",
        Category::Cache => "cache",
        Category::TempFile => "temp_file",
        Category::Log => "log",
        Category::Trash => "trash",
    }
}

fn format_modified(modified: Option<SystemTime>) -> String {
    match modified {
        Some(t) => {
            let dt: chrono::DateTime<chrono::Local> = t.into();
            dt.format("%Y-%m-%d %H:%M:%S").to_string()
        }
        None => "-".to_string(),
    }
}

// ─── Scan output ──────────────────────────────────────────────────────────────

pub fn print_scan_table(view: &View<'_>) {
    if view.is_empty() {
        println!("{}", "No junk files found.".green());
        return;
    }

    println!();
    println!(
        "  {:<16} {:>10}  {:<19}  {}",
        "CATEGORY".bold(),
        "SIZE".bold(),
        "MODIFIED".bold(),
        "PATH".bold()
    );

    for m in view.iter() {
        let kind = if m.is_dir { "📁" } else { "📄" };
        println!(
            "  {:<16} {:>10}  {:<19}  {} {}",
            m.category().to_string().cyan(),
            format::format_size(m.size_bytes).green(),
            format_modified(m.modified).dimmed(),
            kind,
            format::format_path(&m.path)
        );
    }
    println!();
}

pub fn print_scan_summary(result: &ScanResult) {
    let sizes = result.size_by_category();
    let counts = result.count_by_category();

    if !counts.is_empty() {
        println!("{}", "By category:".bold());
        let mut categories: Vec<_> = counts.keys().copied().collect();
        categories.sort();
        for cat in categories {
            println!(
                "  {:<16} {:>6}  {:>10}",
                cat.to_string(),
                format::format_count(counts[&cat]),
                format::format_size(sizes.get(&cat).copied().unwrap_or(0)).green()
            );
        }
        println!();
    }

    println!(
        "Found {} totalling {} in {}",
        format::format_count(result.len()).bold(),
        format::format_size(result.total_size()).green().bold(),
        format::format_duration(result.duration_secs)
    );

    if !result.skipped.is_empty() {
        println!(
            "{}",
            format!(
                "Skipped {} unreadable director{}",
                result.skipped.len(),
                if result.skipped.len() == 1 { "y" } else { "ies" }
            )
            .yellow()
        );
    }

    if result.partial {
        println!(
            "{}",
            "Scan was cancelled; results are partial.".yellow().bold()
        );
    }
}

#[derive(Serialize)]
struct JsonScan<'a> {
    partial: bool,
    duration_secs: f64,
    total_size: u64,
    counts: std::collections::BTreeMap<&'static str, usize>,
    sizes: std::collections::BTreeMap<&'static str, u64>,
    matches: Vec<JsonMatch>,
    skipped: Vec<JsonSkipped<'a>>,
}

#[derive(Serialize)]
struct JsonMatch {
    path: String,
    category: &'static str,
    label: String,
    size_bytes: u64,
    is_dir: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified: Option<String>,
}

#[derive(Serialize)]
struct JsonSkipped<'a> {
    path: String,
    reason: &'a str,
}

pub fn scan_to_json(result: &ScanResult, view: &View<'_>) -> String {
    let doc = JsonScan {
        partial: result.partial,
        duration_secs: result.duration_secs,
        total_size: result.total_size(),
        counts: result
            .count_by_category()
            .into_iter()
            .map(|(c, n)| (category_key(c), n))
            .collect(),
        sizes: result
            .size_by_category()
            .into_iter()
            .map(|(c, n)| (category_key(c), n))
            .collect(),
        matches: view
            .iter()
            .map(|m| JsonMatch {
                path: m.path.display().to_string(),
                category: category_key(m.category()),
                label: m.label().to_string(),
                size_bytes: m.size_bytes,
                is_dir: m.is_dir,
                modified: m.modified.map(|t| format_modified(Some(t))),
            })
            .collect(),
        skipped: result
            .skipped
            .iter()
            .map(|s| JsonSkipped {
                path: s.path.display().to_string(),
                reason: &s.reason,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&doc).expect("scan report serializes")
}

// ─── Clean output ─────────────────────────────────────────────────────────────

pub fn print_outcome(outcome: &CleanOutcome) {
    for item in outcome.failures() {
        if let ItemOutcome::Failed(reason) = &item.outcome {
            println!(
                "  {} {}: {}",
                "✗".red(),
                format::format_path(&item.path),
                reason.to_string().red()
            );
        }
    }

    println!(
        "Deleted {} ({} freed), {} skipped, {} failed",
        format::format_count(outcome.deleted).bold(),
        format::format_size(outcome.bytes_freed).green().bold(),
        outcome.skipped,
        if outcome.failed > 0 {
            outcome.failed.to_string().red().to_string()
        } else {
            outcome.failed.to_string()
        }
    );

    if outcome.failed > 0 {
        println!("{}", "Some items failed; try re-running with more privileges.".yellow());
    }
    if outcome.cancelled {
        println!("{}", "Cleanup was cancelled before finishing.".yellow().bold());
    }
}

#[derive(Serialize)]
struct JsonOutcome {
    attempted: usize,
    deleted: usize,
    skipped: usize,
    failed: usize,
    bytes_freed: u64,
    cancelled: bool,
    items: Vec<JsonOutcomeItem>,
}

#[derive(Serialize)]
struct JsonOutcomeItem {
    path: String,
    category: &'static str,
    size_bytes: u64,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

pub fn outcome_to_json(outcome: &CleanOutcome) -> String {
    let doc = JsonOutcome {
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
                let (status, detail) = match &i.outcome {
                    ItemOutcome::Deleted => ("deleted", None),
                    ItemOutcome::Skipped(r) => ("skipped", Some(r.to_string())),
                    ItemOutcome::Failed(r) => ("failed", Some(r.to_string())),
                };
                JsonOutcomeItem {
                    path: i.path.display().to_string(),
                    category: category_key(i.category),
                    size_bytes: i.size_bytes,
                    status,
                    detail,
                }
            })
            .collect(),
    };
    serde_json::to_string_pretty(&doc).expect("clean outcome serializes")
}

// ─── Prompting ────────────────────────────────────────────────────────────────

/// Ask a yes/no question on stdin. Anything but y/yes declines.
pub fn confirm(question: &str) -> bool {
    print!("{} [y/N] ", question.bold());
    let _ = std::io::stdout().flush();

    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

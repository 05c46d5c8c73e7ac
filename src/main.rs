use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use junksweep::catalog::Category;
use junksweep::cleaner::{self, journal, CleanOptions};
use junksweep::cli::args::{CategoryArg, Cli, Commands, CompletionShell, ConfigAction, OutputFormat};
use junksweep::cli::output;
use junksweep::common::cancel::CancelToken;
use junksweep::common::config::Config;
use junksweep::common::format;
use junksweep::report::{Filter, ScanResult, SortKey};
use junksweep::scanner::{self, ScanOptions};
use junksweep::selection::SelectionSet;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("junksweep=debug")
            .init();
    }

    match cli.command {
        Commands::Scan {
            ref paths,
            ref categories,
            min_size,
            sort,
            jobs,
        } => cmd_scan(&cli, paths, categories.as_deref(), min_size, sort.into(), jobs),

        Commands::Clean {
            ref paths,
            ref categories,
            min_size,
            yes,
            dry_run,
            jobs,
        } => cmd_clean(&cli, paths, categories.as_deref(), min_size, yes, dry_run, jobs),

        Commands::History { limit } => cmd_history(&cli, limit),

        Commands::Config { action } => cmd_config(action),

        Commands::Completions { shell } => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            let shell = match shell {
                CompletionShell::Bash => clap_complete::Shell::Bash,
                CompletionShell::Zsh => clap_complete::Shell::Zsh,
                CompletionShell::Fish => clap_complete::Shell::Fish,
            };
            clap_complete::generate(shell, &mut cmd, "junksweep", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Create a cancellation token tripped by Ctrl-C. The process-wide handler
/// can only be installed once, so callers share one token per command.
fn wired_cancel_token() -> CancelToken {
    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    let _ = ctrlc::set_handler(move || handler_token.cancel());
    cancel
}

/// Run one scan with the config-resolved catalog
fn run_scan(
    cli: &Cli,
    paths: &[PathBuf],
    categories: Option<&[CategoryArg]>,
    jobs: Option<usize>,
    cancel: &CancelToken,
) -> Result<ScanResult> {
    let config = Config::load()?;
    let mut catalog = config.load_catalog()?;

    if let Some(selected) = categories {
        let selected: Vec<Category> = selected.iter().map(|&c| c.into()).collect();
        let disabled: Vec<Category> = Category::ALL
            .into_iter()
            .filter(|c| !selected.contains(c))
            .collect();
        catalog = catalog.without_categories(&disabled);
    }

    let mut roots: Vec<PathBuf> = if paths.is_empty() {
        vec![scanner::default_root(catalog.platform())]
    } else {
        paths.to_vec()
    };
    roots.extend(config.extra_roots.iter().cloned());

    let options = ScanOptions {
        concurrency: jobs.unwrap_or(config.concurrency),
        system_roots: None,
    };

    let spinner = if cli.format == OutputFormat::Human {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        pb.set_message("Scanning...");
        Some(pb)
    } else {
        None
    };

    let result = scanner::run_scan(&roots, &catalog, &options, cancel, |p| {
        if let Some(ref pb) = spinner {
            pb.set_message(format!(
                "Scanning... {} found, {}",
                p.items_found,
                format::format_size(p.bytes_found)
            ));
            pb.tick();
        }
    })?;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    Ok(result)
}

fn cmd_scan(
    cli: &Cli,
    paths: &[PathBuf],
    categories: Option<&[CategoryArg]>,
    min_size: Option<u64>,
    sort: SortKey,
    jobs: Option<usize>,
) -> Result<()> {
    let cancel = wired_cancel_token();
    let result = run_scan(cli, paths, categories, jobs, &cancel)?;

    let mut view = result.view();
    if let Some(min) = min_size {
        view = view.filtered(&Filter::MinSize(min));
    }
    view = view.sorted(sort, sort.default_direction());

    match cli.format {
        OutputFormat::Json => println!("{}", output::scan_to_json(&result, &view)),
        OutputFormat::Human => {
            output::print_scan_table(&view);
            output::print_scan_summary(&result);
        }
    }
    Ok(())
}

fn cmd_clean(
    cli: &Cli,
    paths: &[PathBuf],
    categories: Option<&[CategoryArg]>,
    min_size: Option<u64>,
    yes: bool,
    dry_run: bool,
    jobs: Option<usize>,
) -> Result<()> {
    if cli.format == OutputFormat::Json && !yes && !dry_run {
        anyhow::bail!("JSON mode cannot prompt; pass --yes or --dry-run");
    }

    let cancel = wired_cancel_token();
    let result = run_scan(cli, paths, categories, jobs, &cancel)?;

    if result.partial {
        println!("{}", "Scan was cancelled; not cleaning partial results.".yellow());
        return Ok(());
    }

    let mut view = result.view();
    if let Some(min) = min_size {
        view = view.filtered(&Filter::MinSize(min));
    }
    view = view.sorted(SortKey::Size, SortKey::Size.default_direction());

    if view.is_empty() {
        println!("{}", "No junk files found — nothing to clean.".green());
        return Ok(());
    }

    if cli.format == OutputFormat::Human {
        output::print_scan_table(&view);
        output::print_scan_summary(&result);
        println!();
    }

    let mut selection = SelectionSet::new();
    selection.select_all(&view);
    let marked = selection.marked(&result);

    if dry_run {
        match cli.format {
            OutputFormat::Json => println!("{}", output::scan_to_json(&result, &view)),
            OutputFormat::Human => println!(
                "Dry run: {} ({}) would be deleted.",
                format::format_count(marked.len()).bold(),
                format::format_size(marked.iter().map(|m| m.size_bytes).sum::<u64>()).green()
            ),
        }
        return Ok(());
    }

    // The executor enforces this gate too; an unconfirmed clean is a no-op
    let confirmed = yes
        || output::confirm(&format!(
            "Delete {} selected items?",
            marked.len()
        ));

    let bar = if cli.format == OutputFormat::Human && confirmed {
        let pb = ProgressBar::new(marked.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.red} [{bar:40.red/blue}] {pos}/{len} Deleting... {msg}")
                .unwrap()
                .progress_chars("━━░"),
        );
        Some(pb)
    } else {
        None
    };

    let options = CleanOptions {
        concurrency: jobs.unwrap_or(0),
    };
    let outcome = cleaner::clean(&marked, confirmed, &options, &cancel, |p| {
        if let Some(ref pb) = bar {
            pb.set_position(p.done as u64);
            pb.set_message(format::format_size(p.bytes_freed));
        }
    })?;

    if let Some(pb) = bar {
        pb.finish_and_clear();
    }

    if outcome.attempted == 0 && !confirmed {
        println!("{}", "Aborted — nothing deleted.".yellow());
        return Ok(());
    }

    if let Err(e) = journal::record(&outcome) {
        tracing::warn!(error = %e, "failed to write cleanup journal");
    }

    match cli.format {
        OutputFormat::Json => println!("{}", output::outcome_to_json(&outcome)),
        OutputFormat::Human => output::print_outcome(&outcome),
    }
    Ok(())
}

fn cmd_history(cli: &Cli, limit: usize) -> Result<()> {
    let records = journal::list()?;
    let shown: Vec<_> = records.into_iter().take(limit).collect();

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&shown)?);
        }
        OutputFormat::Human => {
            if shown.is_empty() {
                println!("No cleanup sessions recorded.");
                return Ok(());
            }
            for rec in &shown {
                println!(
                    "{}  deleted {} ({}), {} skipped, {} failed{}",
                    rec.timestamp
                        .with_timezone(&chrono::Local)
                        .format("%Y-%m-%d %H:%M:%S")
                        .to_string()
                        .dimmed(),
                    format::format_count(rec.deleted),
                    format::format_size(rec.bytes_freed).green(),
                    rec.skipped,
                    rec.failed,
                    if rec.cancelled { " (cancelled)" } else { "" }
                );
            }
        }
    }
    Ok(())
}

fn cmd_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("{}", toml::to_string_pretty(&config)?);
            println!("# config file: {}", Config::config_path().display());
        }
        ConfigAction::Init => {
            Config::init_dirs()?;
            let path = Config::config_path();
            if !path.exists() {
                Config::default().save().context("Failed to write default config")?;
                println!("Initialized config at {}", path.display());
            } else {
                println!("Config already exists at {}", path.display());
            }
        }
    }
    Ok(())
}

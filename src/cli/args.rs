use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::catalog::Category;
use crate::report::SortKey;

/// junksweep — a rule-driven junk file scanner and cleaner
#[derive(Parser, Debug)]
#[command(
    name = "junksweep",
    version,
    about = "Scan for and remove junk files",
    long_about = "junksweep scans your disk for junk artifacts — caches, logs, temp files,\n\
                   and OS clutter — against a platform-aware rule catalog, then deletes\n\
                   what you approve.",
    after_help = "EXAMPLES:\n  \
        junksweep scan                         Scan the default user directory\n  \
        junksweep scan ~/Projects /opt/data    Scan specific roots\n  \
        junksweep scan --categories log,cache  Only logs and caches\n  \
        junksweep scan --sort path --format json\n  \
        junksweep clean                        Scan, review, confirm, delete\n  \
        junksweep clean --dry-run              Show what would be deleted\n  \
        junksweep clean -y --min-size 1048576  No prompt, only items >= 1 MB\n  \
        junksweep history                      Show past cleanup sessions\n\n\
        System temp/log directories are always scanned in addition to the\n\
        roots you name; results outside your roots are expected."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan for junk files
    Scan {
        /// Roots to scan (default: the platform user directory)
        #[arg(value_name = "PATH")]
        paths: Vec<PathBuf>,

        /// Only include these categories
        #[arg(long, value_delimiter = ',')]
        categories: Option<Vec<CategoryArg>>,

        /// Only list entries of at least this many bytes
        #[arg(long)]
        min_size: Option<u64>,

        /// Sort key for the listing
        #[arg(long, default_value = "size")]
        sort: SortArg,

        /// Worker pool size (0 = one per core)
        #[arg(long, short)]
        jobs: Option<usize>,
    },

    /// Scan, review, and delete junk files
    Clean {
        /// Roots to scan (default: the platform user directory)
        #[arg(value_name = "PATH")]
        paths: Vec<PathBuf>,

        /// Only clean these categories
        #[arg(long, value_delimiter = ',')]
        categories: Option<Vec<CategoryArg>>,

        /// Only clean entries of at least this many bytes
        #[arg(long)]
        min_size: Option<u64>,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,

        /// Show what would be deleted without deleting anything
        #[arg(long)]
        dry_run: bool,

        /// Worker pool size (0 = one per core)
        #[arg(long, short)]
        jobs: Option<usize>,
    },

    /// Show past cleanup sessions from the journal
    History {
        /// Show at most this many sessions
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Initialize junksweep directories and a default config
    Init,
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CategoryArg {
    System,
    Cache,
    Temp,
    Log,
    Trash,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Category {
        match arg {
            CategoryArg::System => Category::SystemFile,
            CategoryArg::Cache => Category::Cache,
            CategoryArg::Temp => Category::TempFile,
            CategoryArg::Log => Category::Log,
            CategoryArg::Trash => Category::Trash,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
    Size,
    Category,
    Path,
    Discovery,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> SortKey {
        match arg {
            SortArg::Size => SortKey::Size,
            SortArg::Category => SortKey::Category,
            SortArg::Path => SortKey::Path,
            SortArg::Discovery => SortKey::Discovery,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

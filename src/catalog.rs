use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─── Core types ───────────────────────────────────────────────────────────────

/// Junk classification attached to every matched entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    SystemFile,
    Cache,
    TempFile,
    Log,
    Trash,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::SystemFile,
        Category::Cache,
        Category::TempFile,
        Category::Log,
        Category::Trash,
    ];
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::SystemFile => write!(f, "System File"),
            Category::Cache => write!(f, "Cache"),
            Category::TempFile => write!(f, "Temporary File"),
            Category::Log => write!(f, "Log"),
            Category::Trash => write!(f, "Trash"),
        }
    }
}

/// Platforms a rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
}

impl Platform {
    /// The platform this process is running on
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }
}

/// What kind of filesystem entry a rule may match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    AnyPath,
    FileOnly,
    DirectoryOnly,
}

/// How a rule matches an entry name. All variants compare case-insensitively.
#[derive(Debug, Clone)]
pub enum MatchKind {
    /// Whole-name equality (`.DS_Store`, `Thumbs.db`)
    ExactName(String),
    /// Name suffix including the dot (`.log`, `.tmp`)
    Extension(String),
    /// Glob over the entry name (`.zcompdump-*`)
    NameGlob(Pattern),
    /// Substring of the entry name (`cache`)
    NameContains(String),
}

impl MatchKind {
    fn matches(&self, name: &str) -> bool {
        match self {
            MatchKind::ExactName(n) => name.eq_ignore_ascii_case(n),
            MatchKind::Extension(ext) => {
                name.len() > ext.len() && name.to_lowercase().ends_with(&ext.to_lowercase())
            }
            MatchKind::NameGlob(pattern) => pattern.matches_with(
                name,
                MatchOptions {
                    case_sensitive: false,
                    ..MatchOptions::new()
                },
            ),
            MatchKind::NameContains(needle) => {
                name.to_lowercase().contains(&needle.to_lowercase())
            }
        }
    }
}

/// A single catalog entry. Immutable once built; loaded once per run.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Human label shown in listings
    pub label: String,
    pub pattern: MatchKind,
    pub category: Category,
    pub scope: Scope,
    /// Directory match claims the whole subtree as one unit
    pub subtree: bool,
    /// Empty means every platform
    pub platforms: Vec<Platform>,
}

impl Rule {
    fn name(label: &str, name: &str, category: Category) -> Self {
        Rule {
            label: label.into(),
            pattern: MatchKind::ExactName(name.into()),
            category,
            scope: Scope::FileOnly,
            subtree: false,
            platforms: Vec::new(),
        }
    }

    fn ext(label: &str, ext: &str, category: Category) -> Self {
        Rule {
            label: label.into(),
            pattern: MatchKind::Extension(ext.into()),
            category,
            scope: Scope::FileOnly,
            subtree: false,
            platforms: Vec::new(),
        }
    }

    fn dir(label: &str, name: &str, category: Category) -> Self {
        Rule {
            label: label.into(),
            pattern: MatchKind::ExactName(name.into()),
            category,
            scope: Scope::DirectoryOnly,
            subtree: true,
            platforms: Vec::new(),
        }
    }

    fn on(mut self, platforms: &[Platform]) -> Self {
        self.platforms = platforms.to_vec();
        self
    }

    fn active_on(&self, platform: Platform) -> bool {
        self.platforms.is_empty() || self.platforms.contains(&platform)
    }
}

// ─── Catalog ──────────────────────────────────────────────────────────────────

/// Ordered rule table. Evaluation is pure: only the entry's name and
/// file/directory kind are consulted, first matching rule wins.
#[derive(Debug, Clone)]
pub struct Catalog {
    rules: Vec<Arc<Rule>>,
    platform: Platform,
}

impl Catalog {
    pub fn new(rules: Vec<Rule>, platform: Platform) -> Self {
        Catalog {
            rules: rules.into_iter().map(Arc::new).collect(),
            platform,
        }
    }

    /// Evaluate an entry against the catalog in declaration order.
    /// Rules inactive on the current platform are skipped entirely.
    pub fn evaluate(&self, name: &str, is_dir: bool) -> Option<&Arc<Rule>> {
        self.rules.iter().find(|rule| {
            if !rule.active_on(self.platform) {
                return false;
            }
            let scope_ok = match rule.scope {
                Scope::AnyPath => true,
                Scope::FileOnly => !is_dir,
                Scope::DirectoryOnly => is_dir,
            };
            scope_ok && rule.pattern.matches(name)
        })
    }

    pub fn rules(&self) -> &[Arc<Rule>] {
        &self.rules
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// A copy of the catalog with every rule in a disabled category removed.
    /// Disabled rules behave exactly like platform-gated ones: a disabled
    /// subtree rule no longer stops descent into its directory.
    pub fn without_categories(&self, disabled: &[Category]) -> Catalog {
        let disabled: HashSet<Category> = disabled.iter().copied().collect();
        Catalog {
            rules: self
                .rules
                .iter()
                .filter(|r| !disabled.contains(&r.category))
                .cloned()
                .collect(),
            platform: self.platform,
        }
    }

    /// The built-in rule table for the current platform
    pub fn builtin() -> Catalog {
        Self::builtin_for(Platform::current())
    }

    pub fn builtin_for(platform: Platform) -> Catalog {
        use Category::*;
        use Platform::*;

        let zcompdump = Pattern::new(".zcompdump-*").expect("static pattern");
        let saved_state = Pattern::new("*.savedState").expect("static pattern");

        let rules = vec![
            // OS metadata files
            Rule::name("Finder metadata", ".DS_Store", SystemFile).on(&[MacOs]),
            Rule::name("Localization marker", ".localized", SystemFile).on(&[MacOs]),
            Rule::name("Explorer thumbnails", "Thumbs.db", SystemFile).on(&[Windows]),
            Rule::name("Folder settings", "desktop.ini", SystemFile).on(&[Windows]),
            Rule::name("Mailcap config", ".mailcap", SystemFile),
            Rule::name("MIME type map", ".mime.types", SystemFile),
            // Shell and tool history
            Rule::name("Vim state", ".viminfo", Log),
            Rule::name("less history", ".lesshst", Log),
            Rule::name("wget HSTS cache", ".wget-hsts", Log),
            Rule::name("Python history", ".python_history", Log),
            Rule::name("Bash history", ".bash_history", Log),
            Rule::name("Zsh history", ".zsh_history", Log),
            Rule::name("Fish history", "fish_history", Log),
            Rule::name("Log database", "Logs.db", Log),
            Rule::name("History database", "history.db", Log),
            Rule {
                label: "Zsh completion dump".into(),
                pattern: MatchKind::NameGlob(zcompdump),
                category: Cache,
                scope: Scope::FileOnly,
                subtree: false,
                platforms: Vec::new(),
            },
            // Junk extensions
            Rule::ext("Log file", ".log", Log),
            Rule::ext("Temp file", ".tmp", TempFile),
            Rule::ext("Temp file", ".temp", TempFile),
            Rule::ext("Cache file", ".cache", Cache),
            Rule::ext("Vim swap file", ".swp", TempFile),
            Rule::ext("Memory dump", ".dmp", Log),
            Rule::ext("Memory dump", ".dump", Log),
            Rule::ext("Crash report", ".crash", Log),
            Rule::ext("Partial file", ".$$$", TempFile),
            Rule::ext("Backup file", ".~", TempFile),
            // Junk directories (subtree-implied)
            Rule::dir("Log directory", "log", Log),
            Rule::dir("Log directory", "logs", Log),
            Rule::dir("Temp directory", "tmp", TempFile),
            Rule::dir("Temp directory", "temp", TempFile),
            Rule::dir("Trash", ".Trash", Trash).on(&[MacOs]),
            Rule::dir("Recycle Bin", "$RECYCLE.BIN", Trash).on(&[Windows]),
            Rule::dir("FSEvents journal", ".fseventsd", SystemFile).on(&[MacOs]),
            Rule::dir("Spotlight index", ".Spotlight-V100", SystemFile).on(&[MacOs]),
            Rule::dir("Zsh session files", ".zsh_sessions", Log),
            Rule::dir("Thumbnail cache", ".thumbnails", Cache),
            Rule::dir("IDLE settings", ".idlerc", Cache),
            Rule::dir("pyinspect cache", ".pyinspect", Cache),
            Rule::dir("Call history", "CallHistoryDB", Log).on(&[MacOs]),
            Rule::dir("Call history", "CallHistoryTransactions", Log).on(&[MacOs]),
            Rule::dir("Bluetooth logs", "BtLog", Log).on(&[MacOs]),
            Rule::dir("Crash logs", "Crash Logs", Log),
            Rule::dir("Plugin crash logs", "Plugin Crash Logs", Log),
            Rule::dir("Crash log buffer", "CrashesLogBuffer", Log),
            Rule::dir("Crash reporter data", "CrashReporter", Log),
            Rule::dir("Bugly crash data", "com.tencent.bugly", Log),
            Rule::dir("Volume information", "System Volume Information", SystemFile)
                .on(&[Windows]),
            Rule::dir("Previous Windows install", "Windows.old", SystemFile).on(&[Windows]),
            Rule::dir("Performance logs", "PerfLogs", Log).on(&[Windows]),
            Rule::dir("Thunder SDK storage", "xl_sdks_kvstorage", Cache),
            Rule {
                label: "Saved application state".into(),
                pattern: MatchKind::NameGlob(saved_state),
                category: Cache,
                scope: Scope::DirectoryOnly,
                subtree: true,
                platforms: vec![MacOs],
            },
            // Catch-all: any directory with "cache" in its name
            Rule {
                label: "Cache directory".into(),
                pattern: MatchKind::NameContains("cache".into()),
                category: Cache,
                scope: Scope::DirectoryOnly,
                subtree: true,
                platforms: Vec::new(),
            },
        ];

        Catalog::new(rules, platform)
    }
}

// ─── Catalog document loading ─────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid rule '{label}': {reason}")]
    Rule { label: String, reason: String },
}

/// On-disk shape of a catalog document. Compiled into [`Rule`]s at load.
#[derive(Debug, Deserialize)]
struct CatalogDoc {
    #[serde(default)]
    rules: Vec<RuleSpec>,
}

#[derive(Debug, Deserialize)]
struct RuleSpec {
    label: String,
    category: Category,

    // Exactly one of these must be present
    name: Option<String>,
    extension: Option<String>,
    glob: Option<String>,
    contains: Option<String>,

    #[serde(default)]
    scope: Option<Scope>,
    #[serde(default)]
    subtree: Option<bool>,
    #[serde(default)]
    platforms: Vec<Platform>,
}

impl RuleSpec {
    fn compile(self) -> Result<Rule, CatalogError> {
        let label = self.label;
        let fail = |reason: &str| CatalogError::Rule {
            label: label.clone(),
            reason: reason.into(),
        };

        let mut patterns = Vec::new();
        if let Some(n) = self.name {
            patterns.push(MatchKind::ExactName(n));
        }
        if let Some(e) = self.extension {
            if !e.starts_with('.') {
                return Err(fail("extension must start with '.'"));
            }
            patterns.push(MatchKind::Extension(e));
        }
        if let Some(g) = self.glob {
            let compiled = Pattern::new(&g).map_err(|e| CatalogError::Rule {
                label: label.clone(),
                reason: format!("bad glob '{}': {}", g, e),
            })?;
            patterns.push(MatchKind::NameGlob(compiled));
        }
        if let Some(c) = self.contains {
            patterns.push(MatchKind::NameContains(c));
        }

        let pattern = match patterns.len() {
            0 => return Err(fail("one of name/extension/glob/contains is required")),
            1 => patterns.remove(0),
            _ => return Err(fail("only one of name/extension/glob/contains is allowed")),
        };

        let scope = self.scope.unwrap_or(match pattern {
            MatchKind::Extension(_) => Scope::FileOnly,
            _ => Scope::AnyPath,
        });

        // Subtree implication only makes sense for directory matches
        let subtree = self.subtree.unwrap_or(scope == Scope::DirectoryOnly);
        if subtree && scope == Scope::FileOnly {
            return Err(fail("subtree=true requires a directory scope"));
        }

        Ok(Rule {
            label,
            pattern,
            category: self.category,
            scope,
            subtree,
            platforms: self.platforms,
        })
    }
}

impl Catalog {
    /// Parse a TOML catalog document into a validated catalog
    pub fn from_toml(doc: &str) -> Result<Catalog, CatalogError> {
        Self::from_toml_for(doc, Platform::current())
    }

    pub fn from_toml_for(doc: &str, platform: Platform) -> Result<Catalog, CatalogError> {
        let doc: CatalogDoc = toml::from_str(doc)?;
        let rules = doc
            .rules
            .into_iter()
            .map(RuleSpec::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Catalog::new(rules, platform))
    }

    pub fn from_path(path: &Path) -> Result<Catalog, CatalogError> {
        let contents = std::fs::read_to_string(path).map_err(|e| CatalogError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&contents)
    }
}

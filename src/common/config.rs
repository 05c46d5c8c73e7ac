use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::catalog::{Catalog, Category};

/// Global junksweep configuration, loaded once at startup from
/// `~/.junksweep/config.toml`. The rule catalog itself may live in a
/// separate document pointed to by `catalog_path`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Worker pool size for scanning and deletion. 0 means one per core.
    #[serde(default)]
    pub concurrency: usize,

    /// Roots scanned in addition to whatever the caller asks for
    #[serde(default)]
    pub extra_roots: Vec<PathBuf>,

    /// Categories excluded from scans
    #[serde(default)]
    pub disabled_categories: Vec<Category>,

    /// Optional rule catalog document; the built-in table is used otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency: 0,
            extra_roots: Vec::new(),
            disabled_categories: Vec::new(),
            catalog_path: None,
        }
    }
}

impl Config {
    /// Get the junksweep data directory (~/.junksweep)
    pub fn data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".junksweep")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        Self::data_dir().join("config.toml")
    }

    /// Get the logs directory (cleanup journal lives here)
    pub fn logs_dir() -> PathBuf {
        Self::data_dir().join("logs")
    }

    /// Load config from file, or fall back to defaults
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        let dir = path.parent().expect("config path has a parent");
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config dir: {}", dir.display()))?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Initialize the junksweep directories
    pub fn init_dirs() -> Result<()> {
        for dir in [Self::data_dir(), Self::logs_dir()] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(())
    }

    /// Build the effective rule catalog: the configured document or the
    /// built-in table, minus disabled categories.
    pub fn load_catalog(&self) -> Result<Catalog> {
        let catalog = match &self.catalog_path {
            Some(path) => Catalog::from_path(path)
                .with_context(|| format!("Failed to load catalog: {}", path.display()))?,
            None => Catalog::builtin(),
        };
        Ok(catalog.without_categories(&self.disabled_categories))
    }
}

//! Configuration management
//!
//! This module handles loading, parsing, and validation of configuration files.
//! The category set lives here because it differs by deployment; everything
//! else falls back to sensible defaults when no config file is present.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{ALL_CATEGORIES, APP_DIR, CONFIG_FILE_LOCAL, CONFIG_FILE_NAME};
use crate::logger;
use crate::view::SortMode;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub categories: CategoriesConfig,
    pub view: ViewConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// One entry of the fixed category set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    /// Accent color used by the presentation layer.
    pub color: String,
}

/// Per-deployment category set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoriesConfig {
    /// Category assigned when none is given, and when loading legacy records
    /// that predate the field. Declared before `entries` so TOML emits the
    /// plain value ahead of the array of tables.
    pub default: String,
    /// Fixed set of categories, in display order. The first entry doubles as
    /// the rendering fallback for category values not found in the set.
    pub entries: Vec<Category>,
}

/// View defaults applied until the user changes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Primary sort key: "recent" or "category".
    pub default_sort: SortMode,
    /// Partition completed tasks after pending ones.
    pub completed_at_end: bool,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Override for the guest task document. Defaults to `tasks.json` under
    /// the platform data directory.
    pub tasks_file: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Enable logging
    pub enabled: bool,
    /// Maximum level recorded: error, warn, info, debug or trace.
    pub level: String,
    /// Explicit log file; default is `taskpad.log` under the platform data dir.
    pub file: Option<PathBuf>,
}

static BUILTIN_CATEGORIES: Lazy<Vec<Category>> = Lazy::new(|| {
    [
        ("Personal", "cyan"),
        ("Work", "emerald"),
        ("Study", "purple"),
        ("Home", "orange"),
        ("Health", "pink"),
    ]
    .into_iter()
    .map(|(name, color)| Category {
        name: name.to_string(),
        color: color.to_string(),
    })
    .collect()
});

impl Default for CategoriesConfig {
    fn default() -> Self {
        Self {
            default: "Personal".to_string(),
            entries: BUILTIN_CATEGORIES.clone(),
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            default_sort: SortMode::Recent,
            completed_at_end: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_string(),
            file: None,
        }
    }
}

impl CategoriesConfig {
    /// Whether `name` is a member of the configured set.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|category| category.name == name)
    }

    /// Category names in display order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|category| category.name.as_str())
    }

    /// Normalize a stored category value: unknown or missing becomes the
    /// default category. Legacy records lacking the field load this way.
    pub fn normalize(&self, raw: Option<&str>) -> String {
        match raw {
            Some(name) if self.contains(name) => name.to_string(),
            _ => self.default.clone(),
        }
    }

    /// Category entry used to render `name`, falling back to the first entry
    /// when the value is not in the set. `None` only for an empty set, which
    /// validation rejects.
    pub fn style_for(&self, name: &str) -> Option<&Category> {
        self.entries
            .iter()
            .find(|category| category.name == name)
            .or_else(|| self.entries.first())
    }
}

impl Config {
    /// Load configuration from file or return defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::find_config_file();

        if let Some(path) = config_path {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in order of precedence
    fn find_config_file() -> Option<PathBuf> {
        // 1. Check current directory
        let current_dir_config = PathBuf::from(CONFIG_FILE_LOCAL);
        if current_dir_config.exists() {
            return Some(current_dir_config);
        }

        // 2. Check XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join(APP_DIR).join(CONFIG_FILE_NAME);
            if xdg_config.exists() {
                return Some(xdg_config);
            }
        }

        None
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.categories.entries.is_empty() {
            anyhow::bail!("at least one category must be configured");
        }

        let mut seen = std::collections::HashSet::new();
        for category in &self.categories.entries {
            if category.name.trim().is_empty() {
                anyhow::bail!("category names cannot be empty");
            }
            if category.name == ALL_CATEGORIES {
                anyhow::bail!("'{ALL_CATEGORIES}' is reserved for the filter sentinel");
            }
            if !seen.insert(category.name.as_str()) {
                anyhow::bail!("duplicate category '{}'", category.name);
            }
        }

        if !self.categories.contains(&self.categories.default) {
            anyhow::bail!(
                "default category '{}' is not in the configured set",
                self.categories.default
            );
        }

        logger::parse_level(&self.logging.level)?;

        Ok(())
    }
}

//! Guest-mode persistence.
//!
//! The whole guest list lives in a single JSON document, mirroring the one
//! local-storage key the original web client wrote. It is read once when guest
//! mode is entered and rewritten wholesale after every mutation. I/O is
//! synchronous on purpose: the payload is tens of records, not thousands.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{CategoriesConfig, StorageConfig};
use crate::constants::{APP_DIR, LOCAL_TASKS_FILE};
use crate::task::{Task, TaskId};

/// On-disk task record. `category` stayed optional after the field was
/// introduced so documents written by older clients keep loading.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredTask {
    id: TaskId,
    text: String,
    completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    created_at: DateTime<Utc>,
}

impl StoredTask {
    fn into_task(self, categories: &CategoriesConfig) -> Task {
        Task {
            id: self.id,
            text: self.text,
            completed: self.completed,
            category: categories.normalize(self.category.as_deref()),
            created_at: self.created_at,
            uid: None,
        }
    }
}

impl From<&Task> for StoredTask {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            text: task.text.clone(),
            completed: task.completed,
            category: Some(task.category.clone()),
            created_at: task.created_at,
        }
    }
}

/// Local task document for guest mode.
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    /// Storage at the default platform location.
    pub fn new() -> Result<Self> {
        let dir = dirs::data_dir()
            .context("no platform data directory available")?
            .join(APP_DIR);
        Ok(Self {
            path: dir.join(LOCAL_TASKS_FILE),
        })
    }

    /// Storage at the configured location, falling back to the platform
    /// default when none is set.
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        match &config.tasks_file {
            Some(path) => Ok(Self::with_path(path.clone())),
            None => Self::new(),
        }
    }

    /// Storage at an explicit file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the guest list. A missing document is an empty list; records with
    /// an unknown or missing category are normalized to the default one.
    pub fn load(&self, categories: &CategoriesConfig) -> Result<Vec<Task>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read task document: {}", self.path.display()))?;
        let stored: Vec<StoredTask> = serde_json::from_str(&raw)
            .with_context(|| format!("Malformed task document: {}", self.path.display()))?;
        Ok(stored.into_iter().map(|task| task.into_task(categories)).collect())
    }

    /// Rewrite the whole document from `tasks`. The new content lands in a
    /// temp file first and is renamed over the document, so a crash mid-write
    /// never leaves a truncated list behind.
    pub fn save(&self, tasks: &[Task]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create storage directory: {}", parent.display()))?;
        }
        let stored: Vec<StoredTask> = tasks.iter().map(StoredTask::from).collect();
        let raw = serde_json::to_string(&stored).context("Failed to serialize task list")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw).with_context(|| format!("Failed to write task document: {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace task document: {}", self.path.display()))
    }
}

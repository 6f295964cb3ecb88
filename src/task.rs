//! Task model shared by both storage backends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::backend::RemoteTask;
use crate::config::CategoriesConfig;

/// Identifier of a task.
///
/// Guest-created tasks carry a timestamp-derived integer; remote tasks carry
/// the string id assigned by the backend. The two identifier spaces are never
/// mixed or reconciled: switching backends replaces the whole list, so
/// uniqueness only has to hold within one backend at a time.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Local(i64),
    Remote(String),
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskId::Local(millis) => write!(f, "{millis}"),
            TaskId::Remote(id) => f.write_str(id),
        }
    }
}

/// A single to-do item.
///
/// Field names serialize in camelCase so a guest list written by the original
/// web client loads unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    /// Trimmed, never empty after create or edit.
    pub text: String,
    pub completed: bool,
    /// Always a member of the configured category set.
    pub category: String,
    /// Set once at creation, immutable afterwards. Primary sort key.
    pub created_at: DateTime<Utc>,
    /// Owning user id; only present on tasks that came from the remote store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

impl Task {
    /// Build a task from a remote record, normalizing a missing or unknown
    /// category to the configured default.
    pub fn from_remote(record: RemoteTask, categories: &CategoriesConfig) -> Self {
        Self {
            id: TaskId::Remote(record.id),
            text: record.text,
            completed: record.completed,
            category: categories.normalize(record.category.as_deref()),
            created_at: record.created_at,
            uid: Some(record.uid),
        }
    }
}

//! Task store adapter.
//!
//! Owns the in-memory task list and dispatches the four mutations (add,
//! toggle, edit, delete) to whichever backend the current session mode
//! selects: the guest-mode local document, or the remote collection scoped to
//! the signed-in user. Exactly one backend is active at a time; switching
//! modes discards the list outright and starts over from the new backend, no
//! reconciliation between the two stores.
//!
//! In remote mode the list is never mutated locally after a write: every
//! mutation goes to the backend and the list is replaced wholesale when the
//! next subscription snapshot arrives. Until then the view shows stale state;
//! that latency window is accepted. Remote mutation failures are logged and
//! dropped, never retried (the remote store stays the single source of truth).

use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use log::error;

use crate::backend::{CreateTaskArgs, RemoteStore, RemoteTask, TaskPatch, TaskSubscription};
use crate::config::CategoriesConfig;
use crate::session::SessionMode;
use crate::storage::LocalStorage;
use crate::task::{Task, TaskId};

enum ActiveBackend {
    Guest {
        /// High-water mark for synthesized ids; keeps them monotonic even
        /// when two adds land in the same millisecond.
        last_id: i64,
    },
    Remote {
        uid: String,
        subscription: TaskSubscription,
    },
}

/// The single owner of the task list.
///
/// The presentation layer reads [`tasks`](TaskStore::tasks) and calls the
/// mutation operations; nothing else writes the list.
pub struct TaskStore {
    storage: LocalStorage,
    remote: Arc<dyn RemoteStore>,
    categories: CategoriesConfig,
    backend: ActiveBackend,
    tasks: Vec<Task>,
    editing: Option<TaskId>,
}

impl TaskStore {
    /// Create a store in guest mode, reading the local document once.
    pub fn new(storage: LocalStorage, remote: Arc<dyn RemoteStore>, categories: CategoriesConfig) -> Result<Self> {
        let tasks = storage.load(&categories)?;
        let last_id = Self::last_local_id(&tasks);
        Ok(Self {
            storage,
            remote,
            categories,
            backend: ActiveBackend::Guest { last_id },
            tasks,
            editing: None,
        })
    }

    /// Replace the active backend to match `mode`. The current list and any
    /// edit in progress are discarded; the new backend loads from scratch.
    /// In authenticated mode the list stays empty until the first snapshot.
    pub async fn switch_mode(&mut self, mode: &SessionMode) -> Result<()> {
        self.editing = None;
        // Tear down the old backend first so a subscription scoped to a
        // stale user never outlives the switch.
        self.backend = ActiveBackend::Guest { last_id: 0 };
        self.tasks = Vec::new();
        match mode {
            SessionMode::Guest => {
                self.tasks = self.storage.load(&self.categories)?;
                self.backend = ActiveBackend::Guest {
                    last_id: Self::last_local_id(&self.tasks),
                };
            }
            SessionMode::Authenticated { uid } => {
                let subscription = self.remote.subscribe(uid).await?;
                self.backend = ActiveBackend::Remote {
                    uid: uid.clone(),
                    subscription,
                };
            }
        }
        Ok(())
    }

    /// Read-only view of the current list.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// True while the guest (local document) backend is active.
    pub fn is_guest(&self) -> bool {
        matches!(self.backend, ActiveBackend::Guest { .. })
    }

    /// Create a task. `text` is trimmed and must be non-empty; the category
    /// is normalized against the configured set.
    pub async fn add(&mut self, text: &str, category: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            bail!("task text is empty");
        }
        let category = self.categories.normalize(Some(category));
        match &mut self.backend {
            ActiveBackend::Guest { last_id } => {
                let id = Utc::now().timestamp_millis().max(*last_id + 1);
                *last_id = id;
                // The id is the creation instant; deriving the sort key from
                // it keeps the two in lockstep even for same-millisecond adds.
                let created_at = DateTime::from_timestamp_millis(id).unwrap_or_else(Utc::now);
                self.tasks.push(Task {
                    id: TaskId::Local(id),
                    text: text.to_string(),
                    completed: false,
                    category,
                    created_at,
                    uid: None,
                });
                self.storage.save(&self.tasks)?;
            }
            ActiveBackend::Remote { uid, .. } => {
                let args = CreateTaskArgs {
                    uid: uid.clone(),
                    text: text.to_string(),
                    category,
                };
                // The list is updated by the next snapshot, not here. A
                // failed submission is logged and dropped; the user retries.
                if let Err(err) = self.remote.create_task(args).await {
                    error!("remote task creation failed: {err}");
                }
            }
        }
        Ok(())
    }

    /// Flip the completion flag of the task `id`.
    pub async fn toggle(&mut self, id: &TaskId) -> Result<()> {
        let Some(task) = self.tasks.iter().find(|task| &task.id == id) else {
            bail!("no task with id {id}");
        };
        let completed = !task.completed;
        match &mut self.backend {
            ActiveBackend::Guest { .. } => {
                if let Some(task) = self.tasks.iter_mut().find(|task| &task.id == id) {
                    task.completed = completed;
                }
                self.storage.save(&self.tasks)?;
            }
            ActiveBackend::Remote { .. } => {
                let patch = TaskPatch {
                    completed: Some(completed),
                    ..TaskPatch::default()
                };
                if let Err(err) = self.remote.update_task(Self::remote_id(id)?, patch).await {
                    error!("remote toggle failed for {id}: {err}");
                }
            }
        }
        Ok(())
    }

    /// Update the text and category of the task `id`. The id and creation
    /// timestamp are immutable.
    pub async fn edit(&mut self, id: &TaskId, text: &str, category: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            bail!("task text is empty");
        }
        if !self.tasks.iter().any(|task| &task.id == id) {
            bail!("no task with id {id}");
        }
        let category = self.categories.normalize(Some(category));
        match &mut self.backend {
            ActiveBackend::Guest { .. } => {
                if let Some(task) = self.tasks.iter_mut().find(|task| &task.id == id) {
                    task.text = text.to_string();
                    task.category = category;
                }
                self.storage.save(&self.tasks)?;
            }
            ActiveBackend::Remote { .. } => {
                let patch = TaskPatch {
                    text: Some(text.to_string()),
                    category: Some(category),
                    completed: None,
                };
                if let Err(err) = self.remote.update_task(Self::remote_id(id)?, patch).await {
                    error!("remote edit failed for {id}: {err}");
                }
            }
        }
        Ok(())
    }

    /// Remove the task `id`, clearing the edit-in-progress marker when it
    /// names the removed task.
    pub async fn delete(&mut self, id: &TaskId) -> Result<()> {
        if self.editing.as_ref() == Some(id) {
            self.editing = None;
        }
        match &mut self.backend {
            ActiveBackend::Guest { .. } => {
                self.tasks.retain(|task| &task.id != id);
                self.storage.save(&self.tasks)?;
            }
            ActiveBackend::Remote { .. } => {
                if let Err(err) = self.remote.delete_task(Self::remote_id(id)?).await {
                    error!("remote delete failed for {id}: {err}");
                }
            }
        }
        Ok(())
    }

    /// Mark `id` as being edited by the presentation layer.
    pub fn begin_edit(&mut self, id: &TaskId) -> Result<()> {
        if !self.tasks.iter().any(|task| &task.id == id) {
            bail!("no task with id {id}");
        }
        self.editing = Some(id.clone());
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    pub fn editing(&self) -> Option<&TaskId> {
        self.editing.as_ref()
    }

    /// Wait for the next remote snapshot and replace the list with it.
    /// Returns `false` without waiting in guest mode, and once the
    /// subscription has closed.
    pub async fn next_snapshot(&mut self) -> bool {
        let records = match &mut self.backend {
            ActiveBackend::Remote { subscription, .. } => subscription.recv().await,
            ActiveBackend::Guest { .. } => return false,
        };
        match records {
            Some(records) => {
                self.apply_snapshot(records);
                true
            }
            None => false,
        }
    }

    /// Replace the list wholesale with an incoming snapshot. The snapshot is
    /// authoritative; nothing from the previous list is merged in.
    fn apply_snapshot(&mut self, records: Vec<RemoteTask>) {
        self.tasks = records
            .into_iter()
            .map(|record| Task::from_remote(record, &self.categories))
            .collect();
        // The task being edited may have been deleted by another session.
        if let Some(id) = self.editing.take() {
            if self.tasks.iter().any(|task| task.id == id) {
                self.editing = Some(id);
            }
        }
    }

    fn last_local_id(tasks: &[Task]) -> i64 {
        tasks
            .iter()
            .filter_map(|task| match &task.id {
                TaskId::Local(millis) => Some(*millis),
                TaskId::Remote(_) => None,
            })
            .max()
            .unwrap_or(0)
    }

    fn remote_id(id: &TaskId) -> Result<&str> {
        match id {
            TaskId::Remote(id) => Ok(id),
            TaskId::Local(_) => bail!("local id {id} used against the remote store"),
        }
    }
}

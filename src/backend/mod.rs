//! Backend boundary for authenticated mode.
//!
//! This module defines the interfaces the task store talks to once a user is
//! signed in: an authentication provider emitting the current session identity,
//! and a per-user remote task collection with full-snapshot change
//! notifications. The hosted service behind them is external; [`memory`]
//! provides an in-process implementation for tests and local development.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};

pub mod memory;

/// Common error types for backend operations.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Account already exists: {0}")]
    AccountExists(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Backend error: {0}")]
    Other(String),
}

/// A task record as stored in the remote collection.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTask {
    pub id: String,
    pub text: String,
    pub completed: bool,
    /// Absent on records written before categories existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Owning user. Every record belongs to exactly one user and is only ever
    /// queried scoped to that user.
    pub uid: String,
}

/// Fields for creating a new remote task. The backend assigns the record id
/// and creation timestamp; the client never picks either.
#[derive(Clone, Debug)]
pub struct CreateTaskArgs {
    pub uid: String,
    pub text: String,
    pub category: String,
}

/// Partial update of a remote task; `None` fields are left untouched.
#[derive(Clone, Debug, Default)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub category: Option<String>,
    pub completed: Option<bool>,
}

/// Live subscription to one user's slice of the task collection.
///
/// Wraps the receiving end of the snapshot channel. Dropping the subscription
/// unsubscribes; the backend stops delivering once the channel closes.
pub struct TaskSubscription {
    rx: mpsc::UnboundedReceiver<Vec<RemoteTask>>,
}

impl TaskSubscription {
    pub fn new(rx: mpsc::UnboundedReceiver<Vec<RemoteTask>>) -> Self {
        Self { rx }
    }

    /// Wait for the next full snapshot. Returns `None` once the backend has
    /// dropped its end, e.g. on shutdown.
    pub async fn recv(&mut self) -> Option<Vec<RemoteTask>> {
        self.rx.recv().await
    }
}

/// Per-user remote task collection.
///
/// Change notifications are full snapshots, never incremental diffs: the
/// subscriber treats every delivery as the authoritative replacement of its
/// local list.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Create a record. The returned task carries the assigned id and
    /// creation timestamp.
    async fn create_task(&self, args: CreateTaskArgs) -> Result<RemoteTask, BackendError>;

    /// Apply a partial field update to the record `id`.
    async fn update_task(&self, id: &str, patch: TaskPatch) -> Result<(), BackendError>;

    /// Delete the record `id`.
    async fn delete_task(&self, id: &str) -> Result<(), BackendError>;

    /// Subscribe to snapshots of `uid`'s tasks, newest first. The current
    /// snapshot is delivered immediately, then one per change.
    async fn subscribe(&self, uid: &str) -> Result<TaskSubscription, BackendError>;
}

/// Current authentication state, as carried by the auth provider's stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    SignedOut,
    Authenticated(AuthUser),
}

/// A signed-in account identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
}

/// Email/password authentication boundary.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, BackendError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, BackendError>;

    async fn sign_out(&self) -> Result<(), BackendError>;

    /// Stream of auth state changes. New receivers observe the current state
    /// first, then every change.
    fn state_changes(&self) -> watch::Receiver<AuthState>;
}

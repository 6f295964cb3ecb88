//! In-memory backend used by tests and local development.
//!
//! Behaves like a tiny hosted service: accounts keyed by email, one task
//! collection queried per user, and snapshot fan-out to live subscriptions
//! after every write. Creation timestamps come from a monotonic server clock
//! so ordering stays stable even for writes within the same millisecond.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::{mpsc, watch, Mutex};
use uuid::Uuid;

use super::{
    AuthProvider, AuthState, AuthUser, BackendError, CreateTaskArgs, RemoteStore, RemoteTask, TaskPatch,
    TaskSubscription,
};

struct Account {
    uid: String,
    password: String,
}

struct Subscriber {
    uid: String,
    tx: mpsc::UnboundedSender<Vec<RemoteTask>>,
}

#[derive(Default)]
struct Collection {
    tasks: HashMap<String, RemoteTask>,
    subscribers: Vec<Subscriber>,
    /// Server clock watermark; keeps assigned timestamps strictly monotonic.
    last_created: Option<DateTime<Utc>>,
}

impl Collection {
    fn snapshot_for(&self, uid: &str) -> Vec<RemoteTask> {
        let mut tasks: Vec<RemoteTask> = self.tasks.values().filter(|task| task.uid == uid).cloned().collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tasks
    }

    /// Push a fresh snapshot to every live subscription scoped to `uid`,
    /// pruning subscribers whose receiving end is gone.
    fn notify(&mut self, uid: &str) {
        let snapshot = self.snapshot_for(uid);
        self.subscribers
            .retain(|sub| sub.uid != uid || sub.tx.send(snapshot.clone()).is_ok());
    }

    fn next_created_at(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.last_created {
            if now <= last {
                now = last + Duration::milliseconds(1);
            }
        }
        self.last_created = Some(now);
        now
    }
}

/// In-process auth provider and remote store.
pub struct MemoryBackend {
    accounts: Mutex<HashMap<String, Account>>,
    collection: Mutex<Collection>,
    state_tx: watch::Sender<AuthState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(AuthState::SignedOut);
        Self {
            accounts: Mutex::new(HashMap::new()),
            collection: Mutex::new(Collection::default()),
            state_tx,
        }
    }

    /// Number of live subscriptions, across all users.
    pub async fn subscriber_count(&self) -> usize {
        let mut collection = self.collection.lock().await;
        collection.subscribers.retain(|sub| !sub.tx.is_closed());
        collection.subscribers.len()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteStore for MemoryBackend {
    async fn create_task(&self, args: CreateTaskArgs) -> Result<RemoteTask, BackendError> {
        let mut collection = self.collection.lock().await;
        let task = RemoteTask {
            id: Uuid::new_v4().to_string(),
            text: args.text,
            completed: false,
            category: Some(args.category),
            created_at: collection.next_created_at(),
            uid: args.uid,
        };
        let uid = task.uid.clone();
        collection.tasks.insert(task.id.clone(), task.clone());
        collection.notify(&uid);
        Ok(task)
    }

    async fn update_task(&self, id: &str, patch: TaskPatch) -> Result<(), BackendError> {
        let mut collection = self.collection.lock().await;
        let task = collection
            .tasks
            .get_mut(id)
            .ok_or_else(|| BackendError::NotFound(id.to_string()))?;
        if let Some(text) = patch.text {
            task.text = text;
        }
        if let Some(category) = patch.category {
            task.category = Some(category);
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        let uid = task.uid.clone();
        collection.notify(&uid);
        Ok(())
    }

    async fn delete_task(&self, id: &str) -> Result<(), BackendError> {
        let mut collection = self.collection.lock().await;
        let task = collection
            .tasks
            .remove(id)
            .ok_or_else(|| BackendError::NotFound(id.to_string()))?;
        collection.notify(&task.uid);
        Ok(())
    }

    async fn subscribe(&self, uid: &str) -> Result<TaskSubscription, BackendError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut collection = self.collection.lock().await;
        // Initial snapshot before the subscriber is registered, so the first
        // delivery is the current state rather than the next change.
        let _ = tx.send(collection.snapshot_for(uid));
        collection.subscribers.push(Subscriber {
            uid: uid.to_string(),
            tx,
        });
        Ok(TaskSubscription::new(rx))
    }
}

#[async_trait]
impl AuthProvider for MemoryBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, BackendError> {
        let accounts = self.accounts.lock().await;
        let account = accounts
            .get(email)
            .ok_or_else(|| BackendError::Auth(format!("no account for {email}")))?;
        if account.password != password {
            return Err(BackendError::Auth("wrong password".to_string()));
        }
        let user = AuthUser {
            uid: account.uid.clone(),
            email: email.to_string(),
        };
        self.state_tx.send_replace(AuthState::Authenticated(user.clone()));
        Ok(user)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, BackendError> {
        let mut accounts = self.accounts.lock().await;
        if accounts.contains_key(email) {
            return Err(BackendError::AccountExists(email.to_string()));
        }
        let account = Account {
            uid: Uuid::new_v4().to_string(),
            password: password.to_string(),
        };
        let user = AuthUser {
            uid: account.uid.clone(),
            email: email.to_string(),
        };
        accounts.insert(email.to_string(), account);
        self.state_tx.send_replace(AuthState::Authenticated(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.state_tx.send_replace(AuthState::SignedOut);
        Ok(())
    }

    fn state_changes(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }
}

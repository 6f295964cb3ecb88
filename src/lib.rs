//! Taskpad - a dual-mode personal task list core
//!
//! This library provides the data and session layer for a small personal
//! task tracker: tasks are created, categorized, toggled, edited and deleted,
//! and persist either to a local document (guest mode) or to a per-user
//! remote collection with snapshot change notifications (authenticated mode).
//! The presentation layer is external; it reads the store, renders the view
//! pipeline's output and dispatches user intents back into the store.
//!
//! # Modules
//!
//! * [`config`] - Application configuration, including the category set
//! * [`session`] - Resolves guest vs. authenticated mode from auth events
//! * [`store`] - Task store adapter over the two persistence backends
//! * [`storage`] - Guest-mode local document persistence
//! * [`backend`] - Remote store and auth provider boundary
//! * [`view`] - Pure filter/sort pipeline producing the rendered ordering

/// Remote backend boundary: auth provider and per-user task collection
pub mod backend;

/// Configuration module for managing application settings
pub mod config;

/// Application constants and default values
pub mod constants;

/// Logging initialisation
pub mod logger;

/// Session mode resolution from the auth state stream
pub mod session;

/// Guest-mode local persistence
pub mod storage;

/// Task store adapter owning the in-memory list
pub mod store;

/// Task model and identifier spaces
pub mod task;

/// View pipeline: filter and sort preferences applied to the raw list
pub mod view;

pub use backend::{AuthProvider, AuthState, AuthUser, BackendError, RemoteStore};
pub use config::Config;
pub use session::{SessionMode, SessionResolver};
pub use storage::LocalStorage;
pub use store::TaskStore;
pub use task::{Task, TaskId};
pub use view::{build_view, CategoryFilter, SortMode, ViewPrefs};

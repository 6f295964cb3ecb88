//! Constants used throughout the application
//!
//! This module centralizes magic strings and default locations so the storage,
//! config and view layers agree on them.

/// Directory name used under the platform config and data directories.
pub const APP_DIR: &str = "taskpad";

/// File holding the guest-mode task list, a single JSON array document.
pub const LOCAL_TASKS_FILE: &str = "tasks.json";

/// Default log file name when file logging is enabled without an explicit path.
pub const LOG_FILE: &str = "taskpad.log";

/// Config file probed in the current directory before the XDG location.
pub const CONFIG_FILE_LOCAL: &str = "taskpad.toml";

/// Config file name under the XDG config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Sentinel filter value that matches every category. Reserved: no category
/// may use it as a name.
pub const ALL_CATEGORIES: &str = "All";

//! View pipeline.
//!
//! Pure derivation of the rendered ordering from the raw task list plus the
//! filter/sort preferences. Recomputed from scratch on every relevant change;
//! the input list is never mutated and no state hides here.

use serde::{Deserialize, Serialize};

use crate::config::ViewConfig;
use crate::constants::ALL_CATEGORIES;
use crate::task::Task;

/// Primary sort key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Newest first by creation time.
    #[default]
    Recent,
    /// Category name A-Z, newest first within a category.
    Category,
}

/// Category filter; `All` is the sentinel that passes everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Category(String),
}

impl CategoryFilter {
    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Category(name) => name == category,
        }
    }

    /// Parse a control-panel value, mapping the sentinel to `All`.
    pub fn from_name(name: &str) -> Self {
        if name == ALL_CATEGORIES {
            CategoryFilter::All
        } else {
            CategoryFilter::Category(name.to_string())
        }
    }
}

/// Rendering preferences for the task list.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewPrefs {
    pub filter: CategoryFilter,
    pub sort: SortMode,
    /// Partition completed tasks after the pending ones, whatever the sort.
    pub completed_at_end: bool,
}

impl Default for ViewPrefs {
    fn default() -> Self {
        Self {
            filter: CategoryFilter::All,
            sort: SortMode::Recent,
            completed_at_end: true,
        }
    }
}

impl ViewPrefs {
    /// Initial preferences for a deployment, before the user changes them.
    pub fn from_config(view: &ViewConfig) -> Self {
        Self {
            filter: CategoryFilter::All,
            sort: view.default_sort,
            completed_at_end: view.completed_at_end,
        }
    }
}

/// Derive the ordered, filtered list to render.
pub fn build_view(tasks: &[Task], prefs: &ViewPrefs) -> Vec<Task> {
    let mut view: Vec<Task> = tasks
        .iter()
        .filter(|task| prefs.filter.matches(&task.category))
        .cloned()
        .collect();
    view.sort_by(|a, b| {
        // The completed-at-end partition takes precedence over the sort key.
        if prefs.completed_at_end && a.completed != b.completed {
            return a.completed.cmp(&b.completed);
        }
        match prefs.sort {
            SortMode::Category => a
                .category
                .cmp(&b.category)
                .then_with(|| b.created_at.cmp(&a.created_at)),
            SortMode::Recent => b.created_at.cmp(&a.created_at),
        }
    });
    view
}

/// Message shown when the filtered view is empty. The wording depends on
/// whether a specific category filter is active.
pub fn empty_state_message(filter: &CategoryFilter) -> String {
    match filter {
        CategoryFilter::All => "All caught up, nothing to do!".to_string(),
        CategoryFilter::Category(name) => format!("No tasks in {name}"),
    }
}

/// Number of pending tasks passing the given filter.
pub fn pending_count(tasks: &[Task], filter: &CategoryFilter) -> usize {
    tasks
        .iter()
        .filter(|task| !task.completed && filter.matches(&task.category))
        .count()
}

/// Number of pending tasks in one category, for the filter buttons.
pub fn pending_count_for(tasks: &[Task], category: &str) -> usize {
    tasks
        .iter()
        .filter(|task| !task.completed && task.category == category)
        .count()
}

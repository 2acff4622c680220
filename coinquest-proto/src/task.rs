//! Task ("todo") records.
//!
//! A task is created pending, may be completed exactly once, and may be
//! deleted from either state. Completion is what earns coins; see the
//! reward calculator in the engine crate.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::category::{Category, CategoryId};

/// Server-assigned identifier of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    /// Wraps a raw server id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw server id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unit of work with a due date and a coin value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Server-assigned identifier.
    pub id: TaskId,
    /// Short title; never empty.
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Category this task belongs to.
    pub category_id: CategoryId,
    /// Coins before the category multiplier is applied.
    pub base_coin_value: u64,
    /// Calendar day the task is due (time of day is not tracked).
    pub due_date: NaiveDate,
    /// Whether the task has been completed.
    pub completed: bool,
    /// Category as embedded in the server record, if it was present.
    ///
    /// Used as the fallback when the category list does not contain
    /// `category_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

/// Validated fields for creating a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    /// Trimmed, non-empty title.
    pub title: String,
    /// Optional description; `None` when the form field was blank.
    pub description: Option<String>,
    /// Category the task is filed under.
    pub category_id: CategoryId,
    /// Coins before the category multiplier is applied.
    pub base_coin_value: u64,
    /// Due day.
    pub due_date: NaiveDate,
}

/// Raw, unvalidated task form input as typed by the user.
///
/// Every field is kept as text so that validation happens in one place,
/// inside the engine, rather than in each screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    /// Title text.
    pub title: String,
    /// Description text (may be blank).
    #[serde(default)]
    pub description: String,
    /// Selected category id, if any was selected.
    pub category_id: Option<CategoryId>,
    /// Base coin value text.
    pub base_coin_value: String,
    /// Due date text (`YYYY-MM-DD` or an RFC 3339 timestamp).
    pub due_date: String,
}

//! Task record and priority levels.

use crate::model::{require_non_empty, ValidationError};
use serde::{Deserialize, Serialize};

/// Task urgency. Serialized as `low` / `medium` / `high`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// Actionable item owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    /// Optional due date, epoch milliseconds.
    pub due_date: Option<i64>,
    pub completed: bool,
    /// Unix epoch milliseconds, set once at creation.
    pub created_at: i64,
}

/// Creation fields for a task; `id` and `created_at` are backend-assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<i64>,
    pub completed: bool,
}

impl TaskDraft {
    /// Creates a draft with default priority and an open completion state.
    pub fn new(user_id: i64, title: impl Into<String>) -> Self {
        Self {
            user_id,
            title: title.into(),
            description: None,
            priority: Priority::default(),
            due_date: None,
            completed: false,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(&self.title, "title")
    }
}

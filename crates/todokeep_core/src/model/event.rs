//! Calendar event record.

use crate::model::{require_non_empty, ValidationError};
use serde::{Deserialize, Serialize};

/// Scheduled occurrence owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    /// Scheduled date, epoch milliseconds. Required for every event.
    pub event_date: i64,
    pub location: Option<String>,
    /// Unix epoch milliseconds, set once at creation.
    pub created_at: i64,
}

/// Creation fields for an event; `id` and `created_at` are backend-assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub event_date: i64,
    pub location: Option<String>,
}

impl EventDraft {
    pub fn new(user_id: i64, title: impl Into<String>, event_date: i64) -> Self {
        Self {
            user_id,
            title: title.into(),
            description: None,
            event_date,
            location: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(&self.title, "title")
    }
}

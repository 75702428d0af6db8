//! Free-text note record.

use crate::model::{require_non_empty, ValidationError};
use serde::{Deserialize, Serialize};

/// Titled free-text note owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: Option<String>,
    /// Unix epoch milliseconds, set once at creation.
    pub created_at: i64,
}

/// Creation fields for a note; `id` and `created_at` are backend-assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub user_id: i64,
    pub title: String,
    pub content: Option<String>,
}

impl NoteDraft {
    pub fn new(user_id: i64, title: impl Into<String>) -> Self {
        Self {
            user_id,
            title: title.into(),
            content: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(&self.title, "title")
    }
}

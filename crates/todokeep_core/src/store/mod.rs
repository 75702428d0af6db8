//! Storage port: one CRUD contract, two backend implementations.
//!
//! # Responsibility
//! - Define the `EntityStore` trait every backend implements.
//! - Convert backend transport faults into the shared `StoreError` taxonomy
//!   at this boundary; nothing lower-level escapes to service code.
//!
//! # Invariants
//! - Both backends produce identical results for identical operation
//!   sequences, excluding id spacing and `created_at` timing.
//! - List orderings (including tiebreaks) are identical across backends.

use crate::db::DbError;
use crate::model::event::{Event, EventDraft};
use crate::model::note::{Note, NoteDraft};
use crate::model::task::{Task, TaskDraft};
use crate::model::user::{User, UserDraft};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

pub mod fallback;
pub mod sqlite;

pub use fallback::JsonStore;
pub use sqlite::SqliteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Which storage strategy a service instance ended up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Embedded SQLite database.
    Sqlite,
    /// Flat per-collection JSON lists.
    Fallback,
}

impl Display for Backend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite => write!(f, "sqlite"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// Backend-level fault, produced only at the storage-port boundary.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Io(std::io::Error),
    Serde(serde_json::Error),
    /// Corrupt persisted state or non-transport machinery failure.
    Internal(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "database error: {err}"),
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Serde(err) => write!(f, "serialization error: {err}"),
            Self::Internal(message) => write!(f, "{message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Serde(err) => Some(err),
            Self::Internal(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

/// Uniform CRUD contract over both storage strategies.
///
/// # Contract
/// - `insert_*` assigns `id` and `created_at` and returns the completed
///   record.
/// - `*_for_owner` returns only records with a matching `user_id`:
///   Tasks/Notes newest-first by `created_at` (id as tiebreak), Events
///   soonest-first by `event_date` (id as tiebreak).
/// - `toggle_task_completed` / `delete_*` return whether a record was
///   affected; an unknown id yields `Ok(false)`, not an error.
pub trait EntityStore {
    fn insert_user(&mut self, draft: UserDraft) -> StoreResult<User>;
    /// Looks up a user whose username OR email equals `identifier`.
    fn find_user(&self, identifier: &str) -> StoreResult<Option<User>>;
    fn user_exists(&self, username: &str, email: &str) -> StoreResult<bool>;

    fn insert_task(&mut self, draft: TaskDraft) -> StoreResult<Task>;
    fn tasks_for_owner(&self, user_id: i64) -> StoreResult<Vec<Task>>;
    fn toggle_task_completed(&mut self, id: i64) -> StoreResult<bool>;
    fn delete_task(&mut self, id: i64) -> StoreResult<bool>;

    fn insert_event(&mut self, draft: EventDraft) -> StoreResult<Event>;
    fn events_for_owner(&self, user_id: i64) -> StoreResult<Vec<Event>>;
    fn delete_event(&mut self, id: i64) -> StoreResult<bool>;

    fn insert_note(&mut self, draft: NoteDraft) -> StoreResult<Note>;
    fn notes_for_owner(&self, user_id: i64) -> StoreResult<Vec<Note>>;
    fn delete_note(&mut self, id: i64) -> StoreResult<bool>;
}

/// Current wall-clock time as epoch milliseconds.
///
/// Creation timestamps come from here in both backends so that insertion
/// order and `created_at` order agree.
pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

//! Storage selection and the CRUD facade.
//!
//! # Responsibility
//! - Decide once per service instance whether SQLite is usable, degrading
//!   to the flat JSON-list backend on any failure or timeout.
//! - Expose create/list/toggle/delete entry points for Task/Event/Note,
//!   validating drafts before any persistence attempt.
//!
//! # Invariants
//! - The backend choice is sticky for the lifetime of the instance.
//! - Repository calls made before `initialize()` trigger initialization
//!   lazily; callers never observe an uninitialized store.
//! - SQLite failures never surface to callers as fatal; only a fallback
//!   bootstrap failure does.

use crate::db::open_db;
use crate::model::event::{Event, EventDraft};
use crate::model::note::{Note, NoteDraft};
use crate::model::task::{Task, TaskDraft};
use crate::model::ValidationError;
use crate::store::{Backend, EntityStore, JsonStore, SqliteStore, StoreError, StoreResult};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// How long SQLite may take to open before the service falls back.
pub const DEFAULT_SQLITE_TIMEOUT: Duration = Duration::from_secs(10);

const DB_FILE: &str = "todokeep.db";
const FALLBACK_DIR: &str = "fallback";

pub type DataResult<T> = Result<T, DataError>;

/// Failure returned by CRUD facade operations.
#[derive(Debug)]
pub enum DataError {
    Validation(ValidationError),
    Store(StoreError),
}

impl Display for DataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DataError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<ValidationError> for DataError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for DataError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Where the service keeps its state and how long SQLite may take to open.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub db_path: PathBuf,
    pub fallback_dir: PathBuf,
    pub sqlite_timeout: Duration,
}

impl StorageConfig {
    /// Standard layout under one data directory: `todokeep.db` plus a
    /// `fallback/` subdirectory for the JSON collections.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            db_path: data_dir.join(DB_FILE),
            fallback_dir: data_dir.join(FALLBACK_DIR),
            sqlite_timeout: DEFAULT_SQLITE_TIMEOUT,
        }
    }
}

/// Persistence/authentication service behind the todo-keeper UI.
///
/// Owns exactly one storage backend after initialization. All operations
/// take `&mut self`; the single-logical-caller assumption of the design is
/// explicit in the type system.
pub struct DataService {
    config: StorageConfig,
    store: Option<Box<dyn EntityStore>>,
    backend: Option<Backend>,
}

impl DataService {
    /// Creates the service without touching storage. The backend is opened
    /// by `initialize()` or lazily on first use.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            store: None,
            backend: None,
        }
    }

    /// Selects and opens the storage backend. Idempotent: repeated calls
    /// return the backend already chosen and never re-seed or clear data.
    ///
    /// # Errors
    /// Returns an error only when even the fallback bootstrap fails; the
    /// caller should treat that as fatal.
    pub fn initialize(&mut self) -> StoreResult<Backend> {
        self.ensure_initialized()
    }

    /// Returns the selected backend, or `None` before initialization.
    pub fn backend(&self) -> Option<Backend> {
        self.backend
    }

    /// Tears the service down, dropping the storage handle.
    pub fn close(self) {
        if let Some(backend) = self.backend {
            info!("event=storage_close module=service status=ok backend={backend}");
        }
    }

    fn ensure_initialized(&mut self) -> StoreResult<Backend> {
        if let Some(backend) = self.backend {
            return Ok(backend);
        }

        let started_at = Instant::now();
        info!("event=storage_init module=service status=start");

        match open_sqlite_with_timeout(self.config.db_path.clone(), self.config.sqlite_timeout) {
            Ok(conn) => {
                self.store = Some(Box::new(SqliteStore::new(conn)));
                self.backend = Some(Backend::Sqlite);
            }
            Err(reason) => {
                warn!("event=storage_fallback module=service reason={reason}");
                let fresh = !JsonStore::has_prior_state(&self.config.fallback_dir);
                match JsonStore::open(&self.config.fallback_dir) {
                    Ok(store) => {
                        self.store = Some(Box::new(store));
                        self.backend = Some(Backend::Fallback);
                        if fresh {
                            self.seed_demo_user()?;
                        }
                    }
                    Err(err) => {
                        error!(
                            "event=storage_init module=service status=error duration_ms={} error={err}",
                            started_at.elapsed().as_millis()
                        );
                        return Err(err);
                    }
                }
            }
        }

        let backend = self
            .backend
            .ok_or_else(|| StoreError::Internal("storage backend not selected".to_string()))?;
        info!(
            "event=storage_init module=service status=ok backend={backend} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(backend)
    }

    pub(crate) fn store_mut(&mut self) -> StoreResult<&mut (dyn EntityStore + 'static)> {
        self.ensure_initialized()?;
        self.store
            .as_deref_mut()
            .ok_or_else(|| StoreError::Internal("storage backend not initialized".to_string()))
    }

    // ---- Tasks -----------------------------------------------------------

    pub fn create_task(&mut self, draft: TaskDraft) -> DataResult<Task> {
        draft.validate()?;
        let task = self.store_mut()?.insert_task(draft)?;
        info!(
            "event=task_create module=service status=ok task_id={} user_id={}",
            task.id, task.user_id
        );
        Ok(task)
    }

    /// Tasks owned by `user_id`, newest first.
    pub fn tasks_for_user(&mut self, user_id: i64) -> DataResult<Vec<Task>> {
        Ok(self.store_mut()?.tasks_for_owner(user_id)?)
    }

    /// Flips the completion flag. Returns whether a task was affected.
    pub fn toggle_task_completed(&mut self, id: i64) -> DataResult<bool> {
        Ok(self.store_mut()?.toggle_task_completed(id)?)
    }

    pub fn delete_task(&mut self, id: i64) -> DataResult<bool> {
        Ok(self.store_mut()?.delete_task(id)?)
    }

    // ---- Events ----------------------------------------------------------

    pub fn create_event(&mut self, draft: EventDraft) -> DataResult<Event> {
        draft.validate()?;
        let event = self.store_mut()?.insert_event(draft)?;
        info!(
            "event=event_create module=service status=ok event_id={} user_id={}",
            event.id, event.user_id
        );
        Ok(event)
    }

    /// Events owned by `user_id`, soonest first by `event_date`.
    pub fn events_for_user(&mut self, user_id: i64) -> DataResult<Vec<Event>> {
        Ok(self.store_mut()?.events_for_owner(user_id)?)
    }

    pub fn delete_event(&mut self, id: i64) -> DataResult<bool> {
        Ok(self.store_mut()?.delete_event(id)?)
    }

    // ---- Notes -----------------------------------------------------------

    pub fn create_note(&mut self, draft: NoteDraft) -> DataResult<Note> {
        draft.validate()?;
        let note = self.store_mut()?.insert_note(draft)?;
        info!(
            "event=note_create module=service status=ok note_id={} user_id={}",
            note.id, note.user_id
        );
        Ok(note)
    }

    /// Notes owned by `user_id`, newest first.
    pub fn notes_for_user(&mut self, user_id: i64) -> DataResult<Vec<Note>> {
        Ok(self.store_mut()?.notes_for_owner(user_id)?)
    }

    pub fn delete_note(&mut self, id: i64) -> DataResult<bool> {
        Ok(self.store_mut()?.delete_note(id)?)
    }
}

/// Opens the SQLite database on a worker thread, bounded by `timeout`.
///
/// On timeout the worker is abandoned; whenever it eventually finishes, its
/// connection is dropped with the channel.
fn open_sqlite_with_timeout(path: PathBuf, timeout: Duration) -> Result<rusqlite::Connection, String> {
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("todokeep-db-open".to_string())
        .spawn(move || {
            let _ = tx.send(open_db(&path));
        });
    if let Err(err) = spawned {
        return Err(format!("db open thread failed to start: {err}"));
    }

    match rx.recv_timeout(timeout) {
        Ok(Ok(conn)) => Ok(conn),
        Ok(Err(err)) => Err(format!("sqlite open failed: {err}")),
        Err(_) => Err(format!(
            "sqlite initialization exceeded {}ms",
            timeout.as_millis()
        )),
    }
}

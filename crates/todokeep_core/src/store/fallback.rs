//! Flat JSON-list implementation of the storage port.
//!
//! # Responsibility
//! - Serve the `EntityStore` contract from four in-memory lists, persisted
//!   as one JSON file per collection under a data directory.
//!
//! # Invariants
//! - Every mutation rewrites the affected collection file in full
//!   (read-modify-write; acceptable at this scale, not for high volume).
//! - Ids come from per-collection monotonic counters seeded from the
//!   highest persisted id, so an id is never handed out twice by one store.

use crate::model::event::{Event, EventDraft};
use crate::model::note::{Note, NoteDraft};
use crate::model::task::{Task, TaskDraft};
use crate::model::user::{User, UserDraft};
use crate::store::{now_epoch_ms, EntityStore, StoreResult};
use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

const USERS_FILE: &str = "users.json";
const TASKS_FILE: &str = "tasks.json";
const EVENTS_FILE: &str = "events.json";
const NOTES_FILE: &str = "notes.json";

/// Fallback entity store over flat per-collection JSON lists.
pub struct JsonStore {
    dir: Option<PathBuf>,
    users: Vec<User>,
    tasks: Vec<Task>,
    events: Vec<Event>,
    notes: Vec<Note>,
    next_user_id: i64,
    next_task_id: i64,
    next_event_id: i64,
    next_note_id: i64,
}

impl JsonStore {
    /// Opens (or creates) the collection files under `dir`.
    ///
    /// Missing collections start empty and are written out immediately, so a
    /// first open leaves a complete on-disk layout behind. Existing data is
    /// never cleared.
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let users: Vec<User> = load_collection(&dir.join(USERS_FILE))?;
        let tasks: Vec<Task> = load_collection(&dir.join(TASKS_FILE))?;
        let events: Vec<Event> = load_collection(&dir.join(EVENTS_FILE))?;
        let notes: Vec<Note> = load_collection(&dir.join(NOTES_FILE))?;

        let store = Self {
            next_user_id: next_id(users.iter().map(|u| u.id)),
            next_task_id: next_id(tasks.iter().map(|t| t.id)),
            next_event_id: next_id(events.iter().map(|e| e.id)),
            next_note_id: next_id(notes.iter().map(|n| n.id)),
            dir: Some(dir.to_path_buf()),
            users,
            tasks,
            events,
            notes,
        };

        store.save(USERS_FILE, &store.users)?;
        store.save(TASKS_FILE, &store.tasks)?;
        store.save(EVENTS_FILE, &store.events)?;
        store.save(NOTES_FILE, &store.notes)?;

        info!(
            "event=fallback_open module=store status=ok dir={} users={} tasks={} events={} notes={}",
            dir.display(),
            store.users.len(),
            store.tasks.len(),
            store.events.len(),
            store.notes.len()
        );
        Ok(store)
    }

    /// Creates an ephemeral store with no backing files. Used by tests.
    pub fn in_memory() -> Self {
        Self {
            dir: None,
            users: Vec::new(),
            tasks: Vec::new(),
            events: Vec::new(),
            notes: Vec::new(),
            next_user_id: 1,
            next_task_id: 1,
            next_event_id: 1,
            next_note_id: 1,
        }
    }

    /// Returns whether a previous open left state under `dir`.
    ///
    /// The users collection is always written on first open, so its absence
    /// marks a fresh directory that still needs the demo bootstrap.
    pub fn has_prior_state(dir: impl AsRef<Path>) -> bool {
        dir.as_ref().join(USERS_FILE).exists()
    }

    fn save<T: Serialize>(&self, file: &str, items: &[T]) -> StoreResult<()> {
        let Some(dir) = self.dir.as_ref() else {
            return Ok(());
        };
        let bytes = serde_json::to_vec(items)?;
        fs::write(dir.join(file), bytes)?;
        Ok(())
    }
}

impl EntityStore for JsonStore {
    fn insert_user(&mut self, draft: UserDraft) -> StoreResult<User> {
        let user = User {
            id: self.next_user_id,
            username: draft.username,
            email: draft.email,
            password_hash: draft.password_hash,
            created_at: now_epoch_ms(),
        };
        self.next_user_id += 1;
        self.users.push(user.clone());
        self.save(USERS_FILE, &self.users)?;
        Ok(user)
    }

    fn find_user(&self, identifier: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.username == identifier || u.email == identifier)
            .cloned())
    }

    fn user_exists(&self, username: &str, email: &str) -> StoreResult<bool> {
        Ok(self
            .users
            .iter()
            .any(|u| u.username == username || u.email == email))
    }

    fn insert_task(&mut self, draft: TaskDraft) -> StoreResult<Task> {
        let task = Task {
            id: self.next_task_id,
            user_id: draft.user_id,
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            due_date: draft.due_date,
            completed: draft.completed,
            created_at: now_epoch_ms(),
        };
        self.next_task_id += 1;
        self.tasks.push(task.clone());
        self.save(TASKS_FILE, &self.tasks)?;
        Ok(task)
    }

    fn tasks_for_owner(&self, user_id: i64) -> StoreResult<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .tasks
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        // Newest first, id as tiebreak; must match the SQL ORDER BY.
        tasks.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(tasks)
    }

    fn toggle_task_completed(&mut self, id: i64) -> StoreResult<bool> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        task.completed = !task.completed;
        self.save(TASKS_FILE, &self.tasks)?;
        Ok(true)
    }

    fn delete_task(&mut self, id: i64) -> StoreResult<bool> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return Ok(false);
        }
        self.save(TASKS_FILE, &self.tasks)?;
        Ok(true)
    }

    fn insert_event(&mut self, draft: EventDraft) -> StoreResult<Event> {
        let event = Event {
            id: self.next_event_id,
            user_id: draft.user_id,
            title: draft.title,
            description: draft.description,
            event_date: draft.event_date,
            location: draft.location,
            created_at: now_epoch_ms(),
        };
        self.next_event_id += 1;
        self.events.push(event.clone());
        self.save(EVENTS_FILE, &self.events)?;
        Ok(event)
    }

    fn events_for_owner(&self, user_id: i64) -> StoreResult<Vec<Event>> {
        let mut events: Vec<Event> = self
            .events
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        // Soonest first, id as tiebreak; must match the SQL ORDER BY.
        events.sort_by(|a, b| {
            a.event_date
                .cmp(&b.event_date)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(events)
    }

    fn delete_event(&mut self, id: i64) -> StoreResult<bool> {
        let before = self.events.len();
        self.events.retain(|e| e.id != id);
        if self.events.len() == before {
            return Ok(false);
        }
        self.save(EVENTS_FILE, &self.events)?;
        Ok(true)
    }

    fn insert_note(&mut self, draft: NoteDraft) -> StoreResult<Note> {
        let note = Note {
            id: self.next_note_id,
            user_id: draft.user_id,
            title: draft.title,
            content: draft.content,
            created_at: now_epoch_ms(),
        };
        self.next_note_id += 1;
        self.notes.push(note.clone());
        self.save(NOTES_FILE, &self.notes)?;
        Ok(note)
    }

    fn notes_for_owner(&self, user_id: i64) -> StoreResult<Vec<Note>> {
        let mut notes: Vec<Note> = self
            .notes
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        notes.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(notes)
    }

    fn delete_note(&mut self, id: i64) -> StoreResult<bool> {
        let before = self.notes.len();
        self.notes.retain(|n| n.id != id);
        if self.notes.len() == before {
            return Ok(false);
        }
        self.save(NOTES_FILE, &self.notes)?;
        Ok(true)
    }
}

fn load_collection<T: DeserializeOwned>(path: &Path) -> StoreResult<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn next_id(ids: impl Iterator<Item = i64>) -> i64 {
    ids.max().unwrap_or(0) + 1
}

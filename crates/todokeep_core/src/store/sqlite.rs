//! SQLite implementation of the storage port.
//!
//! # Responsibility
//! - Map the `EntityStore` contract onto the four migrated tables.
//! - Keep SQL details inside this file; callers see only port types.
//!
//! # Invariants
//! - Ids come from `AUTOINCREMENT`; `created_at` is assigned here so both
//!   backends agree on timestamp semantics.
//! - Affected-row booleans come from `changes > 0`, never from pre-checks.

use crate::model::event::{Event, EventDraft};
use crate::model::note::{Note, NoteDraft};
use crate::model::task::{Priority, Task, TaskDraft};
use crate::model::user::{User, UserDraft};
use crate::store::{now_epoch_ms, EntityStore, StoreError, StoreResult};
use rusqlite::{params, Connection, Row};

/// SQLite-backed entity store owning its connection.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Wraps a migrated, ready connection (see `db::open_db`).
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

impl EntityStore for SqliteStore {
    fn insert_user(&mut self, draft: UserDraft) -> StoreResult<User> {
        let created_at = now_epoch_ms();
        self.conn.execute(
            "INSERT INTO users (username, email, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![draft.username, draft.email, draft.password_hash, created_at],
        )?;

        Ok(User {
            id: self.conn.last_insert_rowid(),
            username: draft.username,
            email: draft.email,
            password_hash: draft.password_hash,
            created_at,
        })
    }

    fn find_user(&self, identifier: &str) -> StoreResult<Option<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, username, email, password_hash, created_at
             FROM users
             WHERE username = ?1 OR email = ?1
             LIMIT 1;",
        )?;

        let mut rows = stmt.query([identifier])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn user_exists(&self, username: &str, email: &str) -> StoreResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM users WHERE username = ?1 OR email = ?2
             );",
            params![username, email],
            |row| row.get(0),
        )?;
        Ok(exists != 0)
    }

    fn insert_task(&mut self, draft: TaskDraft) -> StoreResult<Task> {
        let created_at = now_epoch_ms();
        self.conn.execute(
            "INSERT INTO tasks (user_id, title, description, priority, due_date, completed, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                draft.user_id,
                draft.title,
                draft.description.as_deref(),
                priority_to_db(draft.priority),
                draft.due_date,
                bool_to_int(draft.completed),
                created_at,
            ],
        )?;

        Ok(Task {
            id: self.conn.last_insert_rowid(),
            user_id: draft.user_id,
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            due_date: draft.due_date,
            completed: draft.completed,
            created_at,
        })
    }

    fn tasks_for_owner(&self, user_id: i64) -> StoreResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, title, description, priority, due_date, completed, created_at
             FROM tasks
             WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC;",
        )?;

        let mut rows = stmt.query([user_id])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn toggle_task_completed(&mut self, id: i64) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "UPDATE tasks SET completed = NOT completed WHERE id = ?1;",
            [id],
        )?;
        Ok(changed > 0)
    }

    fn delete_task(&mut self, id: i64) -> StoreResult<bool> {
        let changed = self.conn.execute("DELETE FROM tasks WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn insert_event(&mut self, draft: EventDraft) -> StoreResult<Event> {
        let created_at = now_epoch_ms();
        self.conn.execute(
            "INSERT INTO events (user_id, title, description, event_date, location, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                draft.user_id,
                draft.title,
                draft.description.as_deref(),
                draft.event_date,
                draft.location.as_deref(),
                created_at,
            ],
        )?;

        Ok(Event {
            id: self.conn.last_insert_rowid(),
            user_id: draft.user_id,
            title: draft.title,
            description: draft.description,
            event_date: draft.event_date,
            location: draft.location,
            created_at,
        })
    }

    fn events_for_owner(&self, user_id: i64) -> StoreResult<Vec<Event>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, title, description, event_date, location, created_at
             FROM events
             WHERE user_id = ?1
             ORDER BY event_date ASC, id ASC;",
        )?;

        let mut rows = stmt.query([user_id])?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(parse_event_row(row)?);
        }
        Ok(events)
    }

    fn delete_event(&mut self, id: i64) -> StoreResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM events WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn insert_note(&mut self, draft: NoteDraft) -> StoreResult<Note> {
        let created_at = now_epoch_ms();
        self.conn.execute(
            "INSERT INTO notes (user_id, title, content, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                draft.user_id,
                draft.title,
                draft.content.as_deref(),
                created_at
            ],
        )?;

        Ok(Note {
            id: self.conn.last_insert_rowid(),
            user_id: draft.user_id,
            title: draft.title,
            content: draft.content,
            created_at,
        })
    }

    fn notes_for_owner(&self, user_id: i64) -> StoreResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, title, content, created_at
             FROM notes
             WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC;",
        )?;

        let mut rows = stmt.query([user_id])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn delete_note(&mut self, id: i64) -> StoreResult<bool> {
        let changed = self.conn.execute("DELETE FROM notes WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }
}

fn parse_user_row(row: &Row<'_>) -> StoreResult<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_task_row(row: &Row<'_>) -> StoreResult<Task> {
    let priority_text: String = row.get("priority")?;
    let priority = parse_priority(&priority_text).ok_or_else(|| {
        StoreError::Internal(format!(
            "invalid priority value `{priority_text}` in tasks.priority"
        ))
    })?;

    Ok(Task {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        priority,
        due_date: row.get("due_date")?,
        completed: int_to_bool(row.get("completed")?)?,
        created_at: row.get("created_at")?,
    })
}

fn parse_event_row(row: &Row<'_>) -> StoreResult<Event> {
    Ok(Event {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        event_date: row.get("event_date")?,
        location: row.get("location")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_note_row(row: &Row<'_>) -> StoreResult<Note> {
    Ok(Note {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
    })
}

fn priority_to_db(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "low",
        Priority::Medium => "medium",
        Priority::High => "high",
    }
}

fn parse_priority(value: &str) -> Option<Priority> {
    match value {
        "low" => Some(Priority::Low),
        "medium" => Some(Priority::Medium),
        "high" => Some(Priority::High),
        _ => None,
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn int_to_bool(value: i64) -> StoreResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(StoreError::Internal(format!(
            "invalid completed value `{other}` in tasks.completed"
        ))),
    }
}

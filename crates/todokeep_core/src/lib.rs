//! Persistence and authentication core for the todo-keeper app.
//! This crate is the single source of truth for storage and login rules;
//! UI layers are thin callers of [`DataService`].

pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::event::{Event, EventDraft};
pub use model::note::{Note, NoteDraft};
pub use model::task::{Priority, Task, TaskDraft};
pub use model::user::{User, UserDraft};
pub use model::ValidationError;
pub use service::auth::{AuthError, AuthResult, DEMO_EMAIL, DEMO_PASSWORD, DEMO_USERNAME};
pub use service::data_service::{
    DataError, DataResult, DataService, StorageConfig, DEFAULT_SQLITE_TIMEOUT,
};
pub use store::{Backend, EntityStore, JsonStore, SqliteStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

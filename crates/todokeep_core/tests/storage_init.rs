use rusqlite::Connection;
use std::time::Duration;
use todokeep_core::db::migrations::latest_version;
use todokeep_core::db::{open_db, open_db_in_memory, DbError};
use todokeep_core::{Backend, DataService, StorageConfig, DEMO_PASSWORD, DEMO_USERNAME};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "users");
    assert_table_exists(&conn, "tasks");
    assert_table_exists(&conn, "events");
    assert_table_exists(&conn, "notes");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todokeep.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "users");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn initialize_selects_sqlite_and_is_sticky() {
    let dir = tempfile::tempdir().unwrap();
    let mut service = DataService::new(StorageConfig::new(dir.path()));

    assert_eq!(service.backend(), None);
    assert_eq!(service.initialize().unwrap(), Backend::Sqlite);
    assert_eq!(service.initialize().unwrap(), Backend::Sqlite);
    assert_eq!(service.backend(), Some(Backend::Sqlite));
}

#[test]
fn unopenable_database_path_triggers_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = StorageConfig::new(dir.path());
    // A db path whose parent directory does not exist cannot be opened.
    config.db_path = dir.path().join("missing").join("todokeep.db");

    let mut service = DataService::new(config);
    assert_eq!(service.initialize().unwrap(), Backend::Fallback);
}

#[test]
fn zero_timeout_triggers_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = StorageConfig::new(dir.path());
    config.sqlite_timeout = Duration::ZERO;

    let mut service = DataService::new(config);
    assert_eq!(service.initialize().unwrap(), Backend::Fallback);
}

#[test]
fn fallback_bootstrap_seeds_demo_user_once() {
    let dir = tempfile::tempdir().unwrap();
    let config = fallback_config(dir.path());

    let mut service = DataService::new(config.clone());
    assert_eq!(service.initialize().unwrap(), Backend::Fallback);
    let demo = service.authenticate(DEMO_USERNAME, DEMO_PASSWORD).unwrap();
    let task = service
        .create_task(todokeep_core::TaskDraft::new(demo.id, "persisted"))
        .unwrap();
    service.close();

    // Second service over the same directory: no re-seed, no data loss.
    let mut service = DataService::new(config);
    assert_eq!(service.initialize().unwrap(), Backend::Fallback);
    assert_eq!(
        service.authenticate(DEMO_USERNAME, DEMO_PASSWORD).unwrap().id,
        demo.id
    );
    let tasks = service.tasks_for_user(demo.id).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, task.id);

    let users: Vec<serde_json::Value> = serde_json::from_slice(
        &std::fs::read(dir.path().join("fallback").join("users.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(users.len(), 1);
}

#[test]
fn repository_calls_initialize_lazily() {
    let dir = tempfile::tempdir().unwrap();
    let mut service = DataService::new(fallback_config(dir.path()));

    // No explicit initialize(); the demo user must already be reachable.
    let demo = service.ensure_demo_user().unwrap();
    assert_eq!(demo.username, DEMO_USERNAME);
    assert_eq!(service.backend(), Some(Backend::Fallback));
    assert_eq!(service.initialize().unwrap(), Backend::Fallback);
}

fn fallback_config(data_dir: &std::path::Path) -> StorageConfig {
    let mut config = StorageConfig::new(data_dir);
    config.db_path = data_dir.join("missing").join("todokeep.db");
    config
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
             );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "expected table `{table_name}` to exist");
}

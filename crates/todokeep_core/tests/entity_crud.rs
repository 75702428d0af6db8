use todokeep_core::db::open_db_in_memory;
use todokeep_core::{
    EntityStore, EventDraft, JsonStore, NoteDraft, Priority, SqliteStore, TaskDraft, UserDraft,
};

/// Both backends must satisfy every port property; each test runs the same
/// sequence against each of them.
fn backends() -> Vec<(&'static str, Box<dyn EntityStore>)> {
    vec![
        (
            "sqlite",
            Box::new(SqliteStore::new(open_db_in_memory().unwrap())) as Box<dyn EntityStore>,
        ),
        ("fallback", Box::new(JsonStore::in_memory())),
    ]
}

fn seed_owner(store: &mut dyn EntityStore, username: &str) -> i64 {
    store
        .insert_user(UserDraft::new(
            username,
            format!("{username}@example.com"),
            "stored-hash",
        ))
        .unwrap()
        .id
}

#[test]
fn task_create_round_trip() {
    for (name, mut store) in backends() {
        let owner = seed_owner(store.as_mut(), "owner");

        let mut draft = TaskDraft::new(owner, "write report");
        draft.description = Some("quarterly numbers".to_string());
        draft.priority = Priority::High;
        draft.due_date = Some(1_900_000_000_000);
        let task = store.insert_task(draft).unwrap();

        assert!(task.id > 0, "{name}: id must be assigned");
        assert!(task.created_at > 0, "{name}: created_at must be assigned");
        assert!(!task.completed, "{name}");

        let listed = store.tasks_for_owner(owner).unwrap();
        assert_eq!(listed, vec![task], "{name}");
    }
}

#[test]
fn task_defaults_are_medium_priority_and_open() {
    let draft = TaskDraft::new(1, "untouched defaults");
    assert_eq!(draft.priority, Priority::Medium);
    assert!(!draft.completed);
    assert_eq!(draft.description, None);
    assert_eq!(draft.due_date, None);
}

#[test]
fn tasks_and_notes_list_newest_first() {
    for (name, mut store) in backends() {
        let owner = seed_owner(store.as_mut(), "owner");

        let first = store.insert_task(TaskDraft::new(owner, "first")).unwrap();
        let second = store.insert_task(TaskDraft::new(owner, "second")).unwrap();
        let third = store.insert_task(TaskDraft::new(owner, "third")).unwrap();
        let tasks = store.tasks_for_owner(owner).unwrap();
        let task_ids: Vec<i64> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(task_ids, vec![third.id, second.id, first.id], "{name}");

        let first = store.insert_note(NoteDraft::new(owner, "first")).unwrap();
        let second = store.insert_note(NoteDraft::new(owner, "second")).unwrap();
        let notes = store.notes_for_owner(owner).unwrap();
        let note_ids: Vec<i64> = notes.iter().map(|n| n.id).collect();
        assert_eq!(note_ids, vec![second.id, first.id], "{name}");
    }
}

#[test]
fn events_list_by_event_date_regardless_of_creation_order() {
    for (name, mut store) in backends() {
        let owner = seed_owner(store.as_mut(), "owner");

        let middle = store
            .insert_event(EventDraft::new(owner, "middle", 2_000))
            .unwrap();
        let latest = store
            .insert_event(EventDraft::new(owner, "latest", 3_000))
            .unwrap();
        let earliest = store
            .insert_event(EventDraft::new(owner, "earliest", 1_000))
            .unwrap();

        let events = store.events_for_owner(owner).unwrap();
        let ids: Vec<i64> = events.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![earliest.id, middle.id, latest.id], "{name}");
    }
}

#[test]
fn toggle_flips_exactly_once_per_call() {
    for (name, mut store) in backends() {
        let owner = seed_owner(store.as_mut(), "owner");
        let task = store.insert_task(TaskDraft::new(owner, "toggle me")).unwrap();

        assert!(store.toggle_task_completed(task.id).unwrap(), "{name}");
        assert!(store.tasks_for_owner(owner).unwrap()[0].completed, "{name}");

        assert!(store.toggle_task_completed(task.id).unwrap(), "{name}");
        assert!(!store.tasks_for_owner(owner).unwrap()[0].completed, "{name}");

        assert!(
            !store.toggle_task_completed(task.id + 999).unwrap(),
            "{name}: unknown id must report no record affected"
        );
    }
}

#[test]
fn delete_reports_whether_a_record_was_affected() {
    for (name, mut store) in backends() {
        let owner = seed_owner(store.as_mut(), "owner");

        let task = store.insert_task(TaskDraft::new(owner, "doomed")).unwrap();
        let event = store
            .insert_event(EventDraft::new(owner, "doomed", 1_000))
            .unwrap();
        let note = store.insert_note(NoteDraft::new(owner, "doomed")).unwrap();

        assert!(store.delete_task(task.id).unwrap(), "{name}");
        assert!(store.delete_event(event.id).unwrap(), "{name}");
        assert!(store.delete_note(note.id).unwrap(), "{name}");

        assert!(store.tasks_for_owner(owner).unwrap().is_empty(), "{name}");
        assert!(store.events_for_owner(owner).unwrap().is_empty(), "{name}");
        assert!(store.notes_for_owner(owner).unwrap().is_empty(), "{name}");

        assert!(!store.delete_task(task.id).unwrap(), "{name}");
        assert!(!store.delete_event(event.id).unwrap(), "{name}");
        assert!(!store.delete_note(note.id).unwrap(), "{name}");
    }
}

#[test]
fn lists_are_scoped_to_the_owner() {
    for (name, mut store) in backends() {
        let alice = seed_owner(store.as_mut(), "alice");
        let bob = seed_owner(store.as_mut(), "bob");

        store.insert_task(TaskDraft::new(alice, "hers")).unwrap();
        store.insert_task(TaskDraft::new(bob, "his")).unwrap();
        store
            .insert_note(NoteDraft::new(alice, "her note"))
            .unwrap();

        let alice_tasks = store.tasks_for_owner(alice).unwrap();
        assert_eq!(alice_tasks.len(), 1, "{name}");
        assert_eq!(alice_tasks[0].title, "hers", "{name}");

        let bob_tasks = store.tasks_for_owner(bob).unwrap();
        assert_eq!(bob_tasks.len(), 1, "{name}");
        assert!(store.notes_for_owner(bob).unwrap().is_empty(), "{name}");
    }
}

#[test]
fn identical_sequences_produce_identical_views_across_backends() {
    let mut views: Vec<Vec<(String, bool)>> = Vec::new();

    for (_, mut store) in backends() {
        let owner = seed_owner(store.as_mut(), "owner");
        store.insert_task(TaskDraft::new(owner, "kept")).unwrap();
        let doomed = store.insert_task(TaskDraft::new(owner, "doomed")).unwrap();
        let toggled = store.insert_task(TaskDraft::new(owner, "toggled")).unwrap();

        store.toggle_task_completed(toggled.id).unwrap();
        store.delete_task(doomed.id).unwrap();

        views.push(
            store
                .tasks_for_owner(owner)
                .unwrap()
                .into_iter()
                .map(|t| (t.title, t.completed))
                .collect(),
        );
    }

    assert_eq!(views[0], views[1]);
    assert_eq!(
        views[0],
        vec![
            ("toggled".to_string(), true),
            ("kept".to_string(), false)
        ]
    );
}

//! Integration tests for the full tack stack: store + driver + in-memory
//! remote.

use std::sync::Arc;

use tack_config::{Config, Role, Session};
use tack_protocol::{
    Category, NewProject, NewTask, Priority, ProjectPatch, Task, TaskPatch, TaskStatus,
};
use tack_remote::{codec, MemoryRemote, RemoteStore};
use tack_store::{SyncDriver, TaskStore};

fn draft(title: &str) -> NewTask {
    NewTask::new(title, Category::Development, Priority::High)
}

fn admin_session() -> Session {
    Session::authenticated("alice", Role::Admin)
}

async fn seed_task(remote: &MemoryRemote, owner: &str, title: &str) -> Task {
    let task = Task::from_new(draft(title), owner.to_string()).unwrap();
    remote
        .create("tasks", &task.id.to_string(), codec::task_to_fields(&task))
        .await
        .unwrap();
    task
}

// A pending local task survives a snapshot that does not contain it, and
// is superseded by one that does.
#[tokio::test]
async fn pending_writes_survive_then_get_superseded() {
    let remote = Arc::new(MemoryRemote::new());
    let mut store = TaskStore::new(&Config::default(), admin_session());
    let mut driver = SyncDriver::new(Arc::clone(&remote));
    driver.tick(&mut store).await;

    // A local creation whose remote write we deliberately hold back.
    remote.set_offline(true);
    let local_id = store.add_task(draft("Held back")).unwrap();
    driver.tick(&mut store).await;
    assert!(store.is_pending(local_id));

    // Another client writes a different task; its snapshot must not
    // clobber our pending entry.
    remote.set_offline(false);
    let other = seed_task(&remote, "alice", "From elsewhere").await;
    driver.tick(&mut store).await;

    assert_eq!(store.tasks().count(), 2);
    assert!(store.task(local_id).is_some());
    assert!(store.task(other.id).is_some());
    assert!(store.is_pending(local_id));

    // Now the server learns about our task (as if the write had landed
    // through another path); the server's version wins and the entry is
    // no longer pending.
    let mut server_version = store.task(local_id).unwrap().clone();
    server_version.title = "Held back, renamed by server".to_string();
    remote
        .create(
            "tasks",
            &server_version.id.to_string(),
            codec::task_to_fields(&server_version),
        )
        .await
        .unwrap();
    driver.tick(&mut store).await;

    let merged = store.task(local_id).unwrap();
    assert_eq!(merged.title, "Held back, renamed by server");
    assert!(!store.is_pending(local_id));
    assert_eq!(store.tasks().count(), 2);
}

// A failed cascade batch leaves the remote store untouched, and the next
// snapshot restores the locally removed entries.
#[tokio::test]
async fn failed_cascade_is_restored_by_the_next_snapshot() {
    let remote = Arc::new(MemoryRemote::new());
    let mut store = TaskStore::new(&Config::default(), admin_session());
    let mut driver = SyncDriver::new(Arc::clone(&remote));

    let project_id = store.add_project(NewProject::new("Sticky", "#444444")).unwrap();
    let mut in_project = draft("Sticky task");
    in_project.project_id = Some(project_id);
    let task_id = store.add_task(in_project).unwrap();
    driver.tick(&mut store).await;
    assert!(remote.contains("projects", &project_id.to_string()));

    // The batch fails outright; local state is already optimistic about
    // the deletion.
    remote.set_offline(true);
    store.delete_project(project_id);
    driver.tick(&mut store).await;
    assert_eq!(store.tasks().count(), 0);
    assert_eq!(store.projects().count(), 0);
    assert!(remote.contains("projects", &project_id.to_string()));
    assert!(remote.contains("tasks", &task_id.to_string()));

    // Reconnect; another client touches both collections so fresh
    // snapshots flow, and the store self-heals back to the server's
    // truth.
    remote.set_offline(false);
    remote
        .update(
            "projects",
            &project_id.to_string(),
            codec::project_patch_to_fields(&ProjectPatch {
                color: Some("#555555".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
    remote
        .update(
            "tasks",
            &task_id.to_string(),
            codec::task_patch_to_fields(&TaskPatch {
                priority: Some(Priority::Low),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
    driver.tick(&mut store).await;

    assert!(store.task(task_id).is_some());
    assert!(store.project(project_id).is_some());
}

#[tokio::test]
async fn status_walk_is_mirrored_remotely() {
    let remote = Arc::new(MemoryRemote::new());
    let mut store = TaskStore::new(&Config::default(), admin_session());
    let mut driver = SyncDriver::new(Arc::clone(&remote));

    let id = store.add_task(draft("Walk me")).unwrap();
    store.update_task_status(id, TaskStatus::InProgress);
    store.update_task_status(id, TaskStatus::Finalized);
    driver.tick(&mut store).await;

    // After the flush and the resulting snapshot, the local entry is the
    // server's copy and still satisfies the invariants.
    let task = store.task(id).unwrap();
    assert!(!store.is_pending(id));
    assert_eq!(task.status, TaskStatus::Finalized);
    assert!(task.completed);
    assert!(task.completed_at.is_some());
    assert!(task.started_at.is_some());
}

#[tokio::test]
async fn operator_only_sees_their_own_tasks() {
    let remote = Arc::new(MemoryRemote::new());
    seed_task(&remote, "alice", "Alice's").await;
    let bobs = seed_task(&remote, "bob", "Bob's").await;

    let mut store = TaskStore::new(
        &Config::default(),
        Session::authenticated("bob", Role::Operator),
    );
    let mut driver = SyncDriver::new(Arc::clone(&remote));
    driver.tick(&mut store).await;

    let titles: Vec<&str> = store.tasks().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Bob's"]);
    assert!(store.task(bobs.id).is_some());
}

#[tokio::test]
async fn operator_edits_flow_back_through_the_filtered_query() {
    let remote = Arc::new(MemoryRemote::new());
    let bobs = seed_task(&remote, "bob", "Bob's").await;

    let mut store = TaskStore::new(
        &Config::default(),
        Session::authenticated("bob", Role::Operator),
    );
    let mut driver = SyncDriver::new(Arc::clone(&remote));
    driver.tick(&mut store).await;

    store.toggle_task_completion(bobs.id, None);
    driver.tick(&mut store).await;

    let task = store.task(bobs.id).unwrap();
    assert_eq!(task.status, TaskStatus::Finalized);
    assert!(!store.is_pending(bobs.id));
}

#[tokio::test]
async fn clear_all_data_wipes_loaded_documents_remotely() {
    let remote = Arc::new(MemoryRemote::new());
    seed_task(&remote, "alice", "One").await;
    seed_task(&remote, "alice", "Two").await;

    let mut store = TaskStore::new(&Config::default(), admin_session());
    let mut driver = SyncDriver::new(Arc::clone(&remote));
    driver.tick(&mut store).await;
    assert_eq!(store.tasks().count(), 2);

    store.clear_all_data();
    driver.tick(&mut store).await;

    assert_eq!(store.tasks().count(), 0);
    assert_eq!(remote.document_count("tasks"), 0);
}

#[tokio::test]
async fn custom_collection_names_from_config_are_honored() {
    let dir = tempfile::TempDir::new().unwrap();
    let config_path = dir.path().join("tack.json5");
    std::fs::write(
        &config_path,
        r#"
        {
            // Team-scoped collections
            collections: {
                tasks: "team_tasks",
                projects: "team_projects",
            },
            cleanup: { retention_days: 14 },
        }
        "#,
    )
    .unwrap();
    let config = Config::load_from(&config_path).unwrap();

    let remote = Arc::new(MemoryRemote::new());
    let mut store = TaskStore::new(&config, admin_session());
    let mut driver = SyncDriver::new(Arc::clone(&remote));

    let id = store.add_task(draft("Namespaced")).unwrap();
    driver.tick(&mut store).await;

    assert!(remote.contains("team_tasks", &id.to_string()));
    assert_eq!(remote.document_count("tasks"), 0);
}

#[tokio::test]
async fn two_stores_reconcile_through_one_backend() {
    let remote = Arc::new(MemoryRemote::new());

    let mut alice_store = TaskStore::new(&Config::default(), admin_session());
    let mut alice_driver = SyncDriver::new(Arc::clone(&remote));
    let mut bob_store = TaskStore::new(
        &Config::default(),
        Session::authenticated("bob", Role::Admin),
    );
    let mut bob_driver = SyncDriver::new(Arc::clone(&remote));

    alice_driver.tick(&mut alice_store).await;
    bob_driver.tick(&mut bob_store).await;

    // Alice creates; Bob sees it after his next tick.
    let mut shared = draft("Shared work");
    shared.assigned_to = Some("bob".to_string());
    let id = alice_store.add_task(shared).unwrap();
    alice_driver.tick(&mut alice_store).await;
    bob_driver.tick(&mut bob_store).await;

    assert!(bob_store.task(id).is_some());

    // Bob finishes it; Alice observes the completion.
    bob_store.update_task_status(id, TaskStatus::Finalized);
    bob_driver.tick(&mut bob_store).await;
    alice_driver.tick(&mut alice_store).await;

    let task = alice_store.task(id).unwrap();
    assert!(task.completed);
    assert!(task.completed_at.is_some());
}

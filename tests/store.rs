use std::sync::Arc;

use taskpad::backend::memory::MemoryBackend;
use taskpad::backend::{AuthProvider, RemoteStore};
use taskpad::config::CategoriesConfig;
use taskpad::session::SessionMode;
use taskpad::storage::LocalStorage;
use taskpad::store::TaskStore;
use taskpad::task::TaskId;
use taskpad::view::{build_view, ViewPrefs};
use tempfile::TempDir;

fn guest_store() -> (TaskStore, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let storage = LocalStorage::with_path(dir.path().join("tasks.json"));
    let store = TaskStore::new(storage, Arc::new(MemoryBackend::new()), CategoriesConfig::default()).unwrap();
    (store, dir)
}

#[tokio::test]
async fn test_add_appends_new_pending_task() {
    let (mut store, _dir) = guest_store();

    store.add("  Buy milk  ", "Personal").await.unwrap();
    assert_eq!(store.tasks().len(), 1);

    let task = &store.tasks()[0];
    assert_eq!(task.text, "Buy milk");
    assert_eq!(task.category, "Personal");
    assert!(!task.completed);
    assert!(task.uid.is_none());

    store.add("Finish report", "Work").await.unwrap();
    assert_eq!(store.tasks().len(), 2);

    // Recency: the new task is not older than any existing one, and guest
    // ids stay unique and increasing even for quick successive adds.
    let first = &store.tasks()[0];
    let second = &store.tasks()[1];
    assert!(second.created_at >= first.created_at);
    match (&first.id, &second.id) {
        (TaskId::Local(a), TaskId::Local(b)) => assert!(b > a),
        _ => panic!("guest tasks must have local ids"),
    }
}

#[tokio::test]
async fn test_guest_created_at_matches_id_instant() {
    let (mut store, _dir) = guest_store();

    // Back-to-back adds land in the same millisecond often enough that the
    // id gets bumped past the clock; created_at must follow the id, not the
    // clock, so ordering by either field agrees.
    for _ in 0..5 {
        store.add("task", "Personal").await.unwrap();
    }
    for task in store.tasks() {
        match &task.id {
            TaskId::Local(ms) => assert_eq!(task.created_at.timestamp_millis(), *ms),
            TaskId::Remote(_) => panic!("guest tasks must have local ids"),
        }
    }
}

#[tokio::test]
async fn test_add_rejects_blank_text() {
    let (mut store, _dir) = guest_store();
    assert!(store.add("", "Personal").await.is_err());
    assert!(store.add("   \t ", "Personal").await.is_err());
    assert!(store.tasks().is_empty());
}

#[tokio::test]
async fn test_add_normalizes_unknown_category() {
    let (mut store, _dir) = guest_store();
    store.add("task", "NotACategory").await.unwrap();
    assert_eq!(store.tasks()[0].category, "Personal");
}

#[tokio::test]
async fn test_toggle_twice_restores_state() {
    let (mut store, _dir) = guest_store();
    store.add("task", "Work").await.unwrap();
    let id = store.tasks()[0].id.clone();

    store.toggle(&id).await.unwrap();
    assert!(store.tasks()[0].completed);

    store.toggle(&id).await.unwrap();
    assert!(!store.tasks()[0].completed);
}

#[tokio::test]
async fn test_toggle_unknown_id_is_an_error() {
    let (mut store, _dir) = guest_store();
    assert!(store.toggle(&TaskId::Local(42)).await.is_err());
}

#[tokio::test]
async fn test_edit_updates_text_and_category_only() {
    let (mut store, _dir) = guest_store();
    store.add("drafty", "Personal").await.unwrap();
    let id = store.tasks()[0].id.clone();
    let created_at = store.tasks()[0].created_at;

    store.edit(&id, "  polished  ", "Work").await.unwrap();
    let task = &store.tasks()[0];
    assert_eq!(task.text, "polished");
    assert_eq!(task.category, "Work");
    assert_eq!(task.created_at, created_at);
    assert_eq!(task.id, id);

    // A blank edit is rejected and changes nothing.
    assert!(store.edit(&id, "  ", "Work").await.is_err());
    assert_eq!(store.tasks()[0].text, "polished");
}

#[tokio::test]
async fn test_delete_removes_exactly_one() {
    let (mut store, _dir) = guest_store();
    store.add("a", "Personal").await.unwrap();
    store.add("b", "Work").await.unwrap();
    store.add("c", "Home").await.unwrap();
    let id = store.tasks()[1].id.clone();

    store.delete(&id).await.unwrap();
    let texts: Vec<&str> = store.tasks().iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["a", "c"]);
}

#[tokio::test]
async fn test_delete_clears_edit_in_progress() {
    let (mut store, _dir) = guest_store();
    store.add("a", "Personal").await.unwrap();
    store.add("b", "Work").await.unwrap();
    let edited = store.tasks()[0].id.clone();
    let other = store.tasks()[1].id.clone();

    store.begin_edit(&edited).unwrap();

    // Deleting a different task leaves the edit alone.
    store.delete(&other).await.unwrap();
    assert_eq!(store.editing(), Some(&edited));

    // Deleting the edited task clears it.
    store.delete(&edited).await.unwrap();
    assert_eq!(store.editing(), None);
}

#[tokio::test]
async fn test_guest_list_persists_across_stores() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");

    let storage = LocalStorage::with_path(path.clone());
    let mut store = TaskStore::new(storage, Arc::new(MemoryBackend::new()), CategoriesConfig::default()).unwrap();
    store.add("persisted", "Home").await.unwrap();
    drop(store);

    let storage = LocalStorage::with_path(path);
    let store = TaskStore::new(storage, Arc::new(MemoryBackend::new()), CategoriesConfig::default()).unwrap();
    assert_eq!(store.tasks().len(), 1);
    assert_eq!(store.tasks()[0].text, "persisted");
    assert_eq!(store.tasks()[0].category, "Home");
}

#[tokio::test]
async fn test_guest_scenario_render_order() {
    let (mut store, _dir) = guest_store();
    store.add("Buy milk", "Personal").await.unwrap();
    store.add("Finish report", "Work").await.unwrap();

    let first = store.tasks()[0].id.clone();
    store.toggle(&first).await.unwrap();

    // Recent sort with completed grouped at the end.
    let view = build_view(store.tasks(), &ViewPrefs::default());
    let rendered: Vec<(&str, bool)> = view.iter().map(|t| (t.text.as_str(), t.completed)).collect();
    assert_eq!(rendered, vec![("Finish report", false), ("Buy milk", true)]);
}

#[tokio::test]
async fn test_remote_flow_reflects_snapshots() {
    let backend = Arc::new(MemoryBackend::new());
    let dir = tempfile::tempdir().unwrap();
    let storage = LocalStorage::with_path(dir.path().join("tasks.json"));
    let mut store = TaskStore::new(storage, backend.clone(), CategoriesConfig::default()).unwrap();

    let user = backend.sign_up("ada@example.com", "hunter2").await.unwrap();
    store
        .switch_mode(&SessionMode::Authenticated { uid: user.uid.clone() })
        .await
        .unwrap();
    assert!(!store.is_guest());

    // Initial snapshot: empty collection.
    assert!(store.next_snapshot().await);
    assert!(store.tasks().is_empty());

    // A remote add only shows up once the snapshot round trip completes.
    store.add("Remote task", "Work").await.unwrap();
    assert!(store.tasks().is_empty());
    assert!(store.next_snapshot().await);
    assert_eq!(store.tasks().len(), 1);

    let task = &store.tasks()[0];
    assert!(matches!(task.id, TaskId::Remote(_)));
    assert_eq!(task.uid.as_deref(), Some(user.uid.as_str()));
    assert_eq!(task.text, "Remote task");

    let id = task.id.clone();
    store.toggle(&id).await.unwrap();
    assert!(store.next_snapshot().await);
    assert!(store.tasks()[0].completed);

    store.edit(&id, "Remote task v2", "Home").await.unwrap();
    assert!(store.next_snapshot().await);
    assert_eq!(store.tasks()[0].text, "Remote task v2");
    assert_eq!(store.tasks()[0].category, "Home");

    store.delete(&id).await.unwrap();
    assert!(store.next_snapshot().await);
    assert!(store.tasks().is_empty());
}

#[tokio::test]
async fn test_remote_failures_are_swallowed() {
    let backend = Arc::new(MemoryBackend::new());
    let dir = tempfile::tempdir().unwrap();
    let storage = LocalStorage::with_path(dir.path().join("tasks.json"));
    let mut store = TaskStore::new(storage, backend.clone(), CategoriesConfig::default()).unwrap();

    let user = backend.sign_up("ada@example.com", "hunter2").await.unwrap();
    store
        .switch_mode(&SessionMode::Authenticated { uid: user.uid })
        .await
        .unwrap();
    assert!(store.next_snapshot().await);

    store.add("doomed", "Work").await.unwrap();
    assert!(store.next_snapshot().await);
    let id = store.tasks()[0].id.clone();

    // Another session deletes the record; this store still shows it until
    // the snapshot lands, so its mutations hit a missing record. They are
    // logged and swallowed, never surfaced as errors.
    let remote_id = match &id {
        TaskId::Remote(remote_id) => remote_id.clone(),
        TaskId::Local(_) => panic!("remote task must have a remote id"),
    };
    backend.delete_task(&remote_id).await.unwrap();

    assert!(store.toggle(&id).await.is_ok());
    assert!(store.edit(&id, "still fine", "Home").await.is_ok());
    assert!(store.delete(&id).await.is_ok());

    // The deletion's snapshot eventually empties the list as usual.
    assert!(store.next_snapshot().await);
    assert!(store.tasks().is_empty());
}

#[tokio::test]
async fn test_backend_switch_replaces_list_without_merge() {
    let backend = Arc::new(MemoryBackend::new());
    let dir = tempfile::tempdir().unwrap();
    let storage = LocalStorage::with_path(dir.path().join("tasks.json"));
    let mut store = TaskStore::new(storage, backend.clone(), CategoriesConfig::default()).unwrap();

    store.add("guest task", "Personal").await.unwrap();
    assert_eq!(store.tasks().len(), 1);

    let user = backend.sign_up("ada@example.com", "hunter2").await.unwrap();
    store
        .switch_mode(&SessionMode::Authenticated { uid: user.uid.clone() })
        .await
        .unwrap();

    // Guest tasks are gone; the remote collection starts empty.
    assert!(store.next_snapshot().await);
    assert!(store.tasks().is_empty());

    store.add("remote task", "Work").await.unwrap();
    assert!(store.next_snapshot().await);
    assert_eq!(store.tasks().len(), 1);

    // Back to guest: the local document still holds only the guest task.
    store.switch_mode(&SessionMode::Guest).await.unwrap();
    assert!(store.is_guest());
    assert_eq!(store.tasks().len(), 1);
    assert_eq!(store.tasks()[0].text, "guest task");
}

#[tokio::test]
async fn test_switch_to_guest_drops_subscription() {
    let backend = Arc::new(MemoryBackend::new());
    let dir = tempfile::tempdir().unwrap();
    let storage = LocalStorage::with_path(dir.path().join("tasks.json"));
    let mut store = TaskStore::new(storage, backend.clone(), CategoriesConfig::default()).unwrap();

    let user = backend.sign_up("ada@example.com", "hunter2").await.unwrap();
    store
        .switch_mode(&SessionMode::Authenticated { uid: user.uid })
        .await
        .unwrap();
    assert_eq!(backend.subscriber_count().await, 1);

    store.switch_mode(&SessionMode::Guest).await.unwrap();
    assert_eq!(backend.subscriber_count().await, 0);

    // Guest mode never waits on a subscription.
    assert!(!store.next_snapshot().await);
}

#[tokio::test]
async fn test_identity_change_resubscribes_for_new_user() {
    let backend = Arc::new(MemoryBackend::new());
    let dir = tempfile::tempdir().unwrap();
    let storage = LocalStorage::with_path(dir.path().join("tasks.json"));
    let mut store = TaskStore::new(storage, backend.clone(), CategoriesConfig::default()).unwrap();

    let ada = backend.sign_up("ada@example.com", "hunter2").await.unwrap();
    store
        .switch_mode(&SessionMode::Authenticated { uid: ada.uid.clone() })
        .await
        .unwrap();
    assert!(store.next_snapshot().await);
    store.add("ada's task", "Work").await.unwrap();
    assert!(store.next_snapshot().await);
    assert_eq!(store.tasks().len(), 1);

    // A different account sees its own empty slice, not ada's tasks.
    let bob = backend.sign_up("bob@example.com", "hunter2").await.unwrap();
    store
        .switch_mode(&SessionMode::Authenticated { uid: bob.uid })
        .await
        .unwrap();
    assert!(store.next_snapshot().await);
    assert!(store.tasks().is_empty());
    assert_eq!(backend.subscriber_count().await, 1);
}

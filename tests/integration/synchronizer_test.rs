//! Record operation integration tests against the in-memory server

use crate::common::{fields, Harness, FIRST_SERVER_ID};
use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use taskboard_sync::client::{Confirmation, SyncError};
use taskboard_sync::shared::{AppConfig, MissingOnServer, Status, Task, TaskId, TaskPatch};

#[tokio::test]
async fn test_online_create_reaches_server() {
    let h = Harness::new();

    let task = h.service.synchronizer().create(fields("Ship it")).await.unwrap();

    assert_eq!(task.id, TaskId::Number(FIRST_SERVER_ID));
    assert_eq!(h.server.get(FIRST_SERVER_ID).unwrap().fields.title, "Ship it");
    assert_eq!(h.replica().load().await, vec![task]);
}

#[tokio::test]
async fn test_offline_creates_get_distinct_temporary_ids() {
    let h = Harness::new();
    h.server.set_online(false);
    let sync = h.service.synchronizer();

    let first = sync.create(fields("one")).await.unwrap();
    let second = sync.create(fields("two")).await.unwrap();

    assert!(first.id.is_temporary());
    assert!(second.id.is_temporary());
    assert_ne!(first.id, second.id);
    assert!(h.server.tasks().is_empty());
    assert_titles!(sync.tasks().await, ["one", "two"]);
}

#[tokio::test]
async fn test_required_create_reports_failure_but_keeps_task() {
    let h = Harness::new();
    h.server.set_online(false);

    let result = h
        .service
        .synchronizer()
        .create_with(fields("must land"), Confirmation::Required)
        .await;

    assert_matches!(result, Err(SyncError::TransportFailure { .. }));
    let stored = h.replica().load().await;
    assert_eq!(stored.len(), 1);
    assert!(stored[0].id.is_temporary());
}

#[tokio::test]
async fn test_create_timeout_keeps_task_locally() {
    let h = Harness::new();
    h.server.fail_next_creates(1);

    let task = h.service.synchronizer().create(fields("slow")).await.unwrap();

    assert!(task.id.is_temporary());
    assert_eq!(h.server.create_count(), 0);
}

#[tokio::test]
async fn test_online_update_pushes_full_record() {
    let h = Harness::new();
    let sync = h.service.synchronizer();
    let mut detailed = fields("Draft");
    detailed.tags = vec!["keep".to_string()];
    let task = sync.create(detailed).await.unwrap();

    let updated = sync
        .update(&task.id, TaskPatch::status(Status::Done))
        .await
        .unwrap();

    let on_server = h.server.get(task.id.clone()).unwrap();
    assert_eq!(on_server.fields.status, Status::Done);
    assert_eq!(on_server.fields.tags, vec!["keep".to_string()]);
    assert_eq!(on_server.fields, updated.fields);
}

#[tokio::test]
async fn test_offline_update_is_applied_locally() {
    let h = Harness::new();
    let sync = h.service.synchronizer();
    let task = sync.create(fields("Before")).await.unwrap();

    h.server.set_online(false);
    let updated = sync.update(&task.id, TaskPatch::title("After")).await.unwrap();

    assert_eq!(updated.id, task.id);
    assert_eq!(sync.get(&task.id).await.unwrap().fields.title, "After");
    assert_eq!(h.server.get(task.id.clone()).unwrap().fields.title, "Before");
}

#[tokio::test]
async fn test_update_of_temporary_task_stays_local() {
    let h = Harness::new();
    h.server.set_online(false);
    let sync = h.service.synchronizer();
    let draft = sync.create(fields("Draft")).await.unwrap();

    h.server.set_online(true);
    let updated = sync.update(&draft.id, TaskPatch::title("Edited")).await.unwrap();

    assert_eq!(updated.id, draft.id);
    assert_eq!(h.server.create_count(), 0);
    assert_eq!(sync.get(&draft.id).await.unwrap().fields.title, "Edited");
}

#[tokio::test]
async fn test_update_of_unknown_task_is_not_found() {
    let h = Harness::new();

    let result = h
        .service
        .synchronizer()
        .update(&TaskId::Number(404), TaskPatch::title("x"))
        .await;

    assert_matches!(result, Err(SyncError::NotFound { id }) if id == TaskId::Number(404));
    assert!(h.replica().load().await.is_empty());
}

#[tokio::test]
async fn test_update_recreates_task_lost_by_server() {
    let h = Harness::new();
    h.replica().insert(Task::new(12, fields("Lost"))).await.unwrap();

    let updated = h
        .service
        .synchronizer()
        .update(&TaskId::Number(12), TaskPatch::title("Found"))
        .await
        .unwrap();

    assert_eq!(updated.id, TaskId::Number(FIRST_SERVER_ID));
    assert_eq!(h.server.get(FIRST_SERVER_ID).unwrap().fields.title, "Found");
    assert!(h.replica().get(&TaskId::Number(12)).await.is_none());
    assert_eq!(h.replica().load().await, vec![updated]);
}

#[tokio::test]
async fn test_update_defers_task_lost_by_server() {
    let h = Harness::with_config(AppConfig::builder().missing_on_server(MissingOnServer::Defer));
    h.replica().insert(Task::new(12, fields("Lost"))).await.unwrap();

    let updated = h
        .service
        .synchronizer()
        .update(&TaskId::Number(12), TaskPatch::title("Still lost"))
        .await
        .unwrap();

    assert_eq!(updated.id, TaskId::Number(12));
    assert!(h.server.tasks().is_empty());
    assert_eq!(h.replica().get(&TaskId::Number(12)).await.unwrap().fields.title, "Still lost");
}

#[tokio::test]
async fn test_online_delete_removes_everywhere() {
    let h = Harness::new();
    let sync = h.service.synchronizer();
    let task = sync.create(fields("Gone soon")).await.unwrap();

    sync.delete(&task.id).await.unwrap();

    assert!(h.server.tasks().is_empty());
    assert!(h.replica().load().await.is_empty());
    assert!(h.replica().list_pending_deletes().await.is_empty());
}

#[tokio::test]
async fn test_offline_delete_queues_pending() {
    let h = Harness::new();
    let sync = h.service.synchronizer();
    let task = sync.create(fields("Gone later")).await.unwrap();

    h.server.set_online(false);
    sync.delete(&task.id).await.unwrap();

    assert!(h.replica().load().await.is_empty());
    assert_eq!(h.replica().list_pending_deletes().await, vec![task.id.clone()]);
    assert!(h.server.get(task.id).is_some());
}

#[tokio::test]
async fn test_required_delete_reports_failure_after_queueing() {
    let h = Harness::new();
    let sync = h.service.synchronizer();
    let task = sync.create(fields("Stubborn")).await.unwrap();

    h.server.fail_deletes(true);
    let result = sync.delete_with(&task.id, Confirmation::Required).await;

    assert_matches!(result, Err(SyncError::TransportFailure { .. }));
    assert!(h.replica().is_pending_delete(&task.id).await);
    assert!(h.replica().get(&task.id).await.is_none());
}

#[tokio::test]
async fn test_delete_of_temporary_task_is_local_only() {
    let h = Harness::new();
    h.server.set_online(false);
    let sync = h.service.synchronizer();
    let draft = sync.create(fields("Never synced")).await.unwrap();

    sync.delete(&draft.id).await.unwrap();

    assert!(h.replica().load().await.is_empty());
    assert!(h.replica().list_pending_deletes().await.is_empty());
}

#[tokio::test]
async fn test_delete_of_unknown_task_is_not_found() {
    let h = Harness::new();

    let result = h.service.synchronizer().delete(&TaskId::Number(3)).await;

    assert_matches!(result, Err(SyncError::NotFound { .. }));
    assert!(h.replica().list_pending_deletes().await.is_empty());
}

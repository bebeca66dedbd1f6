//! Reconciliation pass integration tests

use crate::common::{fields, Harness};
use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use taskboard_sync::client::ReconciliationResult;
use taskboard_sync::shared::{SyncEvent, Task, TaskId, TaskPatch};

fn ids(tasks: &[Task]) -> HashSet<TaskId> {
    tasks.iter().map(|t| t.id.clone()).collect()
}

#[tokio::test]
async fn test_offline_create_is_promoted_once() {
    let h = Harness::new();
    h.server.set_online(false);

    let draft = h.service.synchronizer().create(fields("A")).await.unwrap();
    assert!(draft.id.is_temporary());
    assert_eq!(h.replica().load().await.len(), 1);

    h.server.set_online(true);
    let result = h.service.reconcile().await;
    let report = assert_matches!(result, ReconciliationResult::Synchronized(report) => report);

    assert_eq!(report.promoted, 1);
    assert_titles!(report.tasks, ["A"]);
    assert_no_temporary!(report.tasks);
    assert_eq!(h.server.create_count(), 1);
    assert_eq!(h.server.tasks().len(), 1);
    assert_eq!(h.replica().load().await, report.tasks);
}

#[tokio::test]
async fn test_promotion_preserves_fields() {
    let h = Harness::new();
    h.server.set_online(false);

    let mut draft_fields = fields("Detailed");
    draft_fields.description = Some("with notes".to_string());
    draft_fields.tags = vec!["ops".to_string(), "urgent".to_string()];
    let draft = h.service.synchronizer().create(draft_fields).await.unwrap();

    h.server.set_online(true);
    let result = h.service.reconcile().await;
    let promoted = &result.tasks()[0];

    assert_ne!(promoted.id, draft.id);
    assert_eq!(promoted.fields, draft.fields);
    assert_eq!(h.server.get(promoted.id.clone()).unwrap().fields, draft.fields);
}

#[tokio::test]
async fn test_offline_delete_is_drained() {
    let h = Harness::new();
    h.server.seed(Task::new(5, fields("Five")));
    h.service.reconcile().await;
    assert_eq!(h.replica().load().await.len(), 1);

    h.server.set_online(false);
    h.service.synchronizer().delete(&TaskId::Number(5)).await.unwrap();
    assert!(h.replica().load().await.is_empty());
    assert_eq!(h.replica().list_pending_deletes().await, vec![TaskId::Number(5)]);

    h.server.set_online(true);
    let result = h.service.reconcile().await;
    let report = assert_matches!(result, ReconciliationResult::Synchronized(report) => report);

    assert_eq!(report.deletes_confirmed, 1);
    assert!(report.tasks.is_empty());
    assert!(h.replica().list_pending_deletes().await.is_empty());
    assert!(h.server.get(5).is_none());
    assert!(h.replica().get(&TaskId::Number(5)).await.is_none());
}

#[tokio::test]
async fn test_failed_server_delete_is_not_resurrected() {
    let h = Harness::new();
    h.server.seed(Task::new(5, fields("Five")));
    h.server.seed(Task::new(6, fields("Six")));
    h.service.reconcile().await;

    h.server.fail_deletes(true);
    h.service.synchronizer().delete(&TaskId::Number(5)).await.unwrap();
    assert_eq!(h.replica().list_pending_deletes().await, vec![TaskId::Number(5)]);

    let result = h.service.reconcile().await;
    let report = assert_matches!(result, ReconciliationResult::Synchronized(report) => report);
    assert_eq!(report.deletes_deferred, 1);
    assert_titles!(report.tasks, ["Six"]);
    assert!(h.server.get(5).is_some());
    assert_eq!(h.replica().list_pending_deletes().await, vec![TaskId::Number(5)]);

    h.server.fail_deletes(false);
    h.service.reconcile().await;
    assert!(h.server.get(5).is_none());
    assert!(h.replica().list_pending_deletes().await.is_empty());
}

#[tokio::test]
async fn test_pending_delete_unknown_to_server_is_cleared() {
    let h = Harness::new();
    h.replica().add_pending_delete(&TaskId::Number(77)).await.unwrap();

    let result = h.service.reconcile().await;
    let report = assert_matches!(result, ReconciliationResult::Synchronized(report) => report);
    assert_eq!(report.deletes_confirmed, 1);
    assert!(h.replica().list_pending_deletes().await.is_empty());
}

#[tokio::test]
async fn test_local_fields_win_over_server() {
    let h = Harness::new();
    h.replica().insert(Task::new(7, fields("X"))).await.unwrap();
    h.server.seed(Task::new(7, fields("Y")));

    let result = h.service.reconcile().await;
    assert_titles!(result.tasks(), ["X"]);
    assert_eq!(h.server.get(7).unwrap().fields.title, "X");
    assert_eq!(h.server.create_count(), 0);
}

#[tokio::test]
async fn test_server_only_tasks_are_pulled() {
    let h = Harness::new();
    h.replica().insert(Task::new(1, fields("Local"))).await.unwrap();
    h.server.seed(Task::new(1, fields("Local")));
    h.server.seed(Task::new(2, fields("Remote")));

    let result = h.service.reconcile().await;
    let report = assert_matches!(result, ReconciliationResult::Synchronized(report) => report);
    assert_eq!(report.pulled, 1);
    assert_titles!(report.tasks, ["Local", "Remote"]);
}

#[tokio::test]
async fn test_local_task_missing_on_server_is_recreated() {
    let h = Harness::new();
    h.replica().insert(Task::new(3, fields("Orphan"))).await.unwrap();

    let result = h.service.reconcile().await;
    let tasks = result.tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].fields.title, "Orphan");
    assert_ne!(tasks[0].id, TaskId::Number(3));
    assert_eq!(h.server.tasks().len(), 1);
    assert_eq!(ids(tasks), ids(&h.server.tasks()));
}

#[tokio::test]
async fn test_second_pass_is_a_no_op() {
    let h = Harness::new();
    h.server.seed(Task::new(1, fields("Server")));
    h.server.set_online(false);
    let sync = h.service.synchronizer();
    sync.create(fields("Draft")).await.unwrap();
    h.replica().insert(Task::new(2, fields("Orphan"))).await.unwrap();

    h.server.set_online(true);
    let first = h.service.reconcile().await;
    let creates_after_first = h.server.create_count();
    let server_after_first = h.server.tasks();

    let second = h.service.reconcile().await;
    assert!(first.is_synchronized());
    assert!(second.is_synchronized());
    assert_eq!(first.tasks(), second.tasks());
    assert_eq!(h.server.create_count(), creates_after_first);
    assert_eq!(h.server.tasks(), server_after_first);
}

#[tokio::test]
async fn test_failed_promotion_is_retried() {
    let h = Harness::new();
    h.server.set_online(false);
    h.service.synchronizer().create(fields("Retry me")).await.unwrap();

    h.server.set_online(true);
    h.server.fail_next_creates(1);
    let first = h.service.reconcile().await;
    let report = assert_matches!(first, ReconciliationResult::Synchronized(report) => report);
    assert_eq!(report.failed, 1);
    assert!(report.tasks[0].id.is_temporary());

    let second = h.service.reconcile().await;
    assert_no_temporary!(second.tasks());
    assert_eq!(h.server.create_count(), 1);
}

#[tokio::test]
async fn test_pull_failure_aborts_pass() {
    let h = Harness::new();
    h.server.seed(Task::new(9, fields("Unseen")));
    h.server.set_online(false);
    h.service.synchronizer().create(fields("Draft")).await.unwrap();

    h.server.set_online(true);
    h.server.fail_list(true);
    let result = h.service.reconcile().await;
    let tasks = assert_matches!(result, ReconciliationResult::Aborted { tasks, .. } => tasks);

    // The promotion before the pull is kept, the server-only task is not pulled
    assert_titles!(tasks, ["Draft"]);
    assert_no_temporary!(tasks);
    assert!(h.replica().get(&TaskId::Number(9)).await.is_none());

    let status = h.service.status().await;
    assert!(status.last_error.is_some());

    h.server.fail_list(false);
    let retry = h.service.reconcile().await;
    assert!(retry.is_synchronized());
    assert_eq!(retry.tasks().len(), 2);
    assert_eq!(h.server.create_count(), 1);
}

#[tokio::test]
async fn test_offline_pass_is_skipped() {
    let h = Harness::new();
    h.server.set_online(false);
    h.replica().add_pending_delete(&TaskId::Number(4)).await.unwrap();

    let result = h.service.reconcile().await;
    assert_matches!(result, ReconciliationResult::Offline(ref tasks) if tasks.is_empty());
    assert_eq!(h.replica().list_pending_deletes().await, vec![TaskId::Number(4)]);
}

#[tokio::test]
async fn test_completed_pass_broadcasts_tasks() {
    let h = Harness::new();
    h.server.seed(Task::new(1, fields("Broadcast")));
    let mut events = h.service.subscribe();

    h.service.reconcile().await;
    let event = events.recv().await.unwrap();
    assert_matches!(event, SyncEvent::TasksSynced(ref tasks) if tasks.len() == 1);
}

#[tokio::test]
async fn test_update_after_promotion_targets_server_id() {
    let h = Harness::new();
    h.server.set_online(false);
    let draft = h.service.synchronizer().create(fields("Before")).await.unwrap();

    h.server.set_online(true);
    let result = h.service.reconcile().await;
    let promoted_id = result.tasks()[0].id.clone();

    assert!(h.service.synchronizer().get(&draft.id).await.is_none());
    let updated = h
        .service
        .synchronizer()
        .update(&promoted_id, TaskPatch::title("After"))
        .await
        .unwrap();
    assert_eq!(updated.id, promoted_id);
    assert_eq!(h.server.get(promoted_id).unwrap().fields.title, "After");
}

#[tokio::test]
async fn test_updates_racing_a_pass_are_not_lost() {
    let h = Harness::new();
    for n in 1..=4 {
        h.server.seed(Task::new(n, fields(&format!("old{n}"))));
    }
    assert!(h.service.reconcile().await.is_synchronized());

    let sync = h.service.synchronizer();
    let (pass, a, b, c, d) = tokio::join!(
        h.service.reconcile(),
        sync.update(&TaskId::Number(1), TaskPatch::title("new1")),
        sync.update(&TaskId::Number(2), TaskPatch::title("new2")),
        sync.update(&TaskId::Number(3), TaskPatch::title("new3")),
        sync.update(&TaskId::Number(4), TaskPatch::title("new4")),
    );
    assert!(pass.is_synchronized());
    for updated in [a, b, c, d] {
        assert!(!updated.unwrap().id.is_temporary());
    }

    assert_titles!(h.replica().load().await, ["new1", "new2", "new3", "new4"]);
    assert_titles!(h.server.tasks(), ["new1", "new2", "new3", "new4"]);
    assert_eq!(h.server.create_count(), 0);
}

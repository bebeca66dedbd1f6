//! Background sync service integration tests

use crate::common::{fields, Harness};
use assert_matches::assert_matches;
use std::time::Duration;
use taskboard_sync::client::sync::PassOutcome;
use taskboard_sync::client::SyncError;
use taskboard_sync::shared::{AppConfig, SyncEvent, Task};
use tokio::sync::broadcast;
use tokio::time::timeout;

const EVENT_WAIT: Duration = Duration::from_secs(5);

async fn next_event(events: &mut broadcast::Receiver<SyncEvent>) -> SyncEvent {
    timeout(EVENT_WAIT, events.recv())
        .await
        .expect("timed out waiting for a sync event")
        .expect("event channel closed")
}

/// Wait until the background loop has finished a pass with `outcome`
async fn wait_for_outcome(h: &Harness, outcome: PassOutcome) {
    timeout(EVENT_WAIT, async {
        while h.service.status().await.last_outcome != Some(outcome) {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("background pass did not finish");
}

#[tokio::test]
async fn test_reconnect_triggers_reconciliation() {
    let mut h = Harness::with_config(AppConfig::builder().probe_interval_secs(1));
    h.server.set_online(false);
    let draft = h.service.synchronizer().create(fields("Queued")).await.unwrap();
    assert!(draft.id.is_temporary());

    let mut events = h.service.subscribe();
    h.service.start().unwrap();
    wait_for_outcome(&h, PassOutcome::Offline).await;
    h.server.set_online(true);

    assert_matches!(next_event(&mut events).await, SyncEvent::ConnectivityChanged(true));
    let synced = assert_matches!(next_event(&mut events).await, SyncEvent::TasksSynced(tasks) => tasks);
    assert_titles!(synced, ["Queued"]);
    assert_no_temporary!(synced);

    let status = h.service.status().await;
    assert!(status.is_connected);
    assert_eq!(status.last_outcome, Some(PassOutcome::Synchronized));
    assert_eq!(status.temporary_tasks, 0);

    h.service.stop();
}

#[tokio::test]
async fn test_lost_connectivity_is_announced() {
    let mut h = Harness::with_config(AppConfig::builder().probe_interval_secs(1));
    h.server.seed(Task::new(1, fields("Seeded")));

    let mut events = h.service.subscribe();
    h.service.start().unwrap();

    let synced = assert_matches!(next_event(&mut events).await, SyncEvent::TasksSynced(tasks) => tasks);
    assert_titles!(synced, ["Seeded"]);

    h.server.set_online(false);
    assert_matches!(next_event(&mut events).await, SyncEvent::ConnectivityChanged(false));
    assert!(!h.service.prober().is_connected());

    h.service.stop();
}

#[tokio::test]
async fn test_start_twice_is_rejected() {
    let mut h = Harness::new();

    h.service.start().unwrap();
    assert_matches!(h.service.start(), Err(SyncError::AlreadyRunning));

    h.service.stop();
    assert!(!h.service.is_running());
    h.service.start().unwrap();
    h.service.stop();
}

#[tokio::test]
async fn test_metrics_count_passes() {
    let h = Harness::new();

    h.service.reconcile().await;
    h.server.set_online(false);
    h.service.reconcile().await;

    let metrics = h.service.metrics().await;
    assert_eq!(metrics.total_passes, 2);
    assert_eq!(metrics.successful_passes, 1);
    assert_eq!(metrics.offline_passes, 1);
    assert_eq!(metrics.success_rate(), 0.5);
}

/**
 * Taskboard Sync Entry Point
 *
 * Runs the local-first sync service as a standalone process: loads the
 * configuration, opens the SQLite-backed replica, reconciles at startup and
 * then keeps probing the task server until interrupted.
 */
use taskboard_sync::client::{Config, SyncService};
use taskboard_sync::shared::SyncEvent;
use tokio::sync::broadcast::error::RecvError;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    let config = Config::from_env()?;
    let mut service = SyncService::from_config(config).await?;
    let mut events = service.subscribe();
    service.start()?;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(SyncEvent::TasksSynced(tasks)) => {
                    tracing::info!("Local replica synchronized: {} tasks", tasks.len());
                }
                Ok(SyncEvent::ConnectivityChanged(connected)) => {
                    tracing::info!("Server {}", if connected { "online" } else { "offline" });
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Missed {} sync events", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                break;
            }
        }
    }

    let status = service.status().await;
    if status.has_backlog() {
        tracing::warn!(
            "Exiting with {} pending deletes and {} unsynced tasks",
            status.pending_deletes,
            status.temporary_tasks
        );
    }
    service.stop();
    Ok(())
}

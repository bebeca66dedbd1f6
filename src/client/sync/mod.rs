//! # Background Sync Service
//!
//! Owns the sync engine for one process: the local replica, the task server
//! client, the connectivity prober, the record synchronizer and the
//! reconciliation engine, plus the background loop that drives them.
//!
//! ## Architecture
//!
//! The sync service coordinates multiple components:
//! - **Network Monitor**: periodic reachability probe
//! - **Record Synchronizer**: offline-first single-record operations
//! - **Reconciliation Engine**: batch merge with the server (local wins)
//! - **Conflict Resolver**: the local-wins merge itself
//! - **Sync State**: snapshot for a connectivity indicator
//! - **Metrics**: pass counters and timings
//!
//! ## Triggers
//!
//! The background loop reconciles once at startup and again on every
//! unreachable → reachable transition it observes. Each observed change is
//! broadcast as `SyncEvent::ConnectivityChanged`; each completed pass as
//! `SyncEvent::TasksSynced`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use taskboard_sync::client::config::Config;
//! use taskboard_sync::client::sync::SyncService;
//! use taskboard_sync::shared::{SyncEvent, TaskFields};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut service = SyncService::from_config(Config::from_env()?).await?;
//! let mut events = service.subscribe();
//! service.start()?;
//!
//! service.synchronizer().create(TaskFields::new("Plan sprint")).await?;
//!
//! if let Ok(SyncEvent::TasksSynced(tasks)) = events.recv().await {
//!     println!("{} tasks after sync", tasks.len());
//! }
//! service.stop();
//! # Ok(())
//! # }
//! ```

pub mod conflict_resolver;
pub mod metrics;
pub mod network_monitor;
pub mod sync_state;

pub use metrics::SyncMetrics;
pub use network_monitor::{ConnectionStatus, ConnectivityProber};
pub use sync_state::{PassOutcome, SyncState};

use crate::client::api::{HttpTaskServer, TaskServer};
use crate::client::config::Config;
use crate::client::error::SyncError;
use crate::client::local_db::{KeyValueStore, LocalReplica, SqliteStore};
use crate::client::offline::{ReconciliationEngine, ReconciliationResult, TaskSynchronizer};
use crate::shared::task::get_timestamp;
use crate::shared::SyncEvent;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;

/// Capacity of the sync event channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// State shared between the service handle and its background loop
#[derive(Debug)]
struct SyncCore {
    replica: Arc<Mutex<LocalReplica>>,
    prober: Arc<ConnectivityProber>,
    engine: ReconciliationEngine,
    events: broadcast::Sender<SyncEvent>,
    state: RwLock<SyncState>,
    metrics: RwLock<SyncMetrics>,
    /// Set while a pass runs; cleared even when the pass is cancelled
    syncing: AtomicBool,
}

/// Clears the syncing flag when the pass future finishes or is dropped
struct SyncingGuard<'a>(&'a AtomicBool);

impl<'a> SyncingGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for SyncingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SyncCore {
    /// Run a reconciliation pass, recording state and metrics around it
    async fn reconcile(&self) -> ReconciliationResult {
        let syncing = SyncingGuard::enter(&self.syncing);
        self.metrics.write().await.record_pass_start();

        let result = self.engine.reconcile().await;
        drop(syncing);

        self.metrics.write().await.record_pass_end(&result);
        let mut state = self.state.write().await;
        match &result {
            ReconciliationResult::Synchronized(_) => {
                state.last_outcome = Some(PassOutcome::Synchronized);
                state.last_sync = Some(get_timestamp());
                state.last_error = None;
            }
            ReconciliationResult::Offline(_) => {
                state.last_outcome = Some(PassOutcome::Offline);
            }
            ReconciliationResult::Aborted { reason, .. } => {
                state.last_outcome = Some(PassOutcome::Aborted);
                state.last_error = Some(reason.clone());
            }
        }
        result
    }

    /// Probe on every tick; reconcile when the server comes back
    async fn run(self: Arc<Self>, probe_interval: Duration) {
        self.reconcile().await;
        let mut was_connected = self.prober.is_connected();

        let mut interval = tokio::time::interval(probe_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately and the startup pass just probed
        interval.tick().await;

        loop {
            interval.tick().await;

            let connected = self.prober.probe().await;
            if connected == was_connected {
                continue;
            }
            was_connected = connected;

            let _ = self.events.send(SyncEvent::ConnectivityChanged(connected));
            if connected {
                tracing::info!("Connectivity regained; reconciling");
                self.reconcile().await;
            } else {
                tracing::info!("Connectivity lost; working from the local replica");
            }
        }
    }
}

/// Main sync service coordinator
pub struct SyncService {
    config: Config,
    core: Arc<SyncCore>,
    synchronizer: TaskSynchronizer,
    /// Background loop handle, present while running
    background_task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for SyncService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncService")
            .field("config", &self.config)
            .field("running", &self.background_task.is_some())
            .finish_non_exhaustive()
    }
}

impl SyncService {
    /// Assemble a service from its collaborators
    pub fn new(config: Config, server: Arc<dyn TaskServer>, store: Arc<dyn KeyValueStore>) -> Self {
        let replica = Arc::new(Mutex::new(LocalReplica::new(store)));
        let prober = Arc::new(ConnectivityProber::new(Arc::clone(&server)));
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let synchronizer = TaskSynchronizer::new(
            Arc::clone(&replica),
            Arc::clone(&server),
            Arc::clone(&prober),
            config.missing_on_server(),
        );
        let engine = ReconciliationEngine::new(
            Arc::clone(&replica),
            server,
            Arc::clone(&prober),
            events.clone(),
            config.max_concurrent_requests(),
        );

        let core = Arc::new(SyncCore {
            replica,
            prober,
            engine,
            events,
            state: RwLock::new(SyncState::default()),
            metrics: RwLock::new(SyncMetrics::new()),
            syncing: AtomicBool::new(false),
        });

        Self {
            config,
            core,
            synchronizer,
            background_task: None,
        }
    }

    /// Build the HTTP client and local database described by `config`
    pub async fn from_config(config: Config) -> Result<Self, SyncError> {
        let server = HttpTaskServer::new(config.clone()).map_err(|e| SyncError::Initialization {
            message: e.to_string(),
        })?;
        let store = SqliteStore::open(config.data_dir()).await?;
        tracing::info!(
            "Sync service using {} with local data in {}",
            config.server_url(),
            store.path().display()
        );
        Ok(Self::new(config, Arc::new(server), Arc::new(store)))
    }

    /// Start the background loop (startup pass, then periodic probes)
    pub fn start(&mut self) -> Result<(), SyncError> {
        if self.background_task.is_some() {
            return Err(SyncError::AlreadyRunning);
        }

        let core = Arc::clone(&self.core);
        let probe_interval = self.config.probe_interval();
        self.background_task = Some(tokio::spawn(core.run(probe_interval)));
        tracing::info!("Sync service started");
        Ok(())
    }

    /// Stop the background loop
    pub fn stop(&mut self) {
        if let Some(handle) = self.background_task.take() {
            handle.abort();
            tracing::info!("Sync service stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.background_task.is_some()
    }

    /// Run a reconciliation pass now
    pub async fn reconcile(&self) -> ReconciliationResult {
        self.core.reconcile().await
    }

    /// Single-record operations on the shared replica
    pub fn synchronizer(&self) -> &TaskSynchronizer {
        &self.synchronizer
    }

    /// Receive sync events
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.core.events.subscribe()
    }

    pub fn prober(&self) -> &ConnectivityProber {
        &self.core.prober
    }

    /// Current status snapshot
    ///
    /// Never waits for a running pass: while the replica is busy the backlog
    /// counts are the ones observed last time it was idle.
    pub async fn status(&self) -> SyncState {
        let backlog = match self.core.replica.try_lock() {
            Ok(replica) => {
                let temporary = replica
                    .load()
                    .await
                    .iter()
                    .filter(|task| task.id.is_temporary())
                    .count();
                Some((replica.list_pending_deletes().await.len(), temporary))
            }
            Err(_) => None,
        };

        let mut state = self.core.state.write().await;
        if let Some((pending_deletes, temporary_tasks)) = backlog {
            state.pending_deletes = pending_deletes;
            state.temporary_tasks = temporary_tasks;
        }
        state.is_syncing = self.core.syncing.load(Ordering::SeqCst);
        let connection = self.core.prober.status();
        state.is_connected = connection.is_connected;
        state.last_checked = connection.last_checked;
        state.clone()
    }

    pub async fn metrics(&self) -> SyncMetrics {
        self.core.metrics.read().await.clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Drop for SyncService {
    fn drop(&mut self) {
        if let Some(handle) = self.background_task.take() {
            handle.abort();
        }
    }
}
